use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::modules::{
    animation::AnimationExport,
    export::{ExportFormat, ExportOptions},
    loose_folder::LooseFolder,
};

use super::*;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct AnimationCli {
    // This is just dummy command because we are already in the command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Exports every direction of an `.ani` animation
    Animation {
        /// Extracted resource folder
        root: PathBuf,
        /// Resource path of the `.ani` file, case does not matter
        ani_path: String,
        /// Output folder, one file per direction
        #[arg(short)]
        out: PathBuf,
        /// Palette file, overrides the one the blobs name
        #[arg(long)]
        palette: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t)]
        format: ExportFormat,
        #[arg(long)]
        zoom: Option<u32>,
        /// Only accept frames close to the first frame's size
        #[arg(long)]
        strict: bool,
        #[arg(short, action = clap::ArgAction::Count)]
        verbose: u8,
    },
}

pub struct Animation;

impl Cli for Animation {
    fn name(&self) -> &'static str {
        "animation"
    }

    fn about(&self) -> &'static str {
        "export all directions an .ani manifest lists"
    }

    fn cli(&self) -> CliRes {
        let cli = AnimationCli::parse();

        let Commands::Animation {
            root,
            ani_path,
            out,
            palette,
            format,
            zoom,
            strict,
            verbose,
        } = cli.command;

        init_logger(verbose);

        let Some(mut config) = load_config() else {
            return CliRes::Err;
        };

        config.strict |= strict;

        let folder = match LooseFolder::new(root) {
            Ok(folder) => folder,
            Err(err) => {
                println!("{}", err);
                return CliRes::Err;
            }
        };

        let export = AnimationExport {
            folder: &folder,
            palette: palette.as_deref(),
            default_palette: config.default_palette.as_deref(),
            scan_options: config.scan_options(),
            options: ExportOptions {
                format,
                zoom: zoom.unwrap_or(config.zoom),
                frame_delay_ms: config.frame_delay_ms,
            },
        };

        let summary = match export.run(&ani_path, &out) {
            Ok(summary) => summary,
            Err(err) => {
                println!("{}", err);
                return CliRes::Err;
            }
        };

        println!(
            "`{}`: {} directions, box {}x{}",
            summary.manifest.directory(),
            summary.manifest.directions.len(),
            summary.manifest.width(),
            summary.manifest.height()
        );

        if let Some(recovery) = summary.palette_recovery {
            println!("recovered: {}", recovery);
        }

        let mut failed = 0;

        for direction in &summary.directions {
            match &direction.result {
                Ok(frames) => println!("{:<6} {} frames", direction.direction, frames),
                Err(err) => {
                    failed += 1;
                    println!("{:<6} failed: {}", direction.direction, err);
                }
            }
        }

        if failed == summary.directions.len() {
            return CliRes::Err;
        }

        CliRes::Ok
    }
}
