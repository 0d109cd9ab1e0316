use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::modules::export::{Export as ExportModule, ExportFormat, ExportOptions};

use super::*;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct ExportCli {
    // This is just dummy command because we are already in the command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Decodes one sprite blob into images
    Export {
        /// Path to the sprite blob
        blob: PathBuf,
        /// Output file, or folder for `--format frames`
        #[arg(short)]
        out: PathBuf,
        /// Palette file, overrides the one the blob names
        #[arg(long)]
        palette: Option<PathBuf>,
        /// Extracted resource folder the blob's palette reference is relative to
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t)]
        format: ExportFormat,
        #[arg(long)]
        zoom: Option<u32>,
        /// Only accept frames close to the first frame's size
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        max_frames: Option<usize>,
        #[arg(short, action = clap::ArgAction::Count)]
        verbose: u8,
    },
}

pub struct Export;

impl Cli for Export {
    fn name(&self) -> &'static str {
        "export"
    }

    fn about(&self) -> &'static str {
        "decode one blob to a png strip, a gif or one png per frame"
    }

    fn cli(&self) -> CliRes {
        let cli = ExportCli::parse();

        let Commands::Export {
            blob,
            out,
            palette,
            root,
            format,
            zoom,
            strict,
            max_frames,
            verbose,
        } = cli.command;

        init_logger(verbose);

        let Some(mut config) = load_config() else {
            return CliRes::Err;
        };

        config.strict |= strict;
        config.max_frames = max_frames.unwrap_or(config.max_frames);

        let options = ExportOptions {
            format,
            zoom: zoom.unwrap_or(config.zoom),
            frame_delay_ms: config.frame_delay_ms,
        };

        let mut export = ExportModule::new();

        export
            .blob(blob)
            .out(out)
            .palette(palette)
            .root_folder(root)
            .default_palette(config.default_palette.clone())
            .scan_options(config.scan_options())
            .options(options);

        match export.run() {
            Ok(summary) => {
                summary
                    .recoveries
                    .iter()
                    .for_each(|recovery| println!("recovered: {}", recovery));

                println!("{} frames", summary.frames);
                summary
                    .written
                    .iter()
                    .for_each(|path| println!("wrote `{}`", path.display()));

                CliRes::Ok
            }
            Err(err) => {
                println!("{}", err);
                CliRes::Err
            }
        }
    }
}
