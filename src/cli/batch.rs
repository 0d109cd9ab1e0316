use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::modules::{
    batch::BatchExport,
    export::{ExportFormat, ExportOptions},
};

use super::*;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct BatchCli {
    // This is just dummy command because we are already in the command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Exports every sprite blob found under a folder
    Batch {
        /// Extracted resource folder
        folder: PathBuf,
        /// Output folder
        #[arg(short)]
        out: PathBuf,
        /// Palette file used for every blob
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

pub struct Batch;

impl Cli for Batch {
    fn name(&self) -> &'static str {
        "batch"
    }

    fn about(&self) -> &'static str {
        "export every blob under a folder"
    }

    fn cli(&self) -> CliRes {
        let cli = BatchCli::parse();

        let Commands::Batch {
            folder,
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

        let batch = BatchExport {
            palette: palette.as_deref(),
            default_palette: config.default_palette.as_deref(),
            scan_options: config.scan_options(),
            options: ExportOptions {
                format,
                zoom: zoom.unwrap_or(config.zoom),
                frame_delay_ms: config.frame_delay_ms,
            },
        };

        match batch.run(&folder, &out) {
            Ok(summary) => {
                println!(
                    "exported {}, empty {}, failed {}",
                    summary.exported, summary.empty, summary.failed
                );

                CliRes::Ok
            }
            Err(err) => {
                println!("{}", err);
                CliRes::Err
            }
        }
    }
}
