use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::modules::inspect::inspect_file;

use super::*;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct InspectCli {
    // This is just dummy command because we are already in the command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints the main header, every frame header and what had to be recovered
    Inspect {
        /// Path to the sprite blob
        blob: PathBuf,
        /// Only accept frames close to the first frame's size
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        max_frames: Option<usize>,
        #[arg(short, action = clap::ArgAction::Count)]
        verbose: u8,
    },
}

pub struct Inspect;

impl Cli for Inspect {
    fn name(&self) -> &'static str {
        "inspect"
    }

    fn about(&self) -> &'static str {
        "print what is inside a sprite blob"
    }

    fn cli(&self) -> CliRes {
        let cli = InspectCli::parse();

        let Commands::Inspect {
            blob,
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

        match inspect_file(&blob, &config.scan_options()) {
            Ok(res) => {
                print!("{}", res);
                CliRes::Ok
            }
            Err(err) => {
                println!("{}", err);
                CliRes::Err
            }
        }
    }
}
