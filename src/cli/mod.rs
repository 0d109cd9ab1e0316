use log::LevelFilter;

use crate::config::{parse_config, Config};

use self::{animation::Animation, batch::Batch, export::Export, inspect::Inspect};

mod animation;
mod batch;
mod export;
mod inspect;

pub enum CliRes {
    Ok,
    Err,
}

pub trait Cli {
    fn name(&self) -> &'static str;
    fn about(&self) -> &'static str;
    /// Each module has to handle the arguments by itself.
    fn cli(&self) -> CliRes;
}

/// `-v` for info, `-vv` for debug, `-vvv` for trace. `RUST_LOG` still wins when set.
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_config() -> Option<Config> {
    match parse_config() {
        Ok(config) => Some(config),
        Err(err) => {
            println!("Cannot parse config: {}", err);
            None
        }
    }
}

/// Runs command-line options
pub fn cli() -> CliRes {
    let args: Vec<String> = std::env::args().collect();

    // Add new modules here.
    let modules: &[&dyn Cli] = &[&Inspect, &Export, &Animation, &Batch];

    let help = || {
        println!(
            "\
ztdump {}

Available modules:",
            env!("CARGO_PKG_VERSION")
        );
        for module in modules {
            println!("  {:<10} {}", module.name(), module.about());
        }
    };

    let Some(command) = args.get(1) else {
        help();
        return CliRes::Err;
    };

    for module in modules {
        if command == module.name() {
            return module.cli();
        }
    }

    // In case nothing fits then prints this again.
    help();

    CliRes::Err
}
