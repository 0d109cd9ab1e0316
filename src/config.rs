//! Parses config file
use std::{
    env,
    fs::OpenOptions,
    io::Read,
    path::{Path, PathBuf},
};

use ani::{ScanMode, ScanOptions, DEFAULT_MAX_FRAMES};
use log::debug;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub max_frames: usize,
    pub strict: bool,
    pub zoom: u32,
    pub frame_delay_ms: u32,
    /// Used when a blob's own palette cannot be found.
    pub default_palette: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_frames: DEFAULT_MAX_FRAMES,
            strict: false,
            zoom: 1,
            frame_delay_ms: 100,
            default_palette: None,
        }
    }
}

impl Config {
    pub fn scan_options(&self) -> ScanOptions {
        let mode = if self.strict {
            ScanMode::Strict
        } else {
            ScanMode::General
        };

        ScanOptions::new().max_frames(self.max_frames).mode(mode)
    }
}

pub static CONFIG_FILE_NAME: &str = "ztdump.toml";

/// Parse `ztdump.toml` in the same folder as the binary
///
/// No config file means every value is the default.
pub fn parse_config() -> eyre::Result<Config> {
    let path = match env::current_exe() {
        Ok(path) => path
            .parent()
            .map(|parent| parent.join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
        Err(_) => PathBuf::from(CONFIG_FILE_NAME),
    };

    if !path.exists() {
        debug!("no config at `{}`, using defaults", path.display());
        return Ok(Config::default());
    }

    parse_config_from_file(path.as_path())
}

pub fn parse_config_from_file(path: &Path) -> eyre::Result<Config> {
    let mut file = OpenOptions::new().read(true).open(path.as_os_str())?;
    let mut buffer = String::new();

    file.read_to_string(&mut buffer)?;

    let mut config: Config = toml::from_str(&buffer)?;

    // relative palette paths are relative to the config file
    if let (Some(palette), Some(root)) = (config.default_palette.as_ref(), path.parent()) {
        if palette.is_relative() {
            config.default_palette = Some(root.join(palette));
        }
    }

    Ok(config)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::misc::scratch_folder;

    fn write_config(name: &str, text: &str) -> PathBuf {
        let path = scratch_folder(name).join(CONFIG_FILE_NAME);
        std::fs::write(&path, text).unwrap();

        path
    }

    #[test]
    fn full_config() {
        let path = write_config(
            "ztdump_full_config",
            "\
max_frames = 12
strict = true
zoom = 3
frame_delay_ms = 80
default_palette = \"pal/zoo.pal\"
",
        );

        let config = parse_config_from_file(&path).unwrap();

        assert_eq!(config.max_frames, 12);
        assert_eq!(config.zoom, 3);
        assert_eq!(config.frame_delay_ms, 80);
        assert_eq!(
            config.default_palette,
            Some(path.parent().unwrap().join("pal/zoo.pal"))
        );

        let options = config.scan_options();
        assert_eq!(options.max_frames, 12);
        assert_eq!(options.mode, ScanMode::Strict);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let path = write_config("ztdump_partial_config", "zoom = 2\n");

        let config = parse_config_from_file(&path).unwrap();

        assert_eq!(
            config,
            Config {
                zoom: 2,
                ..Default::default()
            }
        );
    }

    #[test]
    fn malformed_config_is_an_error() {
        let path = write_config("ztdump_bad_config", "zoom = \"big\"\n");

        assert!(parse_config_from_file(&path).is_err());
    }
}
