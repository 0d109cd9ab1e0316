//! `.ani` animation manifests.
//!
//! INI text next to the sprite blobs. Only the `[animation]` section matters:
//!
//! ```ini
//! [animation]
//! dir0 = animals
//! dir1 = elephant
//! dir2 = walk
//! animation = N
//! animation = NE
//! x0 = -40
//! y0 = -60
//! x1 = 40
//! y1 = 10
//! ```
//!
//! Every `animation` entry names one direction blob inside `dir0/dir1/dir2/dir3`.
use std::{ffi::OsStr, path::Path};

use nom::{
    bytes::complete::{take_till, take_until},
    character::complete::char,
    combinator::rest,
    sequence::{delimited, separated_pair},
    IResult, Parser,
};

use crate::error::AniError;

const ANIMATION_SECTION: &str = "animation";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AniManifest {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    // non-empty dir0..dir3 in order
    pub directories: Vec<String>,
    pub directions: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Section(&'a str),
    Entry(&'a str, &'a str),
}

fn section(i: &str) -> IResult<&str, &str> {
    delimited(char('['), take_until("]"), char(']')).parse(i)
}

fn entry(i: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(take_till(|c: char| c == '='), char('='), rest).parse(i)
}

fn parse_line(line: &str) -> Option<Line<'_>> {
    let line = line.trim();

    if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
        return None;
    }

    if let Ok((_, name)) = section(line) {
        return Some(Line::Section(name.trim()));
    }

    entry(line)
        .ok()
        .map(|(_, (key, value))| Line::Entry(key.trim(), value.trim()))
}

impl AniManifest {
    /// Clamped to the `i32` range for boxes wider than that.
    pub fn width(&self) -> i32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> i32 {
        self.y1.saturating_sub(self.y0)
    }

    /// `dir0/dir1/dir2/dir3` with the empty ones left out.
    pub fn directory(&self) -> String {
        self.directories.join("/")
    }

    /// Logical path of every direction blob, in manifest order.
    pub fn direction_paths(&self) -> Vec<String> {
        let directory = self.directory();

        self.directions
            .iter()
            .map(|direction| format!("{directory}/{direction}"))
            .collect()
    }

    pub fn open_from_str(text: &str) -> Result<Self, AniError> {
        let mut manifest = AniManifest::default();
        let mut dirs: [Option<String>; 4] = Default::default();
        let mut in_animation = false;

        for line in text.lines().filter_map(parse_line) {
            match line {
                Line::Section(name) => in_animation = name.eq_ignore_ascii_case(ANIMATION_SECTION),
                Line::Entry(_, _) if !in_animation => (),
                Line::Entry(key, value) => {
                    let key = key.to_ascii_lowercase();

                    match key.as_str() {
                        "dir0" | "dir1" | "dir2" | "dir3" => {
                            let slot = (key.as_bytes()[3] - b'0') as usize;
                            dirs[slot] = Some(value.to_string());
                        }
                        "animation" => manifest.directions.push(value.to_string()),
                        "x0" | "y0" | "x1" | "y1" => {
                            let number = value.parse::<i32>().map_err(|_| {
                                AniError::manifest(format!("`{key}` is not a number: `{value}`"))
                            })?;

                            match key.as_str() {
                                "x0" => manifest.x0 = number,
                                "y0" => manifest.y0 = number,
                                "x1" => manifest.x1 = number,
                                _ => manifest.y1 = number,
                            }
                        }
                        _ => (),
                    }
                }
            }
        }

        let [Some(dir0), ..] = &dirs else {
            return Err(AniError::manifest("missing `dir0`"));
        };

        if dir0.is_empty() {
            return Err(AniError::manifest("`dir0` is empty"));
        }

        if manifest.directions.is_empty() {
            return Err(AniError::manifest("no `animation` entries"));
        }

        manifest.directories = dirs
            .into_iter()
            .flatten()
            .filter(|dir| !dir.is_empty())
            .collect();

        Ok(manifest)
    }

    pub fn open_from_bytes(bytes: &[u8]) -> Result<Self, AniError> {
        Self::open_from_str(&String::from_utf8_lossy(bytes))
    }

    pub fn open_from_file(path: impl AsRef<OsStr> + AsRef<Path>) -> Result<Self, AniError> {
        let bytes = std::fs::read(path)?;

        Self::open_from_bytes(&bytes)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ELEPHANT: &str = "\
; generated
[Animation]
dir0 = animals
DIR1 = elephant
dir2 = walk
dir3 =
animation = N
animation = NE
animation = E
x0 = -40
y0 = -60
x1 = 40
y1 = 10

[palette]
animation = ignored
";

    #[test]
    fn parse_elephant() {
        let manifest = AniManifest::open_from_str(ELEPHANT).unwrap();

        assert_eq!(manifest.directory(), "animals/elephant/walk");
        assert_eq!(manifest.directions, vec!["N", "NE", "E"]);
        assert_eq!(manifest.width(), 80);
        assert_eq!(manifest.height(), 70);
        assert_eq!(
            manifest.direction_paths(),
            vec![
                "animals/elephant/walk/N",
                "animals/elephant/walk/NE",
                "animals/elephant/walk/E"
            ]
        );
    }

    #[test]
    fn line_kinds() {
        assert_eq!(parse_line("  [animation] "), Some(Line::Section("animation")));
        assert_eq!(parse_line("x0= 5"), Some(Line::Entry("x0", "5")));
        assert_eq!(parse_line("a = b = c"), Some(Line::Entry("a", "b = c")));
        assert_eq!(parse_line("; x0 = 5"), None);
        assert_eq!(parse_line("garbage"), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn missing_dir0() {
        let text = "[animation]\nanimation = N\n";

        assert!(matches!(
            AniManifest::open_from_str(text),
            Err(AniError::MalformedManifest { .. })
        ));
    }

    #[test]
    fn missing_directions() {
        let text = "[animation]\ndir0 = ui\n";

        assert!(AniManifest::open_from_str(text).is_err());
    }

    #[test]
    fn bad_number() {
        let text = "[animation]\ndir0 = ui\nanimation = N\nx0 = left\n";

        assert!(AniManifest::open_from_str(text).is_err());
    }

    #[test]
    fn missing_box_defaults_to_zero() {
        let text = "[animation]\ndir0 = ui\nanimation = N\n";
        let manifest = AniManifest::open_from_str(text).unwrap();

        assert_eq!(manifest.width(), 0);
        assert_eq!(manifest.direction_paths(), vec!["ui/N"]);
    }

    #[test]
    fn extreme_box_saturates() {
        let text = "[animation]\ndir0 = ui\nanimation = N\n\
x0 = -2147483648\nx1 = 2147483647\ny0 = 2147483647\ny1 = -2147483648\n";
        let manifest = AniManifest::open_from_str(text).unwrap();

        assert_eq!(manifest.width(), i32::MAX);
        assert_eq!(manifest.height(), i32::MIN);
    }
}
