//! 256 color tables.
//!
//! Two layouts show up next to the sprites:
//!
//! - plain: `[[u8; 3]; 256]` RGB
//! - counted: `u32` entry count followed by `[[u8; 4]; 256]` RGBA, alpha unused
//!
//! There is no magic number, so the layout is picked by length alone.
use std::{ffi::OsStr, fmt::Display, path::Path};

use image::Rgba;
use log::warn;

use crate::{error::AniError, Recovery, PALETTE_SIZE, TRANSPARENT_INDEX};

pub const RGB_PALETTE_LEN: usize = PALETTE_SIZE * 3;
pub const COUNTED_RGBA_PALETTE_LEN: usize = 4 + PALETTE_SIZE * 4;

pub type Rgb = [u8; 3];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        Self::fallback()
    }
}

impl Palette {
    pub fn new(colors: [Rgb; PALETTE_SIZE]) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.colors
    }

    pub fn get(&self, index: u8) -> Rgb {
        self.colors[index as usize]
    }

    /// Index 0 comes out fully transparent, everything else opaque.
    pub fn rgba(&self, index: u8) -> Rgba<u8> {
        if index == TRANSPARENT_INDEX {
            return Rgba([0, 0, 0, 0]);
        }

        let [r, g, b] = self.get(index);

        Rgba([r, g, b, 255])
    }

    /// Picks the layout by length, falling back to [`Palette::fallback`] when `bytes` is too
    /// short for either.
    pub fn load(bytes: &[u8]) -> Self {
        Self::try_load(bytes).unwrap_or_else(Self::fallback)
    }

    pub fn try_load(bytes: &[u8]) -> Option<Self> {
        if bytes.len() >= COUNTED_RGBA_PALETTE_LEN {
            Some(Self::from_counted_rgba(bytes))
        } else if bytes.len() >= RGB_PALETTE_LEN {
            Some(Self::from_rgb(bytes))
        } else {
            None
        }
    }

    /// Plain RGB triples. Missing entries are black.
    pub fn from_rgb(bytes: &[u8]) -> Self {
        let mut colors = [[0u8; 3]; PALETTE_SIZE];

        colors
            .iter_mut()
            .zip(bytes.chunks_exact(3))
            .for_each(|(color, rgb)| color.copy_from_slice(rgb));

        Self { colors }
    }

    /// Entry count then RGBA quads. At most `min(count, 256)` entries are read and the rest
    /// stay black.
    pub fn from_counted_rgba(bytes: &[u8]) -> Self {
        let mut colors = [[0u8; 3]; PALETTE_SIZE];

        let count = bytes
            .get(..4)
            .map(|count| u32::from_le_bytes([count[0], count[1], count[2], count[3]]))
            .unwrap_or(0)
            .min(PALETTE_SIZE as u32) as usize;

        let entries = bytes.get(4..).unwrap_or_default();

        colors
            .iter_mut()
            .zip(entries.chunks_exact(4))
            .take(count)
            .for_each(|(color, rgba)| color.copy_from_slice(&rgba[..3]));

        Self { colors }
    }

    /// A fixed brown-to-yellow ramp with magenta at index 0.
    ///
    /// Nothing like the game's colors, it only keeps shapes readable when the real palette
    /// cannot be found.
    pub fn fallback() -> Self {
        let colors = std::array::from_fn(|i| {
            let i = i as u32;

            let [r, g, b] = match i {
                0 => [255, 0, 255],
                1..=63 => [40 + i, 30 + i / 2, 20],
                64..=127 => [80 + (i - 64), 50 + (i - 64) / 2, 30],
                128..=191 => [140 + (i - 128), 100 + (i - 128) / 2, 60],
                _ => [200 + (i - 192), 150 + (i - 192), 100],
            };

            [r.min(255) as u8, g.min(255) as u8, b.min(255) as u8]
        });

        Self { colors }
    }

    pub fn from_file(path: impl AsRef<OsStr> + AsRef<Path>) -> Result<Self, AniError> {
        let bytes = std::fs::read(path)?;

        Ok(Self::load(&bytes))
    }

    /// Loads from `source`, or explains why the fallback had to be used instead.
    pub fn load_or_fallback<B, E>(source: Result<B, E>) -> (Self, Option<Recovery>)
    where
        B: AsRef<[u8]>,
        E: Display,
    {
        let reason = match source {
            Ok(bytes) => match Self::try_load(bytes.as_ref()) {
                Some(palette) => return (palette, None),
                None => format!("{} bytes is too short", bytes.as_ref().len()),
            },
            Err(err) => err.to_string(),
        };

        let recovery = Recovery::PaletteUnavailable { reason };
        warn!("{recovery}");

        (Self::fallback(), Some(recovery))
    }
}
