//! Reader and writer for indexed RLE sprite blobs.
//!
//! A blob is a small main header naming its palette, followed by frames. Each frame is a
//! 14 byte header and a payload of per row skip/run instructions over palette indices.
//! There is no frame count, so frames are found by walking the declared payload sizes and
//! searching around them when a size turns out to be wrong.
//!
//! ```no_run
//! use ani::{decode_all, Palette};
//!
//! let blob = std::fs::read("animals/elephant/walk/N").unwrap();
//! let palette = Palette::from_file("animals/elephant/elephant.pal").unwrap();
//!
//! let frame_set = decode_all(&blob, &palette).unwrap();
//! frame_set.to_rgba8(0).unwrap().save("N.png").unwrap();
//! ```
pub mod error;
mod decoder;
mod manifest;
mod palette;
mod parser;
mod render;
mod scanner;
mod types;
mod utils;
mod writer;

pub use decoder::{decode_frame, decode_frame_with_status, DecodeStatus};
pub use manifest::AniManifest;
pub use palette::{Palette, Rgb, COUNTED_RGBA_PALETTE_LEN, RGB_PALETTE_LEN};
pub use parser::{parse_frame_header, parse_main_header};
pub use render::{compose_strip, pad_to_canvas, upscale, write_gif};
pub use scanner::{scan, scan_with_options, ScanReport, ScanStop};
pub use types::*;
pub use utils::{decode_all, normalize_path};
pub use writer::write_sprite;

/// Resolves logical resource paths to blob bytes.
///
/// Paths are compared after [`normalize_path`], so `Animals\Elephant\N` and
/// `animals/elephant/n` name the same blob.
pub trait BlobProvider {
    fn get_blob(&self, path: &str) -> Option<Vec<u8>>;
}
