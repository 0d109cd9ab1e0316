use std::{borrow::Cow, fmt};

use crate::Palette;

/// Shortest blob that can hold the prologue plus one frame header.
pub const MAIN_HEADER_MIN_LEN: usize = 20;
pub const PALETTE_REF_MAX_LEN: u32 = 200;
pub const BASE_WIDTH_MAX: u32 = 5000;

pub const FRAME_HEADER_SIZE: usize = 14;
pub const MIN_PAYLOAD_SIZE: u32 = 16;
pub const MAX_FRAME_DIMENSION: u16 = 4096;

/// Instruction counts at or above this mark an empty row.
pub const EMPTY_ROW_SENTINEL: u8 = 0xF0;

pub const RESYNC_LOOKBEHIND: usize = 30;
pub const RESYNC_LOOKAHEAD: usize = 200;
pub const STRICT_DIMENSION_TOLERANCE: u16 = 20;
pub const DEFAULT_MAX_FRAMES: usize = 100;

pub const PALETTE_SIZE: usize = 256;
pub const TRANSPARENT_INDEX: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainHeader {
    /// Not trusted for anything. Frame headers carry the real heights.
    pub declared_height: u32,
    pub palette_ref_len: u32,
    // [u8; palette_ref_len]
    pub palette_ref_path: Vec<u8>,
    pub base_width: u32,
    pub frame_region_start: usize,
}

impl MainHeader {
    pub fn new(declared_height: u32, palette_ref_path: impl Into<Vec<u8>>, base_width: u32) -> Self {
        let palette_ref_path = palette_ref_path.into();
        let palette_ref_len = palette_ref_path.len() as u32;

        Self {
            declared_height,
            palette_ref_len,
            palette_ref_path,
            base_width,
            frame_region_start: 12 + palette_ref_len as usize,
        }
    }

    /// Palette reference as text, without the trailing NULs some blobs carry.
    pub fn palette_ref(&self) -> Cow<'_, str> {
        let end = self
            .palette_ref_path
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |last| last + 1);

        String::from_utf8_lossy(&self.palette_ref_path[..end])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub header_offset: usize,
    pub payload_offset: usize,
    pub payload_size: u32,
    pub width: u16,
    pub height: u16,
    pub x_offset: u16,
    pub y_offset: u16,
    /// Meaning unknown, carried through untouched.
    pub flags: u16,
}

impl FrameHeader {
    /// Where the next header should start if the declared size is exact.
    pub fn payload_end(&self) -> usize {
        self.payload_offset + self.payload_size as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub width: u16,
    pub height: u16,
    pub x_offset: u16,
    pub y_offset: u16,
    pub flags: u16,
    // [[u8; width]; height], 0 is transparent
    pub pixels: Vec<u8>,
}

impl DecodedFrame {
    /// Fully transparent frame of the given size.
    pub fn blank(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            x_offset: 0,
            y_offset: 0,
            flags: 0,
            pixels: vec![TRANSPARENT_INDEX; width as usize * height as usize],
        }
    }

    pub fn index_at(&self, x: u16, y: u16) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }

        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn row(&self, y: u16) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }

        let width = self.width as usize;
        let start = y as usize * width;

        self.pixels.get(start..start + width)
    }

    pub fn is_transparent(&self) -> bool {
        self.pixels.iter().all(|&index| index == TRANSPARENT_INDEX)
    }
}

/// How picky the scanner is about the frames following the first one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Any header with in-range fields is accepted.
    #[default]
    General,
    /// Later frames must also stay within [`STRICT_DIMENSION_TOLERANCE`] pixels of the
    /// first frame's size. Suits animations where every frame has the same box.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub max_frames: usize,
    pub mode: ScanMode,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_frames: DEFAULT_MAX_FRAMES,
            mode: ScanMode::General,
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames;

        self
    }

    pub fn mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;

        self
    }
}

/// Something went sideways but a usable result was still produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// The payload ran out before every row was decoded.
    TruncatedPayload { frame_index: usize, rows_decoded: u16 },
    /// The declared payload size missed the next header, which was found nearby.
    Resynced {
        frame_index: usize,
        expected: usize,
        found: usize,
    },
    /// No header was found around the expected offset. The frame list ends here.
    UnrecoverableResync { frame_index: usize, expected: usize },
    /// The palette could not be read and the fallback gradient was used.
    PaletteUnavailable { reason: String },
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recovery::TruncatedPayload {
                frame_index,
                rows_decoded,
            } => write!(
                f,
                "frame {frame_index}: payload truncated after {rows_decoded} rows"
            ),
            Recovery::Resynced {
                frame_index,
                expected,
                found,
            } => write!(
                f,
                "frame {frame_index}: header expected at {expected:#x}, found at {found:#x}"
            ),
            Recovery::UnrecoverableResync {
                frame_index,
                expected,
            } => write!(
                f,
                "frame {frame_index}: no header near {expected:#x}, stopping"
            ),
            Recovery::PaletteUnavailable { reason } => {
                write!(f, "palette unavailable ({reason}), using fallback")
            }
        }
    }
}

/// Everything recovered from one blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AniSprite {
    pub header: MainHeader,
    pub frames: Vec<DecodedFrame>,
    pub recoveries: Vec<Recovery>,
}

impl AniSprite {
    pub fn new(header: MainHeader, frames: Vec<DecodedFrame>) -> Self {
        Self {
            header,
            frames,
            recoveries: vec![],
        }
    }

    pub fn max_width(&self) -> u16 {
        self.frames.iter().map(|frame| frame.width).max().unwrap_or(0)
    }

    pub fn max_height(&self) -> u16 {
        self.frames.iter().map(|frame| frame.height).max().unwrap_or(0)
    }
}

/// Frames of one blob together with the palette they are meant to be shown with.
#[derive(Debug, Clone)]
pub struct FrameSet<'p> {
    pub frames: Vec<DecodedFrame>,
    pub palette: &'p Palette,
}

impl FrameSet<'_> {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn into_frames(self) -> Vec<DecodedFrame> {
        self.frames
    }
}
