//! Walks the frame headers of a blob.
//!
//! Declared payload sizes are not always byte exact, so after each frame the scanner first
//! tries the offset the size points at and otherwise searches a small window around it for
//! something that looks like a header. The window is bounded on both sides, which keeps the
//! cost per frame constant and limits how far a bad size can drag the scan.
//!
//! The header check is only a plausibility test. Pixel data can happen to look like a valid
//! header inside the window, in which case the scan continues from garbage and the frame list
//! comes out wrong. Strict mode narrows this for uniformly sized animations but does not rule
//! it out.
use log::{debug, trace, warn};

use crate::{
    parser::parse_frame_header, FrameHeader, Recovery, ScanMode, ScanOptions,
    FRAME_HEADER_SIZE, MAX_FRAME_DIMENSION, MIN_PAYLOAD_SIZE, RESYNC_LOOKAHEAD,
    RESYNC_LOOKBEHIND, STRICT_DIMENSION_TOLERANCE,
};

/// Why the scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStop {
    /// Not enough bytes left for another header.
    EndOfData,
    /// `max_frames` headers were collected.
    FrameLimit,
    /// The header at `offset` failed validation.
    InvalidHeader { offset: usize },
    /// Nothing plausible was found around `expected`.
    UnrecoverableResync { expected: usize },
}

#[derive(Debug, Clone)]
pub struct ScanReport {
    pub headers: Vec<FrameHeader>,
    pub recoveries: Vec<Recovery>,
    pub stop: ScanStop,
}

/// Collects up to `max_frames` frame headers starting at `frame_region_start`.
///
/// Never fails. Whatever was found before the first bad header is returned.
pub fn scan(blob: &[u8], frame_region_start: usize, max_frames: usize) -> Vec<FrameHeader> {
    let options = ScanOptions::default().max_frames(max_frames);

    scan_with_options(blob, frame_region_start, &options).headers
}

pub fn scan_with_options(
    blob: &[u8],
    frame_region_start: usize,
    options: &ScanOptions,
) -> ScanReport {
    let mut headers: Vec<FrameHeader> = vec![];
    let mut recoveries = vec![];
    let mut cursor = frame_region_start;

    let stop = loop {
        if headers.len() >= options.max_frames {
            break ScanStop::FrameLimit;
        }

        if cursor + FRAME_HEADER_SIZE > blob.len() {
            break ScanStop::EndOfData;
        }

        let Some(header) = read_valid_header(blob, cursor, headers.first(), options.mode) else {
            debug!("no valid frame header at {cursor:#x}");
            break ScanStop::InvalidHeader { offset: cursor };
        };

        debug!(
            "frame {} at {:#x}: {}x{} payload {} bytes",
            headers.len(),
            cursor,
            header.width,
            header.height,
            header.payload_size
        );

        headers.push(header);

        let expected = header.payload_end();

        // the payload fills the rest of the blob exactly, nothing left to find
        if expected == blob.len() {
            break ScanStop::EndOfData;
        }

        if read_valid_header(blob, expected, headers.first(), options.mode).is_some() {
            cursor = expected;
            continue;
        }

        match resync(blob, &header, headers.first(), options.mode) {
            Some(found) => {
                debug!("resynced frame {}: {expected:#x} -> {found:#x}", headers.len());

                recoveries.push(Recovery::Resynced {
                    frame_index: headers.len(),
                    expected,
                    found,
                });

                cursor = found;
            }
            None => {
                let recovery = Recovery::UnrecoverableResync {
                    frame_index: headers.len(),
                    expected,
                };

                warn!("{recovery}");
                recoveries.push(recovery);

                break ScanStop::UnrecoverableResync { expected };
            }
        }
    };

    ScanReport {
        headers,
        recoveries,
        stop,
    }
}

/// Searches `[max(payload_offset, expected - 30), expected + 200]` for the first plausible header.
fn resync(
    blob: &[u8],
    previous: &FrameHeader,
    reference: Option<&FrameHeader>,
    mode: ScanMode,
) -> Option<usize> {
    let expected = previous.payload_end();
    let first = expected
        .saturating_sub(RESYNC_LOOKBEHIND)
        .max(previous.payload_offset);
    let last = (expected + RESYNC_LOOKAHEAD).min(blob.len().saturating_sub(FRAME_HEADER_SIZE));

    (first..=last).find(|&candidate| read_valid_header(blob, candidate, reference, mode).is_some())
}

fn read_valid_header(
    blob: &[u8],
    offset: usize,
    reference: Option<&FrameHeader>,
    mode: ScanMode,
) -> Option<FrameHeader> {
    let (_, header) = parse_frame_header(blob.get(offset..)?, offset).ok()?;

    let valid = is_plausible(&header, blob.len(), reference, mode);

    trace!(
        "candidate {offset:#x}: size {} {}x{} -> {valid}",
        header.payload_size,
        header.width,
        header.height
    );

    valid.then_some(header)
}

fn is_plausible(
    header: &FrameHeader,
    blob_len: usize,
    reference: Option<&FrameHeader>,
    mode: ScanMode,
) -> bool {
    let dimension_range = 1..=MAX_FRAME_DIMENSION;

    if header.payload_size < MIN_PAYLOAD_SIZE || header.payload_size as usize > blob_len {
        return false;
    }

    if !dimension_range.contains(&header.width) || !dimension_range.contains(&header.height) {
        return false;
    }

    if header.payload_end() > blob_len {
        return false;
    }

    match (mode, reference) {
        (ScanMode::Strict, Some(first)) => {
            header.width.abs_diff(first.width) <= STRICT_DIMENSION_TOLERANCE
                && header.height.abs_diff(first.height) <= STRICT_DIMENSION_TOLERANCE
        }
        _ => true,
    }
}
