use log::trace;
use nom::{
    error::{make_error, ErrorKind},
    number::complete::le_u8,
    Parser,
};

use crate::{parser::IResult, DecodedFrame, FrameHeader, EMPTY_ROW_SENTINEL};

/// How far decoding of a single frame got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStatus {
    pub rows_decoded: u16,
    /// The payload ended before the last row.
    pub truncated: bool,
}

/// Decodes one frame into a dense buffer of palette indices.
///
/// Never fails. Rows that cannot be read because the payload is short stay transparent.
pub fn decode_frame(blob: &[u8], header: &FrameHeader) -> DecodedFrame {
    decode_frame_with_status(blob, header).0
}

pub fn decode_frame_with_status(blob: &[u8], header: &FrameHeader) -> (DecodedFrame, DecodeStatus) {
    let width = header.width as usize;

    let mut frame = DecodedFrame::blank(header.width, header.height);
    frame.x_offset = header.x_offset;
    frame.y_offset = header.y_offset;
    frame.flags = header.flags;

    // one cursor for the whole payload, rows are not length prefixed
    let end = header.payload_end().min(blob.len());
    let mut payload = blob.get(header.payload_offset..end).unwrap_or_default();

    let mut status = DecodeStatus {
        rows_decoded: 0,
        truncated: false,
    };

    for row in frame.pixels.chunks_exact_mut(width.max(1)) {
        match decode_row(payload, row) {
            Ok((rest, _)) => {
                payload = rest;
                status.rows_decoded += 1;
            }
            Err(_) => {
                trace!(
                    "payload at {:#x} ran out on row {}",
                    header.payload_offset,
                    status.rows_decoded
                );

                status.truncated = true;
                break;
            }
        }
    }

    (frame, status)
}

fn instruction(i: &'_ [u8]) -> IResult<'_, (u8, u8)> {
    (le_u8, le_u8).parse(i)
}

/// Decodes one row of `(skip, run, indices)` instructions into `row`.
///
/// Writes past the row width are dropped but their bytes are still consumed. When the input
/// runs out mid-run, the indices that were there are written before the error is returned.
fn decode_row<'a>(i: &'a [u8], row: &mut [u8]) -> IResult<'a, ()> {
    let (mut i, instruction_count) = le_u8(i)?;

    if instruction_count >= EMPTY_ROW_SENTINEL {
        return Ok((i, ()));
    }

    let mut x = 0usize;

    for _ in 0..instruction_count {
        let (rest, (skip, run)) = instruction(i)?;
        x += skip as usize;

        let run = run as usize;
        let indices = &rest[..run.min(rest.len())];

        if x < row.len() {
            let visible = indices.len().min(row.len() - x);
            row[x..x + visible].copy_from_slice(&indices[..visible]);
        }

        x += indices.len();

        if indices.len() < run {
            return Err(nom::Err::Error(make_error(&rest[indices.len()..], ErrorKind::Eof)));
        }

        i = &rest[run..];
    }

    Ok((i, ()))
}
