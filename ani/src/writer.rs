use byte_writer::ByteWriter;

use crate::{AniSprite, DecodedFrame, MainHeader, EMPTY_ROW_SENTINEL, MIN_PAYLOAD_SIZE, TRANSPARENT_INDEX};

const MAX_SPAN: usize = u8::MAX as usize;

trait WriteToWriter {
    fn write_to_bytes(&self, writer: &mut ByteWriter);
}

/// Encodes a main header followed by `frames`.
///
/// Frames come out byte exact for the scanner, so no resync is ever needed on the result.
pub fn write_sprite(header: &MainHeader, frames: &[DecodedFrame]) -> Vec<u8> {
    let mut writer = ByteWriter::new();

    header.write_to_bytes(&mut writer);
    frames
        .iter()
        .for_each(|frame| frame.write_to_bytes(&mut writer));

    writer.data
}

impl AniSprite {
    pub fn write_to_bytes(&self) -> Vec<u8> {
        write_sprite(&self.header, &self.frames)
    }
}

impl WriteToWriter for MainHeader {
    fn write_to_bytes(&self, writer: &mut ByteWriter) {
        let Self {
            declared_height,
            palette_ref_path,
            base_width,
            ..
        } = self;

        writer.append_u32(*declared_height);
        // the stored length is ignored, the path is what gets written
        writer.append_u32(palette_ref_path.len() as u32);
        writer.append_u8_slice(palette_ref_path);
        writer.append_u32(*base_width);
    }
}

impl WriteToWriter for DecodedFrame {
    fn write_to_bytes(&self, writer: &mut ByteWriter) {
        let Self {
            width,
            height,
            x_offset,
            y_offset,
            flags,
            pixels,
        } = self;

        let size_at = writer.get_offset();

        writer.append_u32(0);
        writer.append_u16(*height);
        writer.append_u16(*width);
        writer.append_u16(*x_offset);
        writer.append_u16(*y_offset);
        writer.append_u16(*flags);

        let payload_start = writer.get_offset();

        if *width > 0 {
            pixels
                .chunks(*width as usize)
                .for_each(|row| write_row(row, writer));
        }

        // the scanner rejects anything shorter, the decoder never reads the padding
        while writer.get_offset() - payload_start < MIN_PAYLOAD_SIZE as usize {
            writer.append_u8(0);
        }

        let payload_size = writer.get_offset() - payload_start;
        writer.replace_with_u32(size_at, payload_size as u32);
    }
}

/// Splits a row into `(skip, indices)` spans over its non-transparent pixels.
fn row_spans(row: &[u8]) -> Vec<(u8, &[u8])> {
    let mut spans = vec![];
    let mut pending_skip = 0usize;
    let mut x = 0;

    while x < row.len() {
        if row[x] == TRANSPARENT_INDEX {
            pending_skip += 1;
            x += 1;
            continue;
        }

        while pending_skip > MAX_SPAN {
            spans.push((MAX_SPAN as u8, &row[..0]));
            pending_skip -= MAX_SPAN;
        }

        let start = x;
        while x < row.len() && row[x] != TRANSPARENT_INDEX && x - start < MAX_SPAN {
            x += 1;
        }

        spans.push((pending_skip as u8, &row[start..x]));
        pending_skip = 0;
    }

    spans
}

fn write_row(row: &[u8], writer: &mut ByteWriter) {
    let mut spans = row_spans(row);

    // the count has to stay below the empty row sentinel, so busy rows are written whole
    if spans.len() >= EMPTY_ROW_SENTINEL as usize {
        spans = row.chunks(MAX_SPAN).map(|chunk| (0, chunk)).collect();
    }

    writer.append_u8(spans.len() as u8);

    spans.iter().for_each(|(skip, indices)| {
        writer.append_u8(*skip);
        writer.append_u8(indices.len() as u8);
        writer.append_u8_slice(indices);
    });
}
