use nom::{
    bytes::complete::take,
    combinator::map,
    number::complete::{le_u16, le_u32},
    IResult as _IResult, Parser,
};

use crate::{
    error::AniError, FrameHeader, MainHeader, BASE_WIDTH_MAX, FRAME_HEADER_SIZE,
    MAIN_HEADER_MIN_LEN, PALETTE_REF_MAX_LEN,
};

pub type IResult<'a, T> = _IResult<&'a [u8], T>;

fn parse_prologue(i: &'_ [u8]) -> IResult<'_, (u32, u32)> {
    (le_u32, le_u32).parse(i)
}

fn parse_palette_ref(i: &'_ [u8], length: usize) -> IResult<'_, &'_ [u8]> {
    take(length).parse(i)
}

fn parse_base_width(i: &'_ [u8]) -> IResult<'_, u32> {
    le_u32(i)
}

/// Reads the 14 byte frame header at the start of `i`.
///
/// Nothing is validated here. `header_offset` is where `i` starts inside the blob.
pub fn parse_frame_header(i: &'_ [u8], header_offset: usize) -> IResult<'_, FrameHeader> {
    map(
        (le_u32, le_u16, le_u16, le_u16, le_u16, le_u16),
        |(payload_size, height, width, x_offset, y_offset, flags)| FrameHeader {
            header_offset,
            payload_offset: header_offset + FRAME_HEADER_SIZE,
            payload_size,
            width,
            height,
            x_offset,
            y_offset,
            flags,
        },
    )
    .parse(i)
}

pub fn parse_main_header(blob: &[u8]) -> Result<MainHeader, AniError> {
    if blob.len() < MAIN_HEADER_MIN_LEN {
        return Err(AniError::header(format!(
            "blob is {} bytes, need at least {MAIN_HEADER_MIN_LEN}",
            blob.len()
        )));
    }

    let (i, (declared_height, palette_ref_len)) =
        parse_prologue(blob).map_err(|_| AniError::header("cannot read prologue"))?;

    if palette_ref_len == 0 || palette_ref_len > PALETTE_REF_MAX_LEN {
        return Err(AniError::header(format!(
            "palette reference length {palette_ref_len} is outside 1..={PALETTE_REF_MAX_LEN}"
        )));
    }

    let (i, palette_ref_path) = parse_palette_ref(i, palette_ref_len as usize).map_err(|_| {
        AniError::header(format!(
            "palette reference of {palette_ref_len} bytes runs past the end"
        ))
    })?;

    let (_, base_width) =
        parse_base_width(i).map_err(|_| AniError::header("base width runs past the end"))?;

    if base_width == 0 || base_width > BASE_WIDTH_MAX {
        return Err(AniError::header(format!(
            "base width {base_width} is outside 1..={BASE_WIDTH_MAX}"
        )));
    }

    let frame_region_start = 12 + palette_ref_len as usize;

    if frame_region_start >= blob.len() {
        return Err(AniError::header(format!(
            "frame region would start at {frame_region_start}, blob is {} bytes",
            blob.len()
        )));
    }

    Ok(MainHeader {
        declared_height,
        palette_ref_len,
        palette_ref_path: palette_ref_path.to_vec(),
        base_width,
        frame_region_start,
    })
}

#[cfg(test)]
mod test {
    use byte_writer::ByteWriter;

    use super::*;

    fn prologue(palette_ref: &[u8], base_width: u32) -> ByteWriter {
        let mut writer = ByteWriter::new();

        writer.append_u32(10);
        writer.append_u32(palette_ref.len() as u32);
        writer.append_u8_slice(palette_ref);
        writer.append_u32(base_width);

        writer
    }

    #[test]
    fn parse_prologue_fields() {
        let mut writer = prologue(b"pal/zoo.pal", 40);
        writer.append_u8_slice(&[0; 16]);

        let header = parse_main_header(&writer.data).unwrap();

        assert_eq!(header.declared_height, 10);
        assert_eq!(header.palette_ref_len, 11);
        assert_eq!(header.palette_ref(), "pal/zoo.pal");
        assert_eq!(header.base_width, 40);
        assert_eq!(header.frame_region_start, 23);
    }

    #[test]
    fn palette_ref_trailing_nul_is_trimmed() {
        let mut writer = prologue(b"pal\0", 40);
        writer.append_u8_slice(&[0; 16]);

        let header = parse_main_header(&writer.data).unwrap();

        assert_eq!(header.palette_ref_path, b"pal\0");
        assert_eq!(header.palette_ref(), "pal");
    }

    #[test]
    fn non_utf8_palette_ref_is_not_fatal() {
        let mut writer = prologue(&[0xff, 0xfe, b'a'], 40);
        writer.append_u8_slice(&[0; 16]);

        let header = parse_main_header(&writer.data).unwrap();

        assert!(header.palette_ref().ends_with('a'));
    }

    #[test]
    fn reject_short_blob() {
        assert!(matches!(
            parse_main_header(&[0; 19]),
            Err(AniError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn reject_palette_ref_len_out_of_range() {
        let mut zero = ByteWriter::new();
        zero.append_u32(10);
        zero.append_u32(0);
        zero.append_u8_slice(&[1; 24]);

        assert!(parse_main_header(&zero.data).is_err());

        let mut huge = ByteWriter::new();
        huge.append_u32(10);
        huge.append_u32(201);
        huge.append_u8_slice(&[1; 300]);

        assert!(parse_main_header(&huge.data).is_err());
    }

    #[test]
    fn reject_base_width_out_of_range() {
        let mut zero = prologue(b"pal", 0);
        zero.append_u8_slice(&[0; 16]);
        assert!(parse_main_header(&zero.data).is_err());

        let mut wide = prologue(b"pal", 5001);
        wide.append_u8_slice(&[0; 16]);
        assert!(parse_main_header(&wide.data).is_err());

        let mut widest = prologue(b"pal", 5000);
        widest.append_u8_slice(&[0; 16]);
        assert!(parse_main_header(&widest.data).is_ok());
    }

    #[test]
    fn reject_palette_ref_past_end() {
        let mut writer = ByteWriter::new();
        writer.append_u32(10);
        writer.append_u32(150);
        writer.append_u8_slice(&[b'a'; 20]);

        assert!(parse_main_header(&writer.data).is_err());
    }

    #[test]
    fn reject_empty_frame_region() {
        // 20 bytes exactly, frame region starts at 20
        let writer = prologue(b"palette!", 40);
        assert_eq!(writer.data.len(), 20);

        assert!(parse_main_header(&writer.data).is_err());
    }

    #[test]
    fn frame_header_field_order() {
        let mut writer = ByteWriter::new();
        writer.append_u32(660);
        writer.append_u16(20);
        writer.append_u16(30);
        writer.append_u16(3);
        writer.append_u16(4);
        writer.append_u16(0xbeef);

        let (rest, header) = parse_frame_header(&writer.data, 15).unwrap();

        assert!(rest.is_empty());
        assert_eq!(header.header_offset, 15);
        assert_eq!(header.payload_offset, 29);
        assert_eq!(header.payload_size, 660);
        assert_eq!(header.height, 20);
        assert_eq!(header.width, 30);
        assert_eq!(header.x_offset, 3);
        assert_eq!(header.y_offset, 4);
        assert_eq!(header.flags, 0xbeef);
        assert_eq!(header.payload_end(), 689);
    }
}
