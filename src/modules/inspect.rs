use std::{fmt::Write, path::Path};

use ani::{decode_frame_with_status, parse_main_header, scan_with_options, ScanOptions};

/// Human readable dump of everything the reader finds in a blob.
pub fn inspect_blob(blob: &[u8], options: &ScanOptions) -> eyre::Result<String> {
    let header = parse_main_header(blob)?;
    let report = scan_with_options(blob, header.frame_region_start, options);

    let mut res = String::new();

    writeln!(res, "size: {} bytes", blob.len())?;
    writeln!(res, "declared height: {}", header.declared_height)?;
    writeln!(res, "palette: `{}`", header.palette_ref())?;
    writeln!(res, "base width: {}", header.base_width)?;
    writeln!(res, "frames: {}", report.headers.len())?;

    for (frame_index, frame_header) in report.headers.iter().enumerate() {
        let (_, status) = decode_frame_with_status(blob, frame_header);

        write!(
            res,
            "  #{frame_index:<3} @ {:#07x}  {}x{} at ({}, {})  flags {:#06x}  payload {} bytes",
            frame_header.header_offset,
            frame_header.width,
            frame_header.height,
            frame_header.x_offset,
            frame_header.y_offset,
            frame_header.flags,
            frame_header.payload_size
        )?;

        if status.truncated {
            write!(res, "  truncated after {} rows", status.rows_decoded)?;
        }

        writeln!(res)?;
    }

    writeln!(res, "stopped: {:?}", report.stop)?;

    for recovery in &report.recoveries {
        writeln!(res, "recovered: {recovery}")?;
    }

    Ok(res)
}

pub fn inspect_file(path: &Path, options: &ScanOptions) -> eyre::Result<String> {
    let bytes = std::fs::read(path)?;

    inspect_blob(&bytes, options)
}
