use std::{ffi::OsStr, path::Path};

use image::{RgbImage, RgbaImage};
use log::{debug, warn};

use crate::{
    decoder::decode_frame_with_status, error::AniError, parser::parse_main_header,
    scanner::scan_with_options, AniSprite, DecodedFrame, FrameSet, Palette, Recovery,
    ScanOptions,
};

/// Decodes every frame the scanner can find.
///
/// Only a broken main header is an error. A short frame list or frames with missing rows are
/// normal for this format; compare the frame count against what you expect if that matters.
pub fn decode_all<'p>(blob: &[u8], palette: &'p Palette) -> Result<FrameSet<'p>, AniError> {
    let sprite = AniSprite::open_from_bytes(blob, &ScanOptions::default())?;

    Ok(FrameSet {
        frames: sprite.frames,
        palette,
    })
}

/// Lowercases, turns `\` into `/` and drops leading and trailing slashes.
pub fn normalize_path(path: &str) -> String {
    path.to_lowercase()
        .replace('\\', "/")
        .trim_matches('/')
        .to_string()
}

impl AniSprite {
    pub fn open_from_bytes(blob: &[u8], options: &ScanOptions) -> Result<AniSprite, AniError> {
        let header = parse_main_header(blob)?;

        debug!(
            "main header: declared height {}, palette `{}`, base width {}",
            header.declared_height,
            header.palette_ref(),
            header.base_width
        );

        let report = scan_with_options(blob, header.frame_region_start, options);
        let mut recoveries = report.recoveries;

        debug!(
            "{} frame headers, scan stopped: {:?}",
            report.headers.len(),
            report.stop
        );

        let frames = report
            .headers
            .iter()
            .enumerate()
            .map(|(frame_index, frame_header)| {
                let (frame, status) = decode_frame_with_status(blob, frame_header);

                if status.truncated {
                    let recovery = Recovery::TruncatedPayload {
                        frame_index,
                        rows_decoded: status.rows_decoded,
                    };

                    warn!("{recovery}");
                    recoveries.push(recovery);
                }

                frame
            })
            .collect();

        Ok(AniSprite {
            header,
            frames,
            recoveries,
        })
    }

    pub fn open_from_file(
        path: impl AsRef<OsStr> + AsRef<Path>,
        options: &ScanOptions,
    ) -> Result<AniSprite, AniError> {
        let bytes = std::fs::read(path)?;

        Self::open_from_bytes(&bytes, options)
    }
}

impl DecodedFrame {
    /// Palette colors with index 0 fully transparent.
    pub fn to_rgba8(&self, palette: &Palette) -> RgbaImage {
        let stride_length = self.width as u32;
        let mut image = RgbaImage::new(self.width as u32, self.height as u32);

        image.enumerate_pixels_mut().for_each(|(x, y, pixel)| {
            let color_index = self.pixels[(x + y * stride_length) as usize];
            *pixel = palette.rgba(color_index);
        });

        image
    }

    /// Palette colors without transparency, index 0 shows its palette entry.
    pub fn to_rgb8(&self, palette: &Palette) -> RgbImage {
        let stride_length = self.width as u32;
        let mut image = RgbImage::new(self.width as u32, self.height as u32);

        image.enumerate_pixels_mut().for_each(|(x, y, pixel)| {
            let color_index = self.pixels[(x + y * stride_length) as usize];
            *pixel = palette.get(color_index).into();
        });

        image
    }
}

impl FrameSet<'_> {
    pub fn to_rgba8(&self, frame_index: usize) -> Option<RgbaImage> {
        self.frames
            .get(frame_index)
            .map(|frame| frame.to_rgba8(self.palette))
    }
}
