use std::{
    fs::{self, OpenOptions},
    io::BufWriter,
    path::{Path, PathBuf},
};

use ani::{
    compose_strip, upscale, write_gif, AniSprite, BlobProvider, DecodedFrame, Palette,
    ScanOptions,
};
use log::info;

use crate::{
    err,
    modules::{loose_folder::LooseFolder, palette::resolve_palette},
    utils::misc::maybe_add_extension_to_string,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Every frame side by side in one PNG
    #[default]
    Png,
    /// Looping animation
    Gif,
    /// One PNG per frame inside a folder
    Frames,
}

#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub zoom: u32,
    pub frame_delay_ms: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            zoom: 1,
            frame_delay_ms: 100,
        }
    }
}

/// Writes `frames` to `out` and returns the files written.
///
/// `out` gets a `.png` or `.gif` extension added when missing. For [`ExportFormat::Frames`] it
/// is a folder that receives `000.png`, `001.png` and so on.
pub fn export_frames(
    frames: &[DecodedFrame],
    palette: &Palette,
    out: &Path,
    options: &ExportOptions,
) -> eyre::Result<Vec<PathBuf>> {
    if frames.is_empty() {
        return err!("no frames to export to `{}`", out.display());
    }

    let out_string = out.to_string_lossy();

    let written = match options.format {
        ExportFormat::Png => {
            let path = PathBuf::from(maybe_add_extension_to_string(&out_string, "png"));
            let strip = upscale(compose_strip(frames, palette), options.zoom)?;

            strip.save(&path)?;

            vec![path]
        }
        ExportFormat::Gif => {
            let path = PathBuf::from(maybe_add_extension_to_string(&out_string, "gif"));

            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)?;

            write_gif(
                BufWriter::new(file),
                frames,
                palette,
                options.frame_delay_ms,
                options.zoom,
            )?;

            vec![path]
        }
        ExportFormat::Frames => {
            fs::create_dir_all(out)?;

            frames
                .iter()
                .enumerate()
                .map(|(frame_index, frame)| {
                    let path = out.join(format!("{frame_index:03}.png"));

                    upscale(frame.to_rgba8(palette), options.zoom)?.save(&path)?;

                    Ok(path)
                })
                .collect::<eyre::Result<Vec<PathBuf>>>()?
        }
    };

    Ok(written)
}

#[derive(Debug)]
pub struct ExportSummary {
    pub frames: usize,
    pub recoveries: Vec<ani::Recovery>,
    pub written: Vec<PathBuf>,
}

/// Exports a single blob.
#[derive(Default)]
pub struct Export {
    blob: Option<PathBuf>,
    out: Option<PathBuf>,
    palette: Option<PathBuf>,
    // lets the blob's own palette reference resolve
    root_folder: Option<PathBuf>,
    default_palette: Option<PathBuf>,
    scan_options: ScanOptions,
    options: ExportOptions,
}

impl Export {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blob(&mut self, path: impl AsRef<Path> + Into<PathBuf>) -> &mut Self {
        self.blob = Some(path.into());

        self
    }

    pub fn out(&mut self, path: impl AsRef<Path> + Into<PathBuf>) -> &mut Self {
        self.out = Some(path.into());

        self
    }

    pub fn palette(&mut self, path: Option<PathBuf>) -> &mut Self {
        self.palette = path;

        self
    }

    pub fn root_folder(&mut self, path: Option<PathBuf>) -> &mut Self {
        self.root_folder = path;

        self
    }

    pub fn default_palette(&mut self, path: Option<PathBuf>) -> &mut Self {
        self.default_palette = path;

        self
    }

    pub fn scan_options(&mut self, scan_options: ScanOptions) -> &mut Self {
        self.scan_options = scan_options;

        self
    }

    pub fn options(&mut self, options: ExportOptions) -> &mut Self {
        self.options = options;

        self
    }

    pub fn run(&self) -> eyre::Result<ExportSummary> {
        let Some(blob) = self.blob.as_ref() else {
            return err!("blob is not set");
        };

        let Some(out) = self.out.as_ref() else {
            return err!("output is not set");
        };

        let sprite = AniSprite::open_from_file(blob, &self.scan_options)?;

        let folder = self
            .root_folder
            .as_ref()
            .map(|root| LooseFolder::new(root.as_path()))
            .transpose()?;

        let (palette, palette_recovery) = resolve_palette(
            self.palette.as_deref(),
            &sprite.header.palette_ref(),
            folder.as_ref().map(|folder| folder as &dyn BlobProvider),
            self.default_palette.as_deref(),
        )?;

        let written = export_frames(&sprite.frames, &palette, out, &self.options)?;

        info!(
            "exported {} frames of `{}` to `{}`",
            sprite.frames.len(),
            blob.display(),
            out.display()
        );

        let AniSprite {
            frames,
            mut recoveries,
            ..
        } = sprite;

        recoveries.extend(palette_recovery);

        Ok(ExportSummary {
            frames: frames.len(),
            recoveries,
            written,
        })
    }
}

#[cfg(test)]
mod test {
    use ani::{write_sprite, MainHeader};

    use super::*;
    use crate::utils::misc::scratch_folder;

    fn frames() -> Vec<DecodedFrame> {
        (0..3)
            .map(|i| {
                let mut frame = DecodedFrame::blank(4 + i, 6 - i);
                frame.pixels.fill(i as u8 + 1);

                frame
            })
            .collect()
    }

    #[test]
    fn strip_png() {
        let out = scratch_folder("ztdump_export_strip").join("strip");
        let options = ExportOptions {
            zoom: 2,
            ..Default::default()
        };

        let written = export_frames(&frames(), &Palette::fallback(), &out, &options).unwrap();

        assert_eq!(written, vec![out.with_extension("png")]);

        let image = image::open(&written[0]).unwrap();
        // cells of 6x6, three of them, zoomed twice
        assert_eq!((image.width(), image.height()), (36, 12));
    }

    #[test]
    fn gif() {
        let out = scratch_folder("ztdump_export_gif").join("anim.gif");
        let options = ExportOptions {
            format: ExportFormat::Gif,
            ..Default::default()
        };

        let written = export_frames(&frames(), &Palette::fallback(), &out, &options).unwrap();

        assert_eq!(written, vec![out.clone()]);
        assert_eq!(&fs::read(&out).unwrap()[..6], b"GIF89a");
    }

    #[test]
    fn one_png_per_frame() {
        let out = scratch_folder("ztdump_export_frames").join("frames");
        let options = ExportOptions {
            format: ExportFormat::Frames,
            ..Default::default()
        };

        let written = export_frames(&frames(), &Palette::fallback(), &out, &options).unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(written[2], out.join("002.png"));
        assert_eq!(image::open(&written[1]).unwrap().width(), 5);
    }

    #[test]
    fn oversized_zoom_is_an_error() {
        let out = scratch_folder("ztdump_export_zoom");
        let frames = [DecodedFrame::blank(4096, 1)];

        for format in [ExportFormat::Png, ExportFormat::Gif, ExportFormat::Frames] {
            let options = ExportOptions {
                format,
                zoom: 2_000_000,
                ..Default::default()
            };

            assert!(export_frames(&frames, &Palette::fallback(), &out.join("zoom"), &options).is_err());
        }
    }

    #[test]
    fn nothing_to_export() {
        let out = scratch_folder("ztdump_export_nothing").join("empty");

        assert!(export_frames(&[], &Palette::fallback(), &out, &ExportOptions::default()).is_err());
    }

    #[test]
    fn export_blob_with_fallback_palette() {
        let folder = scratch_folder("ztdump_export_blob");
        let blob = folder.join("N");
        fs::write(&blob, write_sprite(&MainHeader::new(10, "pal", 40), &frames())).unwrap();

        let summary = Export::new()
            .blob(blob.as_path())
            .out(folder.join("N_strip"))
            .run()
            .unwrap();

        assert_eq!(summary.frames, 3);
        assert!(matches!(
            summary.recoveries.as_slice(),
            [ani::Recovery::PaletteUnavailable { .. }]
        ));
        assert!(summary.written[0].exists());
    }
}
