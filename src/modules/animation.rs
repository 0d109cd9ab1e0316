use std::path::{Path, PathBuf};

use ani::{parse_main_header, AniManifest, AniSprite, BlobProvider, Palette, Recovery, ScanOptions};
use log::{info, warn};
use rayon::prelude::*;

use crate::{
    err,
    modules::{
        export::{export_frames, ExportOptions},
        loose_folder::LooseFolder,
        palette::resolve_palette,
    },
};

#[derive(Debug)]
pub struct DirectionExport {
    pub direction: String,
    /// Frames written, or why nothing was.
    pub result: eyre::Result<usize>,
}

#[derive(Debug)]
pub struct AnimationSummary {
    pub manifest: AniManifest,
    pub palette_recovery: Option<Recovery>,
    pub directions: Vec<DirectionExport>,
}

/// Exports every direction an `.ani` manifest lists.
///
/// All directions share the palette named by the first direction blob that has a readable
/// header, and are decoded in parallel.
pub struct AnimationExport<'a> {
    pub folder: &'a LooseFolder,
    pub palette: Option<&'a Path>,
    pub default_palette: Option<&'a Path>,
    pub scan_options: ScanOptions,
    pub options: ExportOptions,
}

impl AnimationExport<'_> {
    pub fn run(&self, ani_path: &str, out: &Path) -> eyre::Result<AnimationSummary> {
        let Some(manifest_bytes) = self.folder.get_blob(ani_path) else {
            return err!(
                "cannot find `{}` under `{}`",
                ani_path,
                self.folder.root().display()
            );
        };

        let manifest = AniManifest::open_from_bytes(&manifest_bytes)?;

        info!(
            "`{}`: {} directions in `{}`, box {}x{}",
            ani_path,
            manifest.directions.len(),
            manifest.directory(),
            manifest.width(),
            manifest.height()
        );

        let blobs: Vec<(String, Option<Vec<u8>>)> = manifest
            .directions
            .iter()
            .zip(manifest.direction_paths())
            .map(|(direction, path)| (direction.clone(), self.folder.get_blob(&path)))
            .collect();

        let palette_ref = blobs
            .iter()
            .filter_map(|(_, blob)| blob.as_deref())
            .find_map(|blob| parse_main_header(blob).ok())
            .map(|header| header.palette_ref().into_owned())
            .unwrap_or_default();

        let (palette, palette_recovery) = resolve_palette(
            self.palette,
            &palette_ref,
            Some(self.folder as &dyn BlobProvider),
            self.default_palette,
        )?;

        std::fs::create_dir_all(out)?;

        let directions = blobs
            .par_iter()
            .map(|(direction, blob)| DirectionExport {
                direction: direction.clone(),
                result: self.export_direction(direction, blob.as_deref(), &palette, out),
            })
            .collect();

        Ok(AnimationSummary {
            manifest,
            palette_recovery,
            directions,
        })
    }

    fn export_direction(
        &self,
        direction: &str,
        blob: Option<&[u8]>,
        palette: &Palette,
        out: &Path,
    ) -> eyre::Result<usize> {
        let Some(blob) = blob else {
            warn!("direction `{direction}` has no blob");
            return err!("missing blob");
        };

        let sprite = AniSprite::open_from_bytes(blob, &self.scan_options)?;
        let out_path: PathBuf = out.join(direction);

        export_frames(&sprite.frames, palette, &out_path, &self.options)?;

        Ok(sprite.frames.len())
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use ani::{write_sprite, DecodedFrame, MainHeader, RGB_PALETTE_LEN};

    use super::*;
    use crate::utils::misc::scratch_folder;

    fn blob(frame_count: u16) -> Vec<u8> {
        let frames: Vec<DecodedFrame> = (0..frame_count)
            .map(|i| {
                let mut frame = DecodedFrame::blank(8, 8 + i);
                frame.pixels.fill(1);

                frame
            })
            .collect();

        write_sprite(&MainHeader::new(48, "Animals\\Zebra\\zebra.pal", 32), &frames)
    }

    #[test]
    fn export_all_directions() {
        let root = scratch_folder("ztdump_animation_root");
        let walk = root.join("animals").join("zebra").join("walk");
        fs::create_dir_all(&walk).unwrap();

        fs::write(
            root.join("animals").join("zebra").join("Walk.ani"),
            "[animation]\ndir0 = animals\ndir1 = zebra\ndir2 = walk\nanimation = N\nanimation = S\nanimation = W\n",
        )
        .unwrap();
        fs::write(walk.join("N"), blob(2)).unwrap();
        fs::write(walk.join("s"), blob(3)).unwrap();

        let mut palette = vec![0u8; RGB_PALETTE_LEN];
        palette[3..6].copy_from_slice(&[9, 8, 7]);
        fs::write(root.join("animals").join("zebra").join("zebra.pal"), palette).unwrap();

        let folder = LooseFolder::new(root.as_path()).unwrap();
        let out = scratch_folder("ztdump_animation_out");

        let export = AnimationExport {
            folder: &folder,
            palette: None,
            default_palette: None,
            scan_options: ScanOptions::default(),
            options: ExportOptions::default(),
        };

        let summary = export.run("animals/zebra/walk.ani", &out).unwrap();

        assert!(summary.palette_recovery.is_none());
        assert_eq!(summary.directions.len(), 3);

        assert_eq!(summary.directions[0].direction, "N");
        assert_eq!(*summary.directions[0].result.as_ref().unwrap(), 2);
        assert_eq!(*summary.directions[1].result.as_ref().unwrap(), 3);
        assert!(summary.directions[2].result.is_err());

        let strip = image::open(out.join("S.png")).unwrap().to_rgba8();
        assert_eq!(strip.dimensions(), (24, 10));
        assert_eq!(strip.get_pixel(0, 9).0, [9, 8, 7, 255]);
    }

    #[test]
    fn missing_manifest() {
        let root = scratch_folder("ztdump_animation_empty_root");

        let folder = LooseFolder::new(root.as_path()).unwrap();
        let export = AnimationExport {
            folder: &folder,
            palette: None,
            default_palette: None,
            scan_options: ScanOptions::default(),
            options: ExportOptions::default(),
        };

        assert!(export.run("nothing.ani", &root).is_err());
    }
}
