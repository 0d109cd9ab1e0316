use std::path::{Path, PathBuf};

use ani::{AniSprite, BlobProvider, Palette, ScanOptions};
use log::{debug, info, warn};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::{
    modules::{
        export::{export_frames, ExportOptions},
        loose_folder::LooseFolder,
        palette::resolve_palette,
    },
    utils::misc::{flatten_relative_path, is_sidecar_file},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Blobs that produced at least one frame and were written.
    pub exported: usize,
    /// Valid header but no frames.
    pub empty: usize,
    /// Not a blob, or exporting failed.
    pub failed: usize,
}

enum Outcome {
    Exported,
    Empty,
    Failed,
}

/// Decodes every non sidecar file under a folder and exports the ones with frames.
pub struct BatchExport<'a> {
    pub palette: Option<&'a Path>,
    pub default_palette: Option<&'a Path>,
    pub scan_options: ScanOptions,
    pub options: ExportOptions,
}

impl BatchExport<'_> {
    pub fn run(&self, folder: &Path, out: &Path) -> eyre::Result<BatchSummary> {
        let loose_folder = LooseFolder::new(folder)?;

        let paths: Vec<PathBuf> = WalkDir::new(folder)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| !is_sidecar_file(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        info!("{} candidate blobs under `{}`", paths.len(), folder.display());

        // an explicit palette is read once instead of per blob
        let explicit = self
            .palette
            .map(|path| resolve_palette(Some(path), "", None, None))
            .transpose()?
            .map(|(palette, _)| palette);

        std::fs::create_dir_all(out)?;

        let outcomes: Vec<Outcome> = paths
            .par_iter()
            .map(|path| {
                let out_path = out.join(flatten_relative_path(folder, path));

                match self.export_blob(path, explicit.as_ref(), &loose_folder, &out_path) {
                    Ok(0) => Outcome::Empty,
                    Ok(_) => Outcome::Exported,
                    Err(err) => {
                        debug!("skipping `{}`: {}", path.display(), err);
                        Outcome::Failed
                    }
                }
            })
            .collect();

        let summary = outcomes
            .iter()
            .fold(BatchSummary::default(), |mut summary, outcome| {
                match outcome {
                    Outcome::Exported => summary.exported += 1,
                    Outcome::Empty => summary.empty += 1,
                    Outcome::Failed => summary.failed += 1,
                }

                summary
            });

        Ok(summary)
    }

    fn export_blob(
        &self,
        path: &Path,
        explicit: Option<&Palette>,
        loose_folder: &LooseFolder,
        out: &Path,
    ) -> eyre::Result<usize> {
        let sprite = AniSprite::open_from_file(path, &self.scan_options)?;

        if sprite.frames.is_empty() {
            return Ok(0);
        }

        sprite
            .recoveries
            .iter()
            .for_each(|recovery| warn!("`{}`: {}", path.display(), recovery));

        match explicit {
            Some(palette) => export_frames(&sprite.frames, palette, out, &self.options)?,
            None => {
                let (palette, _) = resolve_palette(
                    None,
                    &sprite.header.palette_ref(),
                    Some(loose_folder as &dyn BlobProvider),
                    self.default_palette,
                )?;

                export_frames(&sprite.frames, &palette, out, &self.options)?
            }
        };

        Ok(sprite.frames.len())
    }
}
