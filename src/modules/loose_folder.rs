use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use ani::{normalize_path, BlobProvider};
use log::{debug, warn};
use walkdir::WalkDir;

use crate::err;

/// Extracted resource archive on disk.
///
/// Resource paths inside the game are case-insensitive and use either slash, while the
/// extracted files keep whatever case the archive had. Every file is indexed once by its
/// normalized relative path so lookups do not depend on the host file system.
pub struct LooseFolder {
    root: PathBuf,
    index: HashMap<String, PathBuf>,
}

impl LooseFolder {
    pub fn new(root: impl AsRef<Path> + Into<PathBuf>) -> eyre::Result<Self> {
        let root: PathBuf = root.into();

        if !root.is_dir() {
            return err!("`{}` is not a folder", root.display());
        }

        let index: HashMap<String, PathBuf> = WalkDir::new(&root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&root).ok()?;
                let key = normalize_path(&relative.to_string_lossy());

                Some((key, entry.into_path()))
            })
            .collect();

        debug!("indexed {} files under `{}`", index.len(), root.display());

        Ok(Self { root, index })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `path` lives on disk, if it exists.
    pub fn resolve(&self, path: &str) -> Option<&Path> {
        self.index.get(&normalize_path(path)).map(PathBuf::as_path)
    }
}

impl BlobProvider for LooseFolder {
    fn get_blob(&self, path: &str) -> Option<Vec<u8>> {
        let file = self.resolve(path)?;

        match std::fs::read(file) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warn!("cannot read `{}`: {}", file.display(), err);
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;
    use crate::utils::misc::scratch_folder;

    #[test]
    fn lookup_ignores_case_and_slashes() {
        let root = scratch_folder("ztdump_loose_folder_lookup");
        let walk = root.join("Animals").join("Elephant").join("Walk");
        fs::create_dir_all(&walk).unwrap();
        fs::write(walk.join("NE"), [1, 2, 3]).unwrap();

        let folder = LooseFolder::new(root.as_path()).unwrap();

        assert_eq!(
            folder.get_blob("animals/elephant/walk/ne"),
            Some(vec![1, 2, 3])
        );
        assert_eq!(
            folder.get_blob("\\ANIMALS\\Elephant\\walk\\Ne"),
            Some(vec![1, 2, 3])
        );
        assert_eq!(folder.get_blob("animals/elephant/walk/n"), None);
        assert!(folder.resolve("animals/elephant/walk/NE").is_some());
    }

    #[test]
    fn root_must_be_a_folder() {
        let file = scratch_folder("ztdump_loose_folder_not_a_folder").join("file");
        fs::write(&file, [0]).unwrap();

        assert!(LooseFolder::new(file.as_path()).is_err());
    }
}
