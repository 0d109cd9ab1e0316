use std::path::Path;
#[cfg(test)]
use std::path::PathBuf;

/// Files that sit next to sprite blobs but are not blobs themselves.
pub static SIDECAR_EXTENSIONS: &[&str] = &["pal", "ani", "txt", "cfg"];

pub fn maybe_add_extension_to_string(s: &str, ext: &str) -> String {
    let ext_with_dot = format!(".{}", ext);

    if s.ends_with(&ext_with_dot) {
        s.to_string()
    } else {
        format!("{}.{}", s, ext)
    }
}

pub fn is_sidecar_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SIDECAR_EXTENSIONS
                .iter()
                .any(|sidecar| ext.eq_ignore_ascii_case(sidecar))
        })
}

/// `animals/elephant/walk/N` under `root` becomes `animals_elephant_walk_N`.
///
/// Blobs have no extension and the same direction names repeat in every folder, so the
/// whole relative path goes into the output name.
pub fn flatten_relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);

    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("_")
}

/// Empty folder under the temp dir, private to this test process.
#[cfg(test)]
pub fn scratch_folder(name: &str) -> PathBuf {
    let folder = std::env::temp_dir().join(format!("{name}_{}", std::process::id()));

    let _ = std::fs::remove_dir_all(&folder);
    std::fs::create_dir_all(&folder).unwrap();

    folder
}

#[macro_export]
macro_rules! err {
    ($e: ident) => {{
        use eyre::eyre;

        Err(eyre!($e))
    }};

    ($format_string: literal) => {{
        use eyre::eyre;

        Err(eyre!($format_string))
    }};

    ($($arg:tt)*) => {{
        use eyre::eyre;

        Err(eyre!($($arg)*))
    }};
}
