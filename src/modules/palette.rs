use std::path::Path;

use ani::{BlobProvider, Palette, Recovery};
use log::debug;

/// Picks the palette for one blob.
///
/// In order: `explicit`, the blob's own `palette_ref` looked up through `provider`,
/// `default_palette`, and finally [`Palette::fallback`]. Only an unreadable `explicit` palette
/// is an error since the caller asked for that file by name.
pub fn resolve_palette(
    explicit: Option<&Path>,
    palette_ref: &str,
    provider: Option<&dyn BlobProvider>,
    default_palette: Option<&Path>,
) -> eyre::Result<(Palette, Option<Recovery>)> {
    if let Some(path) = explicit {
        let bytes = std::fs::read(path)
            .map_err(|err| eyre::eyre!("cannot read palette `{}`: {}", path.display(), err))?;

        return Ok(Palette::load_or_fallback::<_, String>(Ok(bytes)));
    }

    if let Some(bytes) = provider.and_then(|provider| provider.get_blob(palette_ref)) {
        debug!("palette `{palette_ref}` found next to the blob");

        return Ok(Palette::load_or_fallback::<_, String>(Ok(bytes)));
    }

    let source = match default_palette {
        Some(path) => std::fs::read(path).map_err(|err| format!("{}: {}", path.display(), err)),
        None => Err(format!("`{palette_ref}` not found")),
    };

    Ok(Palette::load_or_fallback(source))
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use ani::RGB_PALETTE_LEN;

    use super::*;
    use crate::utils::misc::scratch_folder;

    struct Memory(HashMap<String, Vec<u8>>);

    impl BlobProvider for Memory {
        fn get_blob(&self, path: &str) -> Option<Vec<u8>> {
            self.0.get(&ani::normalize_path(path)).cloned()
        }
    }

    fn red_palette() -> Vec<u8> {
        let mut bytes = vec![0u8; RGB_PALETTE_LEN];
        bytes[3] = 255;

        bytes
    }

    #[test]
    fn palette_ref_through_provider() {
        let provider = Memory(HashMap::from([("pal/zoo.pal".to_string(), red_palette())]));

        let (palette, recovery) =
            resolve_palette(None, "PAL\\zoo.pal", Some(&provider), None).unwrap();

        assert!(recovery.is_none());
        assert_eq!(palette.get(1), [255, 0, 0]);
    }

    #[test]
    fn explicit_wins() {
        let path = scratch_folder("ztdump_explicit_palette").join("red.pal");
        std::fs::write(&path, red_palette()).unwrap();

        let provider = Memory(HashMap::new());
        let (palette, _) =
            resolve_palette(Some(path.as_path()), "missing", Some(&provider), None).unwrap();

        assert_eq!(palette.get(1), [255, 0, 0]);
    }

    #[test]
    fn missing_explicit_is_an_error() {
        let path = scratch_folder("ztdump_missing_palette").join("none.pal");

        assert!(resolve_palette(Some(path.as_path()), "pal", None, None).is_err());
    }

    #[test]
    fn nothing_found_falls_back() {
        let (palette, recovery) = resolve_palette(None, "pal", None, None).unwrap();

        assert_eq!(palette, Palette::fallback());
        assert!(matches!(recovery, Some(Recovery::PaletteUnavailable { .. })));
    }
}
