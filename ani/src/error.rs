#[derive(Debug, thiserror::Error)]
pub enum AniError {
    #[error("Malformed sprite header: {reason}")]
    MalformedHeader { reason: String },
    #[error("Malformed animation manifest: {reason}")]
    MalformedManifest { reason: String },
    #[error("Zoom {zoom} is too large for a {width}x{height} image")]
    ZoomTooLarge { zoom: u32, width: u32, height: u32 },
    #[error("Error opening file: {source}")]
    IOError {
        #[from]
        source: std::io::Error,
    },
    #[error("Error encoding image: {source}")]
    ImageError {
        #[from]
        source: image::ImageError,
    },
}

impl AniError {
    pub(crate) fn header(reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            reason: reason.into(),
        }
    }

    pub(crate) fn manifest(reason: impl Into<String>) -> Self {
        Self::MalformedManifest {
            reason: reason.into(),
        }
    }
}
