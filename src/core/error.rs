//! Error types for voxgen

use thiserror::Error;

/// Main error type for generation.
///
/// Only authoring/configuration mistakes and I/O surface here. Degenerate
/// generation inputs (no matching biome, unknown road pattern) are resolved
/// in place with a logged fallback and never become an `Error`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no placeable piece for required role `{role}`")]
    MissingPiece { role: String },

    #[error("no palette interval contains {0}")]
    NoPaletteMatch(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Shorthand for [`Error::Configuration`].
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::config("town hall `hall` missing");
        assert_eq!(err.to_string(), "configuration error: town hall `hall` missing");

        let err = Error::MissingPiece { role: "road".into() };
        assert!(err.to_string().contains("`road`"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
