use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("failed to read image dimensions of {}: {source}", path.display())]
    ImageDimensions {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error(
        "Shape mismatched between image and label: {} is {}x{}, {} is {}x{}",
        image.display(), image_size.0, image_size.1,
        mask.display(), mask_size.0, mask_size.1
    )]
    ShapeMismatch {
        image: PathBuf,
        mask: PathBuf,
        /// (width, height)
        image_size: (u32, u32),
        /// (width, height)
        mask_size: (u32, u32),
    },

    #[error("split '{split}' contains non-numeric identifier '{identifier}'")]
    InvalidIdentifier { split: String, identifier: String },

    #[error("failed to encode example: {0}")]
    Encode(#[from] prost::EncodeError),

    #[error("corrupt record in {}: {message}", path.display())]
    CorruptRecord { path: PathBuf, message: String },
}

impl ConvertError {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
