use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::types::MASK_SUFFIX;

/// Helper function to infer image format from image bytes
pub fn infer_image_format(image_bytes: &[u8]) -> Option<&'static str> {
    if image_bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpeg")
    } else if image_bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("png")
    } else if image_bytes.starts_with(b"BM") {
        Some("bmp")
    } else if image_bytes.starts_with(&[0x47, 0x49, 0x46]) {
        Some("gif")
    } else {
        None
    }
}

/// Read `(width, height)` from an encoded image header without decoding pixels.
///
/// `path` is only used for error reporting.
pub fn read_image_dimensions(image_bytes: &[u8], path: &Path) -> Result<(u32, u32)> {
    let dimension_error = |source| ConvertError::ImageDimensions {
        path: path.to_path_buf(),
        source,
    };

    let size = imagesize::blob_size(image_bytes).map_err(dimension_error)?;
    let width = u32::try_from(size.width)
        .map_err(|_| dimension_error(imagesize::ImageError::CorruptedImage))?;
    let height = u32::try_from(size.height)
        .map_err(|_| dimension_error(imagesize::ImageError::CorruptedImage))?;

    Ok((width, height))
}

/// Read a whole file, attaching the path to any I/O error.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| ConvertError::io(path, e))
}

/// Expected mask filename for a split identifier: `12.jpg` -> `00012_hair.png`.
///
/// Returns `None` when the identifier stem is not an integer. Negative numbers
/// keep their sign inside the padding: `-3.jpg` -> `-0003_hair.png`.
pub fn mask_filename(identifier: &str) -> Option<String> {
    let stem = Path::new(identifier).file_stem()?.to_str()?;
    let number: i64 = stem.parse().ok()?;
    Some(format!("{:05}{}", number, MASK_SUFFIX))
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
            label
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Create an output directory if needed and return its path.
///
/// Existing contents are kept; records inside are overwritten file by file.
pub fn create_output_directory(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        log::debug!("Directory {:?} already exists, reusing it.", path);
    }
    fs::create_dir_all(path).map_err(|e| ConvertError::io(path, e))?;
    Ok(path.to_path_buf())
}
