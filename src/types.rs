use std::path::PathBuf;

// File extension of the written record files
pub const RECORD_EXTENSION: &str = "tfrecord";

// Suffix shared by every hair mask in the annotation tree
pub const MASK_SUFFIX: &str = "_hair.png";

// Number of colour channels recorded for every source image
pub const IMAGE_CHANNELS: i64 = 3;

// An image matched with the mask it will be stored alongside
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    /// Identifier as it appears in the split list, e.g. `12.jpg`
    pub identifier: String,
    pub image_path: PathBuf,
    pub mask_path: PathBuf,
    /// True when `mask_path` is the no-hair placeholder
    pub uses_placeholder: bool,
}

impl ImagePair {
    /// File stem of the identifier, used to name the output record.
    pub fn record_stem(&self) -> String {
        std::path::Path::new(&self.identifier)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.identifier.clone())
    }
}

// Ordered pairing for one split list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPairs {
    pub name: String,
    pub pairs: Vec<ImagePair>,
}

impl SplitPairs {
    pub fn missing_masks(&self) -> usize {
        self.pairs.iter().filter(|pair| pair.uses_placeholder).count()
    }

    /// The `<split>: <missing>/<total>` line reported before conversion starts.
    pub fn summary_line(&self) -> String {
        format!("{}: {}/{}", self.name, self.missing_masks(), self.pairs.len())
    }
}

// Everything that goes into one serialized example
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub image_data: Vec<u8>,
    pub filename: String,
    pub image_format: String,
    pub width: u32,
    pub height: u32,
    pub mask_data: Vec<u8>,
    pub mask_format: String,
}

// Per-split counters returned by the converter
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionStats {
    pub split: String,
    pub total_images: usize,
    pub missing_masks: usize,
    pub records_written: usize,
}

impl ConversionStats {
    pub fn new(split: &str, total_images: usize, missing_masks: usize) -> Self {
        Self {
            split: split.to_string(),
            total_images,
            missing_masks,
            records_written: 0,
        }
    }

    pub fn increment_written(&mut self) {
        self.records_written += 1;
    }

    pub fn print_summary(&self) {
        log::info!("=== Split '{}' ===", self.split);
        log::info!("Images listed: {}", self.total_images);
        log::info!("Records written: {}", self.records_written);
        if self.missing_masks > 0 {
            log::warn!(
                "Images without a hair mask (placeholder used): {}",
                self.missing_masks
            );
        }
    }
}
