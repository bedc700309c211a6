//! Hair segmentation dataset to TFRecord converter
//!
//! This library pairs CelebAMask-HQ style face images with their `NNNNN_hair.png`
//! masks according to train/val/test split lists and writes one TFRecord file of
//! `tf.train.Example` per image for segmentation training.

pub mod config;
pub mod dataset;
pub mod error;
pub mod example;
pub mod io;
pub mod tfrecord;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use config::{Args, ConverterConfig};
pub use dataset::{convert_dataset, convert_split, load_record, pair_split};
pub use error::ConvertError;
pub use io::{discover_mask_files, discover_split_files, read_split_identifiers};
pub use tfrecord::{read_records, RecordReader, RecordWriter};
pub use types::{ConversionStats, ImagePair, ImageRecord, SplitPairs};
