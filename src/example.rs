//! `tf.train.Example` protobuf messages
//!
//! Only the subset of `tensorflow/core/example/{example,feature}.proto` needed to
//! store an image together with its segmentation mask. Field numbers follow the
//! upstream definitions so the records load with `tf.data.TFRecordDataset`.

use prost::Message;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::types::{ImageRecord, IMAGE_CHANNELS};

pub const KEY_IMAGE_ENCODED: &str = "image/encoded";
pub const KEY_IMAGE_FILENAME: &str = "image/filename";
pub const KEY_IMAGE_FORMAT: &str = "image/format";
pub const KEY_IMAGE_HEIGHT: &str = "image/height";
pub const KEY_IMAGE_WIDTH: &str = "image/width";
pub const KEY_IMAGE_CHANNELS: &str = "image/channels";
pub const KEY_MASK_ENCODED: &str = "image/segmentation/class/encoded";
pub const KEY_MASK_FORMAT: &str = "image/segmentation/class/format";

#[derive(Clone, PartialEq, Message)]
pub struct BytesList {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub value: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Int64List {
    #[prost(int64, repeated, tag = "1")]
    pub value: Vec<i64>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Feature {
    #[prost(oneof = "feature::Kind", tags = "1, 3")]
    pub kind: Option<feature::Kind>,
}

pub mod feature {
    use super::{BytesList, Int64List};

    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        BytesList(BytesList),
        #[prost(message, tag = "3")]
        Int64List(Int64List),
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct Features {
    // BTreeMap keeps the encoded entry order stable between runs
    #[prost(btree_map = "string, message", tag = "1")]
    pub feature: BTreeMap<String, Feature>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Example {
    #[prost(message, optional, tag = "1")]
    pub features: Option<Features>,
}

impl Feature {
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: Some(feature::Kind::BytesList(BytesList {
                value: vec![value.into()],
            })),
        }
    }

    pub fn int64(value: i64) -> Self {
        Self {
            kind: Some(feature::Kind::Int64List(Int64List { value: vec![value] })),
        }
    }

    /// First bytes value, if this is a non-empty bytes feature.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            Some(feature::Kind::BytesList(list)) => list.value.first().map(Vec::as_slice),
            _ => None,
        }
    }

    /// First int64 value, if this is a non-empty int64 feature.
    pub fn as_int64(&self) -> Option<i64> {
        match &self.kind {
            Some(feature::Kind::Int64List(list)) => list.value.first().copied(),
            _ => None,
        }
    }
}

impl Example {
    pub fn feature(&self, key: &str) -> Option<&Feature> {
        self.features.as_ref()?.feature.get(key)
    }
}

impl From<&ImageRecord> for Example {
    fn from(record: &ImageRecord) -> Self {
        let mut feature = BTreeMap::new();
        feature.insert(
            KEY_IMAGE_ENCODED.to_string(),
            Feature::bytes(record.image_data.clone()),
        );
        feature.insert(
            KEY_IMAGE_FILENAME.to_string(),
            Feature::bytes(record.filename.as_bytes()),
        );
        feature.insert(
            KEY_IMAGE_FORMAT.to_string(),
            Feature::bytes(record.image_format.as_bytes()),
        );
        feature.insert(
            KEY_IMAGE_HEIGHT.to_string(),
            Feature::int64(i64::from(record.height)),
        );
        feature.insert(
            KEY_IMAGE_WIDTH.to_string(),
            Feature::int64(i64::from(record.width)),
        );
        feature.insert(KEY_IMAGE_CHANNELS.to_string(), Feature::int64(IMAGE_CHANNELS));
        feature.insert(
            KEY_MASK_ENCODED.to_string(),
            Feature::bytes(record.mask_data.clone()),
        );
        feature.insert(
            KEY_MASK_FORMAT.to_string(),
            Feature::bytes(record.mask_format.as_bytes()),
        );

        Example {
            features: Some(Features { feature }),
        }
    }
}

/// Serialize an image/mask record into `tf.train.Example` wire bytes.
pub fn encode_record(record: &ImageRecord) -> Result<Vec<u8>> {
    let example = Example::from(record);
    let mut buf = Vec::with_capacity(example.encoded_len());
    example.encode(&mut buf)?;
    Ok(buf)
}

/// Parse `tf.train.Example` wire bytes.
pub fn decode_example(data: &[u8]) -> std::result::Result<Example, prost::DecodeError> {
    Example::decode(data)
}
