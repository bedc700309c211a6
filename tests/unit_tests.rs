use clap::Parser;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use hair2tfrecord::example::{
    decode_example, Example, KEY_IMAGE_CHANNELS, KEY_IMAGE_ENCODED, KEY_IMAGE_FILENAME,
    KEY_IMAGE_FORMAT, KEY_IMAGE_HEIGHT, KEY_IMAGE_WIDTH, KEY_MASK_ENCODED, KEY_MASK_FORMAT,
};
use hair2tfrecord::{
    convert_dataset, discover_mask_files, pair_split, read_records, Args, ConversionStats,
    ConvertError, ConverterConfig,
};

struct Fixture {
    _temp_dir: tempfile::TempDir,
    config: ConverterConfig,
}

impl Fixture {
    fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let config = ConverterConfig {
            image_folder: root.join("images"),
            label_folder: root.join("masks"),
            data_split_folder: root.join("splits"),
            no_hair_file: root.join("no_hair.png"),
            output_dir: root.join("dataset"),
        };
        fs::create_dir_all(&config.image_folder).unwrap();
        fs::create_dir_all(&config.label_folder).unwrap();
        fs::create_dir_all(&config.data_split_folder).unwrap();
        Fixture {
            _temp_dir: temp_dir,
            config,
        }
    }

    fn add_image(&self, name: &str, width: u32, height: u32) {
        image::RgbImage::new(width, height)
            .save(self.config.image_folder.join(name))
            .unwrap();
    }

    /// Write a mask under `<label_folder>/<subdir>/` with a distinct pixel value.
    fn add_mask(&self, subdir: &str, name: &str, width: u32, height: u32, value: u8) -> PathBuf {
        let dir = self.config.label_folder.join(subdir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        image::GrayImage::from_pixel(width, height, image::Luma([value]))
            .save(&path)
            .unwrap();
        path
    }

    fn add_placeholder(&self, width: u32, height: u32) {
        image::GrayImage::new(width, height)
            .save(&self.config.no_hair_file)
            .unwrap();
    }

    fn add_split(&self, name: &str, identifiers: &[&str]) {
        let mut content = identifiers.join("\n");
        content.push('\n');
        fs::write(
            self.config.data_split_folder.join(format!("{}.txt", name)),
            content,
        )
        .unwrap();
    }

    fn record(&self, split: &str, stem: &str) -> Example {
        let path = self
            .config
            .output_dir
            .join(split)
            .join(format!("{}.tfrecord", stem));
        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 1, "one example per record file");
        decode_example(&records[0]).unwrap()
    }
}

fn record_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn bytes_feature<'a>(example: &'a Example, key: &str) -> &'a [u8] {
    example.feature(key).and_then(|f| f.as_bytes()).unwrap()
}

fn int_feature(example: &Example, key: &str) -> i64 {
    example.feature(key).and_then(|f| f.as_int64()).unwrap()
}

#[test]
fn test_convert_dataset_writes_one_record_per_identifier() {
    let fixture = Fixture::new();
    fixture.add_placeholder(8, 6);
    for id in ["1.jpg", "2.jpg", "3.jpg"] {
        fixture.add_image(id, 8, 6);
    }
    let mask_1 = fixture.add_mask("0", "00001_hair.png", 8, 6, 255);
    let mask_3 = fixture.add_mask("1", "00003_hair.png", 8, 6, 128);
    fixture.add_split("train", &["3.jpg", "1.jpg", "2.jpg"]);

    let stats = convert_dataset(&fixture.config).unwrap();

    assert_eq!(
        stats,
        vec![ConversionStats {
            split: "train".to_string(),
            total_images: 3,
            missing_masks: 1,
            records_written: 3,
        }]
    );
    assert_eq!(
        record_files(&fixture.config.output_dir.join("train")),
        vec!["1.tfrecord", "2.tfrecord", "3.tfrecord"]
    );

    let placeholder = fs::read(&fixture.config.no_hair_file).unwrap();
    let example = fixture.record("train", "1");
    assert_eq!(bytes_feature(&example, KEY_MASK_ENCODED), fs::read(&mask_1).unwrap());
    let example = fixture.record("train", "3");
    assert_eq!(bytes_feature(&example, KEY_MASK_ENCODED), fs::read(&mask_3).unwrap());
    let example = fixture.record("train", "2");
    assert_eq!(bytes_feature(&example, KEY_MASK_ENCODED), placeholder.as_slice());
}

#[test]
fn test_record_carries_image_and_metadata() {
    let fixture = Fixture::new();
    fixture.add_placeholder(12, 7);
    fixture.add_image("42.jpg", 12, 7);
    fixture.add_mask("", "00042_hair.png", 12, 7, 255);
    fixture.add_split("val", &["42.jpg"]);

    convert_dataset(&fixture.config).unwrap();

    let example = fixture.record("val", "42");
    let image_path = fixture.config.image_folder.join("42.jpg");
    assert_eq!(
        bytes_feature(&example, KEY_IMAGE_ENCODED),
        fs::read(&image_path).unwrap()
    );
    assert_eq!(
        bytes_feature(&example, KEY_IMAGE_FILENAME),
        image_path.to_string_lossy().as_bytes()
    );
    assert_eq!(bytes_feature(&example, KEY_IMAGE_FORMAT), b"jpeg");
    assert_eq!(bytes_feature(&example, KEY_MASK_FORMAT), b"png");
    assert_eq!(int_feature(&example, KEY_IMAGE_WIDTH), 12);
    assert_eq!(int_feature(&example, KEY_IMAGE_HEIGHT), 7);
    assert_eq!(int_feature(&example, KEY_IMAGE_CHANNELS), 3);
}

#[test]
fn test_shape_mismatch_halts_conversion() {
    let fixture = Fixture::new();
    fixture.add_placeholder(8, 8);
    fixture.add_image("1.jpg", 8, 8);
    fixture.add_image("2.jpg", 8, 8);
    fixture.add_image("3.jpg", 8, 8);
    fixture.add_mask("", "00002_hair.png", 16, 8, 255);
    fixture.add_split("test", &["1.jpg", "2.jpg", "3.jpg"]);

    let err = convert_dataset(&fixture.config).unwrap_err();

    match err {
        ConvertError::ShapeMismatch {
            image_size,
            mask_size,
            ..
        } => {
            assert_eq!(image_size, (8, 8));
            assert_eq!(mask_size, (16, 8));
        }
        other => panic!("expected ShapeMismatch, got {:?}", other),
    }
    // The record written before the mismatch is left in place.
    assert_eq!(
        record_files(&fixture.config.output_dir.join("test")),
        vec!["1.tfrecord"]
    );
}

#[test]
fn test_rerun_produces_identical_output() {
    let fixture = Fixture::new();
    fixture.add_placeholder(5, 5);
    fixture.add_image("7.jpg", 5, 5);
    fixture.add_image("8.jpg", 5, 5);
    fixture.add_mask("a", "00007_hair.png", 5, 5, 200);
    fixture.add_split("train", &["7.jpg", "8.jpg"]);

    convert_dataset(&fixture.config).unwrap();
    let split_dir = fixture.config.output_dir.join("train");
    let first: HashMap<String, Vec<u8>> = record_files(&split_dir)
        .into_iter()
        .map(|name| {
            let bytes = fs::read(split_dir.join(&name)).unwrap();
            (name, bytes)
        })
        .collect();

    convert_dataset(&fixture.config).unwrap();
    for (name, bytes) in &first {
        assert_eq!(&fs::read(split_dir.join(name)).unwrap(), bytes, "{}", name);
    }
    assert_eq!(record_files(&split_dir).len(), first.len());
}

#[test]
fn test_each_split_gets_its_own_directory() {
    let fixture = Fixture::new();
    fixture.add_placeholder(4, 4);
    for id in ["1.jpg", "2.jpg", "3.jpg"] {
        fixture.add_image(id, 4, 4);
    }
    fixture.add_split("val", &["3.jpg"]);
    fixture.add_split("train", &["1.jpg", "2.jpg"]);

    let stats = convert_dataset(&fixture.config).unwrap();

    let names: Vec<&str> = stats.iter().map(|s| s.split.as_str()).collect();
    assert_eq!(names, vec!["train", "val"]);
    assert_eq!(stats[0].missing_masks, 2);
    assert_eq!(stats[1].missing_masks, 1);
    assert_eq!(
        record_files(&fixture.config.output_dir.join("train")),
        vec!["1.tfrecord", "2.tfrecord"]
    );
    assert_eq!(
        record_files(&fixture.config.output_dir.join("val")),
        vec!["3.tfrecord"]
    );
}

#[test]
fn test_pair_split_counts_missing_masks() {
    let mut masks = HashMap::new();
    masks.insert(
        "00010_hair.png".to_string(),
        PathBuf::from("/masks/0/00010_hair.png"),
    );
    let identifiers = vec!["10.jpg".to_string(), "11.jpg".to_string()];

    let split = pair_split(
        "train",
        &identifiers,
        Path::new("/images"),
        &masks,
        Path::new("/no_hair.png"),
    )
    .unwrap();

    assert_eq!(split.pairs[0].image_path, PathBuf::from("/images/10.jpg"));
    assert_eq!(split.pairs[0].mask_path, PathBuf::from("/masks/0/00010_hair.png"));
    assert!(!split.pairs[0].uses_placeholder);
    assert_eq!(split.pairs[1].mask_path, PathBuf::from("/no_hair.png"));
    assert!(split.pairs[1].uses_placeholder);
    assert_eq!(split.missing_masks(), 1);
    assert_eq!(split.summary_line(), "train: 1/2");
}

#[test]
fn test_non_numeric_identifier_is_rejected() {
    let err = pair_split(
        "train",
        &["portrait.jpg".to_string()],
        Path::new("/images"),
        &HashMap::new(),
        Path::new("/no_hair.png"),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ConvertError::InvalidIdentifier { ref identifier, .. } if identifier == "portrait.jpg"
    ));
}

#[test]
fn test_missing_split_folder_is_an_io_error() {
    let fixture = Fixture::new();
    let mut config = fixture.config.clone();
    config.data_split_folder = config.data_split_folder.join("does-not-exist");

    let err = convert_dataset(&config).unwrap_err();

    assert!(matches!(err, ConvertError::Io { .. }));
}

#[test]
fn test_corrupted_record_file_is_detected() {
    let fixture = Fixture::new();
    fixture.add_placeholder(3, 3);
    fixture.add_image("5.jpg", 3, 3);
    fixture.add_split("train", &["5.jpg"]);
    convert_dataset(&fixture.config).unwrap();

    let path = fixture.config.output_dir.join("train").join("5.tfrecord");
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 5;
    bytes[last] ^= 0xFF;
    fs::write(&path, bytes).unwrap();

    assert!(matches!(
        read_records(&path),
        Err(ConvertError::CorruptRecord { .. })
    ));
}

#[test]
fn test_duplicate_mask_names_use_first_in_path_order() {
    let fixture = Fixture::new();
    fixture.add_placeholder(6, 6);
    fixture.add_image("1.jpg", 6, 6);
    let first = fixture.add_mask("a", "00001_hair.png", 6, 6, 10);
    let second = fixture.add_mask("b", "00001_hair.png", 6, 6, 250);
    fixture.add_split("train", &["1.jpg"]);

    let masks = discover_mask_files(&fixture.config.label_folder).unwrap();
    assert_eq!(masks.len(), 1);
    assert_eq!(masks["00001_hair.png"], first);

    convert_dataset(&fixture.config).unwrap();

    let example = fixture.record("train", "1");
    let mask_bytes = bytes_feature(&example, KEY_MASK_ENCODED);
    assert_eq!(mask_bytes, fs::read(&first).unwrap());
    assert_ne!(mask_bytes, fs::read(&second).unwrap());
}

#[test]
fn test_cli_option_names_and_defaults() {
    let args = Args::try_parse_from(["hair2tfrecord", "--image_folder", "x"]).unwrap();
    let config = ConverterConfig::from(args);

    assert_eq!(config.image_folder, PathBuf::from("x"));
    assert_eq!(
        config.label_folder,
        PathBuf::from("/content/CelebAMask-HQ/CelebAMask-HQ-mask-anno")
    );
    assert_eq!(config.data_split_folder, PathBuf::from("/content/splits"));
    assert_eq!(config.no_hair_file, PathBuf::from("/content/no_hair.png"));
    assert_eq!(config.output_dir, PathBuf::from("/content/dataset"));
}

#[test]
fn test_cli_accepts_every_path_option() {
    let args = Args::try_parse_from([
        "hair2tfrecord",
        "--image_folder",
        "img",
        "--label_folder",
        "anno",
        "--data_split_folder",
        "splits",
        "--no_hair_file",
        "blank.png",
        "--output_dir",
        "out",
    ])
    .unwrap();

    assert_eq!(
        ConverterConfig::from(args),
        ConverterConfig {
            image_folder: PathBuf::from("img"),
            label_folder: PathBuf::from("anno"),
            data_split_folder: PathBuf::from("splits"),
            no_hair_file: PathBuf::from("blank.png"),
            output_dir: PathBuf::from("out"),
        }
    );
    assert!(Args::try_parse_from(["hair2tfrecord", "--image-folder", "x"]).is_err());
}
