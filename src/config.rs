use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for converting the hair segmentation dataset to TFRecord.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Folder containing images
    #[arg(long = "image_folder", default_value = "/content/CelebAMask-HQ/CelebA-HQ-img")]
    pub image_folder: PathBuf,

    /// Folder containing annotations for images
    #[arg(
        long = "label_folder",
        default_value = "/content/CelebAMask-HQ/CelebAMask-HQ-mask-anno"
    )]
    pub label_folder: PathBuf,

    /// Path to folder containing data split files (train.txt, val.txt, test.txt)
    #[arg(long = "data_split_folder", default_value = "/content/splits")]
    pub data_split_folder: PathBuf,

    /// Path to no hair image file
    #[arg(long = "no_hair_file", default_value = "/content/no_hair.png")]
    pub no_hair_file: PathBuf,

    /// Path to save converted tfrecord of Tensorflow example
    #[arg(long = "output_dir", default_value = "/content/dataset")]
    pub output_dir: PathBuf,
}

/// Resolved converter settings, passed explicitly to the conversion pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    pub image_folder: PathBuf,
    pub label_folder: PathBuf,
    pub data_split_folder: PathBuf,
    pub no_hair_file: PathBuf,
    pub output_dir: PathBuf,
}

impl From<Args> for ConverterConfig {
    fn from(args: Args) -> Self {
        Self {
            image_folder: args.image_folder,
            label_folder: args.label_folder,
            data_split_folder: args.data_split_folder,
            no_hair_file: args.no_hair_file,
            output_dir: args.output_dir,
        }
    }
}
