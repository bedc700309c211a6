use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};
use crate::example::encode_record;
use crate::io::{discover_mask_files, discover_split_files, read_split_identifiers, split_name};
use crate::tfrecord::write_single_record;
use crate::types::{ConversionStats, ImagePair, ImageRecord, SplitPairs, RECORD_EXTENSION};
use crate::utils::{
    create_output_directory, create_progress_bar, infer_image_format, mask_filename, read_file,
    read_image_dimensions,
};

/// Pair every identifier of a split with its image and mask paths.
///
/// Identifiers without a mask in `masks` fall back to `no_hair_file`.
pub fn pair_split(
    name: &str,
    identifiers: &[String],
    image_folder: &Path,
    masks: &HashMap<String, PathBuf>,
    no_hair_file: &Path,
) -> Result<SplitPairs> {
    let mut pairs = Vec::with_capacity(identifiers.len());

    for identifier in identifiers {
        let expected_mask =
            mask_filename(identifier).ok_or_else(|| ConvertError::InvalidIdentifier {
                split: name.to_string(),
                identifier: identifier.clone(),
            })?;

        let (mask_path, uses_placeholder) = match masks.get(&expected_mask) {
            Some(path) => (path.clone(), false),
            None => {
                warn!("{}: no hair label found, using placeholder", identifier);
                (no_hair_file.to_path_buf(), true)
            }
        };

        pairs.push(ImagePair {
            identifier: identifier.clone(),
            image_path: image_folder.join(identifier),
            mask_path,
            uses_placeholder,
        });
    }

    Ok(SplitPairs {
        name: name.to_string(),
        pairs,
    })
}

/// Read an image and its mask and check that their dimensions agree.
pub fn load_record(pair: &ImagePair) -> Result<ImageRecord> {
    let image_data = read_file(&pair.image_path)?;
    let (width, height) = read_image_dimensions(&image_data, &pair.image_path)?;

    let mask_data = read_file(&pair.mask_path)?;
    let (mask_width, mask_height) = read_image_dimensions(&mask_data, &pair.mask_path)?;

    if (width, height) != (mask_width, mask_height) {
        return Err(ConvertError::ShapeMismatch {
            image: pair.image_path.clone(),
            mask: pair.mask_path.clone(),
            image_size: (width, height),
            mask_size: (mask_width, mask_height),
        });
    }

    let image_format = infer_image_format(&image_data).unwrap_or("jpeg").to_string();
    let mask_format = infer_image_format(&mask_data).unwrap_or("png").to_string();

    Ok(ImageRecord {
        filename: pair.image_path.to_string_lossy().into_owned(),
        image_data,
        image_format,
        width,
        height,
        mask_data,
        mask_format,
    })
}

/// Path of the record written for `pair` inside a split directory.
pub fn record_path(split_dir: &Path, pair: &ImagePair) -> PathBuf {
    let stem = sanitize_filename::sanitize(pair.record_stem());
    split_dir.join(format!("{}.{}", stem, RECORD_EXTENSION))
}

fn convert_pair(pair: &ImagePair, split_dir: &Path) -> Result<PathBuf> {
    let record = load_record(pair)?;
    let output_path = record_path(split_dir, pair);
    write_single_record(&output_path, &encode_record(&record)?)?;
    Ok(output_path)
}

/// Write one TFRecord file per pair under `<output_dir>/<split>/`.
///
/// Stops at the first error; records already written stay on disk.
pub fn convert_split(split: &SplitPairs, output_dir: &Path) -> Result<ConversionStats> {
    let split_dir = create_output_directory(&output_dir.join(&split.name))?;
    let mut stats = ConversionStats::new(&split.name, split.pairs.len(), split.missing_masks());

    let pb = create_progress_bar(split.pairs.len() as u64, &split.name);
    for pair in &split.pairs {
        let output_path = match convert_pair(pair, &split_dir) {
            Ok(path) => path,
            Err(e) => {
                pb.abandon();
                return Err(e);
            }
        };
        debug!("Wrote {}", output_path.display());
        stats.increment_written();
        pb.inc(1);
    }
    pb.finish_with_message(format!("{} processing complete", split.name));

    Ok(stats)
}

/// Main dataset processing pipeline: every split list in the split folder, in order.
pub fn convert_dataset(config: &ConverterConfig) -> Result<Vec<ConversionStats>> {
    create_output_directory(&config.output_dir)?;

    let split_files = discover_split_files(&config.data_split_folder)?;
    let masks = discover_mask_files(&config.label_folder)?;

    let mut all_stats = Vec::with_capacity(split_files.len());
    for split_file in &split_files {
        let name = split_name(split_file);
        let identifiers = read_split_identifiers(split_file)?;
        let split = pair_split(
            &name,
            &identifiers,
            &config.image_folder,
            &masks,
            &config.no_hair_file,
        )?;

        println!("{}", split.summary_line());

        info!("Converting split '{}'...", name);
        let stats = convert_split(&split, &config.output_dir)?;
        stats.print_summary();
        all_stats.push(stats);
    }

    info!("Conversion process completed successfully.");
    Ok(all_stats)
}
