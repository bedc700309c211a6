use glob::{glob, Pattern};
use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::types::MASK_SUFFIX;

/// Fail early with the offending path when an input directory is missing.
fn ensure_dir(dir: &Path) -> Result<()> {
    fs::read_dir(dir)
        .map(|_| ())
        .map_err(|e| ConvertError::io(dir, e))
}

/// Expand `<dir>/<suffix>`, treating `dir` literally, into sorted paths.
fn glob_in(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/{}", Pattern::escape(&dir.to_string_lossy()), suffix);
    let mut paths = Vec::new();
    for entry in glob(&pattern)? {
        let path = entry.map_err(|e| ConvertError::io(e.path().to_path_buf(), e.into_error()))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// All `*.txt` split lists directly inside `split_dir`, in path order.
pub fn discover_split_files(split_dir: &Path) -> Result<Vec<PathBuf>> {
    ensure_dir(split_dir)?;
    let split_files = glob_in(split_dir, "*.txt")?;
    info!(
        "Found {} split file(s) in {}",
        split_files.len(),
        split_dir.display()
    );
    Ok(split_files)
}

/// Index every `*_hair.png` under `label_dir` by file name.
///
/// When the same file name occurs in several sub-directories the first one in
/// path order is kept.
pub fn discover_mask_files(label_dir: &Path) -> Result<HashMap<String, PathBuf>> {
    ensure_dir(label_dir)?;
    let mut masks: HashMap<String, PathBuf> = HashMap::new();
    for path in glob_in(label_dir, &format!("**/*{}", MASK_SUFFIX))? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(existing) = masks.get(name) {
            debug!(
                "Duplicate mask {} ignored, keeping {}",
                path.display(),
                existing.display()
            );
            continue;
        }
        masks.insert(name.to_string(), path.clone());
    }
    info!(
        "Found {} mask file(s) under {}",
        masks.len(),
        label_dir.display()
    );
    Ok(masks)
}

/// Split name derived from the list file, e.g. `splits/train.txt` -> `train`.
pub fn split_name(split_file: &Path) -> String {
    split_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Identifiers of a split list, one per non-blank line, in file order.
pub fn read_split_identifiers(split_file: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(split_file).map_err(|e| ConvertError::io(split_file, e))?;
    Ok(parse_split_identifiers(&content))
}

pub fn parse_split_identifiers(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
