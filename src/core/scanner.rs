use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::DatasetError;

pub const DEFAULT_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Image file extensions a dataset operation will pick up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedFormats {
    extensions: BTreeSet<String>,
}

impl SupportedFormats {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn is_supported(&self, file_path: &Path) -> bool {
        if let Some(extension) = file_path.extension() {
            let ext = extension.to_string_lossy().to_lowercase();
            self.extensions.contains(&ext)
        } else {
            false
        }
    }
}

impl Default for SupportedFormats {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

/// A class directory: its name is the label of every image inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDir {
    pub name: String,
    pub path: PathBuf,
}

/// Immediate subdirectories of `root`, sorted by name.
pub fn class_dirs(root: &Path) -> Result<Vec<ClassDir>, DatasetError> {
    if !root.is_dir() {
        return Err(DatasetError::InvalidPath {
            path: format!("{} is not a directory", root.display()),
        });
    }

    let mut classes = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        classes.push(ClassDir {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
        });
    }
    classes.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(classes)
}

/// Supported image files under `dir`.
///
/// With `recursive` set, nested folders are walked as well and their
/// images still belong to `dir`'s class. Entries are yielded in file name
/// order within each directory level.
pub fn collect_images(dir: &Path, formats: &SupportedFormats, recursive: bool) -> Vec<PathBuf> {
    let max_depth = if recursive { usize::MAX } else { 1 };

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| formats.is_supported(path))
        .collect()
}

/// Number of supported images under `dir`, or 0 when it does not exist.
pub fn count_images(dir: &Path, formats: &SupportedFormats, recursive: bool) -> usize {
    if !dir.is_dir() {
        return 0;
    }
    collect_images(dir, formats, recursive).len()
}
