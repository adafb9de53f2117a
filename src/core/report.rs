use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use super::DatasetError;
use super::scanner::{self, SupportedFormats};

pub const REPORT_SPLITS: [&str; 4] = ["raw", "train", "val", "test"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitReport {
    pub name: String,
    /// `None` when the split directory does not exist.
    pub total: Option<usize>,
    pub per_class: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanityReport {
    pub splits: Vec<SplitReport>,
}

/// Image counts for `data_root/{raw,train,val,test}`.
///
/// Totals include nested folders. Per-class counts cover direct children
/// only and are skipped for `raw`, which has not been split yet.
pub fn sanity_report(data_root: &Path, formats: &SupportedFormats) -> Result<SanityReport, DatasetError> {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut splits = Vec::with_capacity(REPORT_SPLITS.len());
    for name in REPORT_SPLITS {
        spinner.set_message(format!("Counting {name}…"));
        let dir = data_root.join(name);
        if !dir.is_dir() {
            splits.push(SplitReport {
                name: name.to_string(),
                total: None,
                per_class: BTreeMap::new(),
            });
            continue;
        }

        let total = scanner::count_images(&dir, formats, true);
        let mut per_class = BTreeMap::new();
        if name != "raw" {
            for class in scanner::class_dirs(&dir)? {
                per_class.insert(class.name, scanner::count_images(&class.path, formats, false));
            }
        }
        splits.push(SplitReport {
            name: name.to_string(),
            total: Some(total),
            per_class,
        });
    }

    spinner.finish_and_clear();
    Ok(SanityReport { splits })
}

impl fmt::Display for SanityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for split in &self.splits {
            let title = split.name.to_uppercase();
            match split.total {
                None => writeln!(f, "\n=== {title} === (missing)")?,
                Some(total) => {
                    writeln!(f, "\n=== {title} ===")?;
                    writeln!(f, "Total images: {total}")?;
                    for (class, count) in &split.per_class {
                        writeln!(f, "{class}: {count}")?;
                    }
                }
            }
        }
        Ok(())
    }
}
