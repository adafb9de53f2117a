use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::DatasetError;
use super::duplicate::DuplicateIndex;
use super::image::ImageRecord;
use super::quality::{QualityIssue, QualityPolicy};
use super::scanner::{self, SupportedFormats};

pub const DEFAULT_LOG_FILE: &str = "bad_images.txt";

/// Settings for one in-place curation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurateConfig {
    /// Dataset root; its immediate subdirectories are the classes.
    pub raw_dir: PathBuf,
    /// Where the removal log is written once traversal completes.
    pub out_bad: PathBuf,
    pub quality: QualityPolicy,
    pub formats: SupportedFormats,
    /// Evaluate and log without deleting anything.
    pub dry_run: bool,
}

impl Default for CurateConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            out_bad: PathBuf::from(DEFAULT_LOG_FILE),
            quality: QualityPolicy::default(),
            formats: SupportedFormats::default(),
            dry_run: false,
        }
    }
}

/// One line of the removal log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalEntry {
    Quality { path: PathBuf },
    Duplicate { path: PathBuf, original: PathBuf },
    Error { path: PathBuf, message: String },
}

impl fmt::Display for RemovalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalEntry::Quality { path } => write!(f, "QUALITY\t{}", path.display()),
            RemovalEntry::Duplicate { path, original } => write!(
                f,
                "DUPLICATE\t{}\tDUPE_OF\t{}",
                path.display(),
                original.display()
            ),
            // One entry per line, whatever the decoder put in its message.
            RemovalEntry::Error { path, message } => write!(
                f,
                "ERROR\t{}\t{}",
                path.display(),
                message.replace(['\n', '\r'], " ")
            ),
        }
    }
}

/// Verdict for a single image file.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Kept,
    Quality(QualityIssue),
    Duplicate { original: PathBuf },
    Error { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub name: String,
    pub scanned: usize,
    pub removed_bad: usize,
    pub removed_dupes: usize,
    pub kept: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurateSummary {
    pub scanned: usize,
    pub removed_bad: usize,
    pub removed_dupes: usize,
    pub kept: usize,
    pub dry_run: bool,
    pub log_path: PathBuf,
    pub classes: Vec<ClassSummary>,
    pub finished_at: String,
}

/// Walks a class-per-folder dataset and deletes, in place, images that
/// fail to decode, fail the quality policy, or repeat an earlier image's
/// fingerprint within the same class.
///
/// Files are deleted as they are evaluated while the log is only written
/// after the whole tree has been walked, so an interrupted run leaves
/// deletions without a log.
pub struct Curator {
    config: CurateConfig,
    index: DuplicateIndex,
    entries: Vec<RemovalEntry>,
}

impl Curator {
    pub fn new(config: CurateConfig) -> Self {
        Self {
            config,
            index: DuplicateIndex::new(),
            entries: Vec::new(),
        }
    }

    pub fn config(&self) -> &CurateConfig {
        &self.config
    }

    pub fn entries(&self) -> &[RemovalEntry] {
        &self.entries
    }

    /// Curate every class directory, then write the removal log.
    ///
    /// Only an unreadable dataset root or an unwritable log fails the run;
    /// per-image problems are logged and skipped.
    pub fn run(&mut self) -> Result<CurateSummary, DatasetError> {
        let classes = scanner::class_dirs(&self.config.raw_dir)?;
        let mut class_summaries = Vec::with_capacity(classes.len());

        for class in &classes {
            println!("[CLASS] {}", class.name);
            let mut summary = ClassSummary {
                name: class.name.clone(),
                ..Default::default()
            };

            for path in scanner::collect_images(&class.path, &self.config.formats, true) {
                summary.scanned += 1;
                let outcome = self.process_file(&class.name, &path);
                match outcome {
                    Outcome::Kept => summary.kept += 1,
                    Outcome::Duplicate { .. } => summary.removed_dupes += 1,
                    Outcome::Quality(_) | Outcome::Error { .. } => summary.removed_bad += 1,
                }
            }

            log::info!(
                "{}: scanned {}, removed {} bad and {} duplicates",
                summary.name,
                summary.scanned,
                summary.removed_bad,
                summary.removed_dupes
            );
            class_summaries.push(summary);
        }

        let log_path = self.write_log()?;

        let summary = CurateSummary {
            scanned: class_summaries.iter().map(|c| c.scanned).sum(),
            removed_bad: class_summaries.iter().map(|c| c.removed_bad).sum(),
            removed_dupes: class_summaries.iter().map(|c| c.removed_dupes).sum(),
            kept: class_summaries.iter().map(|c| c.kept).sum(),
            dry_run: self.config.dry_run,
            log_path,
            classes: class_summaries,
            finished_at: Utc::now().to_rfc3339(),
        };

        println!(
            "[DONE] Scanned: {} | Removed bad: {} | Removed dupes: {}",
            summary.scanned, summary.removed_bad, summary.removed_dupes
        );
        println!("[LOG] bad details: {}", summary.log_path.display());

        Ok(summary)
    }

    /// Evaluate one image and, if it has to go, log it and delete it.
    pub fn process_file(&mut self, class: &str, path: &Path) -> Outcome {
        let outcome = self.evaluate(class, path);

        match &outcome {
            Outcome::Kept => {}
            Outcome::Quality(issue) => {
                log::debug!("{}: {}", path.display(), issue);
                self.entries.push(RemovalEntry::Quality {
                    path: path.to_path_buf(),
                });
                self.delete(path, true);
            }
            Outcome::Duplicate { original } => {
                log::debug!("{}: duplicate of {}", path.display(), original.display());
                self.entries.push(RemovalEntry::Duplicate {
                    path: path.to_path_buf(),
                    original: original.clone(),
                });
                self.delete(path, true);
            }
            Outcome::Error { message } => {
                log::warn!("Failed to process {}: {}", path.display(), message);
                self.entries.push(RemovalEntry::Error {
                    path: path.to_path_buf(),
                    message: message.clone(),
                });
                self.delete(path, false);
            }
        }

        outcome
    }

    fn evaluate(&mut self, class: &str, path: &Path) -> Outcome {
        // Scoped so the decoded pixels are released before the next file.
        let fingerprint = {
            let record = match ImageRecord::open(path) {
                Ok(record) => record,
                Err(e) => {
                    return Outcome::Error {
                        message: e.to_string(),
                    };
                }
            };

            if let Some(issue) = self.config.quality.check(&record) {
                return Outcome::Quality(issue);
            }
            record.fingerprint()
        };

        match self.index.check_or_insert(class, fingerprint, path) {
            Some(original) => Outcome::Duplicate {
                original: original.to_path_buf(),
            },
            None => {
                log::debug!("{}: kept ({})", path.display(), fingerprint);
                Outcome::Kept
            }
        }
    }

    fn delete(&self, path: &Path, report_failure: bool) {
        if self.config.dry_run {
            return;
        }
        if let Err(e) = remove_file_if_exists(path) {
            if report_failure {
                log::warn!("Failed to delete {}: {}", path.display(), e);
            } else {
                log::debug!("Failed to delete {}: {}", path.display(), e);
            }
        }
    }

    /// Overwrite the log with every entry, newline separated, and return
    /// its absolute path.
    fn write_log(&self) -> Result<PathBuf, DatasetError> {
        let out = &self.config.out_bad;
        let content = self
            .entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(out, content)?;

        Ok(fs::canonicalize(out).unwrap_or_else(|_| out.clone()))
    }
}

/// Delete `path`; a file that is already gone is not an error.
pub fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
