use serde::{Deserialize, Serialize};
use std::path::Path;

use super::DatasetError;
use super::scanner::{self, SupportedFormats};

/// Labels of the reference food dataset, in model output order.
pub const FOOD_LABELS: [&str; 10] = [
    "boulettes",
    "dholl_puri",
    "du_the",
    "faratha",
    "gato_piment",
    "jalebi",
    "mine",
    "pizza",
    "riz_frite",
    "samosa",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassWeights {
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
    /// Indexed like `labels`.
    pub weights: Vec<f64>,
}

impl ClassWeights {
    /// `(label, count)` pairs in label order; repeated labels are kept.
    pub fn counts_by_label(&self) -> Vec<(&str, usize)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
            .collect()
    }

    /// `{"label": count, ...}` in label order.
    pub fn counts_line(&self) -> String {
        let pairs: Vec<String> = self
            .counts_by_label()
            .into_iter()
            .map(|(label, count)| format!("{label:?}: {count}"))
            .collect();
        format!("{{{}}}", pairs.join(", "))
    }

    /// `{index: weight, ...}` in label order.
    pub fn weights_line(&self) -> String {
        let pairs: Vec<String> = self
            .weights
            .iter()
            .enumerate()
            .map(|(i, w)| format!("{i}: {w}"))
            .collect();
        format!("{{{}}}", pairs.join(", "))
    }
}

/// Balanced class weights `total / (classes * count)`, rounded to three
/// decimals, from per-label image counts.
pub fn balanced_weights(labels: &[String], counts: &[usize]) -> Result<Vec<f64>, DatasetError> {
    let total: usize = counts.iter().sum();
    let classes = counts.len() as f64;

    labels
        .iter()
        .zip(counts)
        .map(|(label, &count)| {
            if count == 0 {
                return Err(DatasetError::EmptyClass {
                    label: label.clone(),
                });
            }
            let weight = total as f64 / (classes * count as f64);
            Ok((weight * 1000.0).round() / 1000.0)
        })
        .collect()
}

/// Count the direct images of each label directory under `train_dir`
/// and derive balanced weights. A missing label directory counts as
/// empty.
pub fn class_weights(
    train_dir: &Path,
    labels: &[String],
    formats: &SupportedFormats,
) -> Result<ClassWeights, DatasetError> {
    let counts: Vec<usize> = labels
        .iter()
        .map(|label| scanner::count_images(&train_dir.join(label), formats, false))
        .collect();
    let weights = balanced_weights(labels, &counts)?;

    Ok(ClassWeights {
        labels: labels.to_vec(),
        counts,
        weights,
    })
}

/// Sorted class directory names of `train_dir`.
pub fn discover_labels(train_dir: &Path) -> Result<Vec<String>, DatasetError> {
    Ok(scanner::class_dirs(train_dir)?
        .into_iter()
        .map(|class| class.name)
        .collect())
}
