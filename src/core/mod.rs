pub mod curator;
pub mod duplicate;
pub mod hash;
pub mod image;
pub mod quality;
pub mod report;
pub mod scanner;
pub mod split;
pub mod weights;

use thiserror::Error;

/// Failures that abort a whole dataset operation. Per-image problems
/// during curation are recorded as outcomes instead.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Split ratios must sum to 1.0 (got {sum})")]
    InvalidRatios { sum: f64 },

    #[error("Class '{label}' has no images")]
    EmptyClass { label: String },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
