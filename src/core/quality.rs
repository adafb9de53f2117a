use serde::{Deserialize, Serialize};
use std::fmt;

use super::image::ImageRecord;

pub const DEFAULT_MIN_SIDE: u32 = 128;
pub const DEFAULT_DARK: f64 = 5.0;
pub const DEFAULT_BRIGHT: f64 = 250.0;

/// Absolute size and brightness limits an image must meet to stay in the
/// dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityPolicy {
    pub min_side: u32,
    /// Grayscale mean at or below this is too dark.
    pub dark: f64,
    /// Grayscale mean at or above this is too bright.
    pub bright: f64,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            min_side: DEFAULT_MIN_SIDE,
            dark: DEFAULT_DARK,
            bright: DEFAULT_BRIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QualityIssue {
    TooSmall { width: u32, height: u32 },
    TooDark { mean: f64 },
    TooBright { mean: f64 },
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityIssue::TooSmall { width, height } => write!(f, "too small ({width}x{height})"),
            QualityIssue::TooDark { mean } => write!(f, "too dark (mean {mean:.1})"),
            QualityIssue::TooBright { mean } => write!(f, "too bright (mean {mean:.1})"),
        }
    }
}

impl QualityPolicy {
    /// First policy violation of `record`, size before brightness.
    pub fn check(&self, record: &ImageRecord) -> Option<QualityIssue> {
        if let Some(issue) = self.check_size(record.width(), record.height()) {
            return Some(issue);
        }
        self.check_brightness(record.mean_luminance())
    }

    pub fn check_size(&self, width: u32, height: u32) -> Option<QualityIssue> {
        (width < self.min_side || height < self.min_side)
            .then_some(QualityIssue::TooSmall { width, height })
    }

    pub fn check_brightness(&self, mean: f64) -> Option<QualityIssue> {
        if mean <= self.dark {
            Some(QualityIssue::TooDark { mean })
        } else if mean >= self.bright {
            Some(QualityIssue::TooBright { mean })
        } else {
            None
        }
    }
}
