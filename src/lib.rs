//! Dataset preparation for class-per-folder image datasets: in-place
//! quality and duplicate curation, train/val/test splitting, sanity
//! reporting and class weight computation.

pub mod core;

pub use crate::core::curator::{CurateConfig, CurateSummary, Curator, RemovalEntry};
pub use crate::core::split::{SplitConfig, SplitSummary};
