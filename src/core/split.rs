use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::DatasetError;
use super::scanner::{self, SupportedFormats};

pub const SPLITS: [&str; 3] = ["train", "val", "test"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    pub raw_dir: PathBuf,
    pub out_root: PathBuf,
    pub train: f64,
    pub val: f64,
    pub test: f64,
    pub seed: u64,
    pub formats: SupportedFormats,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            out_root: PathBuf::from("data"),
            train: 0.70,
            val: 0.15,
            test: 0.15,
            seed: 42,
            formats: SupportedFormats::default(),
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<(), DatasetError> {
        let sum = self.train + self.val + self.test;
        if (sum - 1.0).abs() >= 1e-6 || self.train < 0.0 || self.val < 0.0 || self.test < 0.0 {
            return Err(DatasetError::InvalidRatios { sum });
        }
        Ok(())
    }

    /// Train, val and test sizes for `n` images. Train and val are
    /// floored; test takes the remainder.
    pub fn partition(&self, n: usize) -> (usize, usize, usize) {
        let n_train = (n as f64 * self.train) as usize;
        let n_val = ((n as f64 * self.val) as usize).min(n - n_train);
        (n_train, n_val, n - n_train - n_val)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSplit {
    pub name: String,
    pub total: usize,
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitSummary {
    pub out_root: PathBuf,
    pub classes: Vec<ClassSplit>,
}

/// Copy each class of `raw_dir` into `out_root/{train,val,test}/<class>`
/// after a seeded shuffle. Source files are left untouched.
pub fn split_dataset(config: &SplitConfig) -> Result<SplitSummary, DatasetError> {
    config.validate()?;

    for split in SPLITS {
        fs::create_dir_all(config.out_root.join(split))?;
    }

    let classes = scanner::class_dirs(&config.raw_dir)?;
    let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
    println!("[CLASSES] {:?}", names);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut summaries = Vec::with_capacity(classes.len());

    for class in &classes {
        let mut images = scanner::collect_images(&class.path, &config.formats, false);
        images.shuffle(&mut rng);

        let (n_train, n_val, n_test) = config.partition(images.len());

        let destinations: Vec<PathBuf> = SPLITS
            .iter()
            .map(|split| config.out_root.join(split).join(&class.name))
            .collect();
        for dest in &destinations {
            fs::create_dir_all(dest)?;
        }

        let jobs: Vec<(&Path, &Path)> = images
            .iter()
            .enumerate()
            .map(|(i, src)| {
                let bucket = if i < n_train {
                    0
                } else if i < n_train + n_val {
                    1
                } else {
                    2
                };
                (src.as_path(), destinations[bucket].as_path())
            })
            .collect();
        copy_all(&jobs)?;

        println!(
            "[{}] total={} train={} val={} test={}",
            class.name,
            images.len(),
            n_train,
            n_val,
            n_test
        );
        summaries.push(ClassSplit {
            name: class.name.clone(),
            total: images.len(),
            train: n_train,
            val: n_val,
            test: n_test,
        });
    }

    println!("[DONE] Splitting complete.");
    Ok(SplitSummary {
        out_root: config.out_root.clone(),
        classes: summaries,
    })
}

fn copy_all(jobs: &[(&Path, &Path)]) -> Result<(), DatasetError> {
    let bar = ProgressBar::new(jobs.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    jobs.par_iter().try_for_each(|(src, dest_dir)| {
        let Some(name) = src.file_name() else {
            return Ok(());
        };
        fs::copy(src, dest_dir.join(name))?;
        bar.inc(1);
        Ok::<_, DatasetError>(())
    })?;

    bar.finish_and_clear();
    Ok(())
}
