use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use datacull::core::curator::{CurateConfig, Curator, DEFAULT_LOG_FILE};
use datacull::core::quality::{DEFAULT_BRIGHT, DEFAULT_DARK, DEFAULT_MIN_SIDE, QualityPolicy};
use datacull::core::report;
use datacull::core::scanner::SupportedFormats;
use datacull::core::split::{self, SplitConfig};
use datacull::core::weights::{self, FOOD_LABELS};

#[derive(Parser, Debug)]
#[command(name = "datacull", version, about = "Prepare class-per-folder image datasets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Delete unreadable, low quality and duplicate images in place
    Curate {
        /// Dataset root containing one directory per class
        #[arg(long = "raw_dir", value_name = "DIR")]
        raw_dir: PathBuf,
        /// Minimum width and height in pixels
        #[arg(long = "min_size", default_value_t = DEFAULT_MIN_SIDE)]
        min_size: u32,
        /// Removal log path (overwritten on every run)
        #[arg(long = "out_bad", value_name = "FILE", default_value = DEFAULT_LOG_FILE)]
        out_bad: PathBuf,
        /// Grayscale mean at or below which an image is too dark
        #[arg(long, default_value_t = DEFAULT_DARK)]
        dark: f64,
        /// Grayscale mean at or above which an image is too bright
        #[arg(long, default_value_t = DEFAULT_BRIGHT)]
        bright: f64,
        /// Only log what would be removed
        #[arg(long = "dry_run")]
        dry_run: bool,
        /// Also write the run summary as JSON
        #[arg(long = "summary_json", value_name = "FILE")]
        summary_json: Option<PathBuf>,
    },

    /// Copy a dataset into seeded train/val/test splits
    Split {
        #[arg(long = "raw_dir", value_name = "DIR")]
        raw_dir: PathBuf,
        #[arg(long = "out_root", value_name = "DIR")]
        out_root: PathBuf,
        #[arg(long, default_value_t = 0.70)]
        train: f64,
        #[arg(long, default_value_t = 0.15)]
        val: f64,
        #[arg(long, default_value_t = 0.15)]
        test: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Print image counts for the raw/train/val/test directories
    Report {
        #[arg(long = "data_root", value_name = "DIR")]
        data_root: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Compute balanced class weights from the training split
    Weights {
        #[arg(long = "train_dir", value_name = "DIR", default_value = "data/train")]
        train_dir: PathBuf,
        /// Comma separated labels in model output order (default: class directories)
        #[arg(long, value_delimiter = ',', conflicts_with = "food_labels")]
        labels: Vec<String>,
        /// Use the ten reference food labels
        #[arg(long = "food_labels")]
        food_labels: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Curate {
            raw_dir,
            min_size,
            out_bad,
            dark,
            bright,
            dry_run,
            summary_json,
        } => {
            let config = CurateConfig {
                raw_dir,
                out_bad,
                quality: QualityPolicy {
                    min_side: min_size,
                    dark,
                    bright,
                },
                formats: SupportedFormats::default(),
                dry_run,
            };
            let mut curator = Curator::new(config);
            let summary = benchmark("curation", || curator.run())
                .with_context(|| format!("Failed to curate {}", curator.config().raw_dir.display()))?;

            if dry_run {
                println!("⚠️  Dry-run only; no files were deleted.");
            }
            if let Some(path) = summary_json {
                write_json(&path, &summary)?;
            }
        }

        Commands::Split {
            raw_dir,
            out_root,
            train,
            val,
            test,
            seed,
        } => {
            let config = SplitConfig {
                raw_dir,
                out_root,
                train,
                val,
                test,
                seed,
                ..Default::default()
            };
            benchmark("splitting", || split::split_dataset(&config))
                .with_context(|| format!("Failed to split {}", config.raw_dir.display()))?;
        }

        Commands::Report { data_root, json } => {
            let report = report::sanity_report(&data_root, &SupportedFormats::default())
                .with_context(|| format!("Failed to report on {}", data_root.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
        }

        Commands::Weights {
            train_dir,
            labels,
            food_labels,
            json,
        } => {
            let labels = if food_labels {
                FOOD_LABELS.iter().map(|s| s.to_string()).collect::<Vec<_>>()
            } else if labels.is_empty() {
                weights::discover_labels(&train_dir)
                    .with_context(|| format!("Could not list classes in {}", train_dir.display()))?
            } else {
                labels
            };

            let result = weights::class_weights(&train_dir, &labels, &SupportedFormats::default())
                .with_context(|| format!("Failed to compute weights from {}", train_dir.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("counts: {}", result.counts_line());
                println!("class_weight (index->weight): {}", result.weights_line());
            }
        }
    }

    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote summary to {}", path.display());
    Ok(())
}

/// Run `f()`, log how long it took (with `label`), and return its result.
fn benchmark<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    log::info!("⏱ {} took {:.2?}", label, start.elapsed());
    result
}
