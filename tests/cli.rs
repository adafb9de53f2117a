use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use image::{ImageBuffer, Rgb};
use predicates::prelude::*;

macro_rules! cargo_run {
    ($($args:expr),*) => {
        {
            let mut cmd = Command::cargo_bin("datacull")?;
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

fn gray_jpg(path: &Path, side: u32, level: u8) -> Result<()> {
    ImageBuffer::from_pixel(side, side, Rgb([level, level, level])).save(path)?;
    Ok(())
}

#[test]
fn curate_end_to_end() -> Result<()> {
    let temp = assert_fs::TempDir::new()?;
    let class = temp.child("raw/du_the");
    class.create_dir_all()?;
    gray_jpg(&class.path().join("a.jpg"), 300, 120)?;
    gray_jpg(&class.path().join("b.jpg"), 300, 120)?;
    gray_jpg(&class.path().join("c.jpg"), 50, 120)?;
    let log = temp.child("bad_images.txt");

    cargo_run!(
        "curate",
        "--raw_dir",
        temp.child("raw").path(),
        "--min_size",
        "128",
        "--out_bad",
        log.path()
    )
    .success()
    .stdout(predicate::str::contains("[CLASS] du_the"))
    .stdout(predicate::str::contains(
        "[DONE] Scanned: 3 | Removed bad: 1 | Removed dupes: 1",
    ))
    .stdout(predicate::str::contains("[LOG] bad details:"));

    class.child("a.jpg").assert(predicate::path::exists());
    class.child("b.jpg").assert(predicate::path::missing());
    class.child("c.jpg").assert(predicate::path::missing());

    let a = class.path().join("a.jpg");
    let b = class.path().join("b.jpg");
    log.assert(predicate::str::contains(format!(
        "DUPLICATE\t{}\tDUPE_OF\t{}",
        b.display(),
        a.display()
    )));
    log.assert(predicate::str::contains("QUALITY\t").and(predicate::str::contains("c.jpg")));

    Ok(())
}

#[test]
fn curate_twice_is_a_noop() -> Result<()> {
    let temp = assert_fs::TempDir::new()?;
    let class = temp.child("raw/pizza");
    class.create_dir_all()?;
    gray_jpg(&class.path().join("a.jpg"), 200, 120)?;
    gray_jpg(&class.path().join("b.jpg"), 200, 120)?;
    class.child("broken.png").write_str("nope")?;
    let log = temp.child("bad.txt");

    cargo_run!("curate", "--raw_dir", temp.child("raw").path(), "--out_bad", log.path())
        .success()
        .stdout(predicate::str::contains(
            "[DONE] Scanned: 3 | Removed bad: 1 | Removed dupes: 1",
        ));
    log.assert(predicate::str::contains("ERROR\t"));

    cargo_run!("curate", "--raw_dir", temp.child("raw").path(), "--out_bad", log.path())
        .success()
        .stdout(predicate::str::contains(
            "[DONE] Scanned: 1 | Removed bad: 0 | Removed dupes: 0",
        ));
    log.assert("");

    Ok(())
}

#[test]
fn curate_writes_summary_json() -> Result<()> {
    let temp = assert_fs::TempDir::new()?;
    let class = temp.child("raw/mine");
    class.create_dir_all()?;
    gray_jpg(&class.path().join("a.jpg"), 200, 120)?;
    let summary = temp.child("summary.json");

    cargo_run!(
        "curate",
        "--raw_dir",
        temp.child("raw").path(),
        "--out_bad",
        temp.child("bad.txt").path(),
        "--summary_json",
        summary.path()
    )
    .success();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(summary.path())?)?;
    assert_eq!(value["scanned"], 1);
    assert_eq!(value["kept"], 1);
    assert_eq!(value["classes"][0]["name"], "mine");

    Ok(())
}

#[test]
fn curate_requires_raw_dir() -> Result<()> {
    cargo_run!("curate")
        .failure()
        .stderr(predicate::str::contains("--raw_dir"));
    Ok(())
}

#[test]
fn curate_missing_root_fails() -> Result<()> {
    let temp = assert_fs::TempDir::new()?;
    cargo_run!(
        "curate",
        "--raw_dir",
        temp.child("nowhere").path(),
        "--out_bad",
        temp.child("bad.txt").path()
    )
    .failure()
    .stderr(predicate::str::contains("Failed to curate"));
    Ok(())
}

#[test]
fn split_then_report() -> Result<()> {
    let temp = assert_fs::TempDir::new()?;
    for i in 0..10 {
        temp.child(format!("raw/samosa/{i}.jpg")).write_str("x")?;
    }

    cargo_run!(
        "split",
        "--raw_dir",
        temp.child("raw").path(),
        "--out_root",
        temp.path()
    )
    .success()
    .stdout(predicate::str::contains("[samosa] total=10 train=7 val=1 test=2"))
    .stdout(predicate::str::contains("[DONE] Splitting complete."));

    cargo_run!("report", "--data_root", temp.path())
        .success()
        .stdout(predicate::str::contains("=== RAW ===\nTotal images: 10"))
        .stdout(predicate::str::contains("=== TRAIN ===\nTotal images: 7\nsamosa: 7"))
        .stdout(predicate::str::contains("=== TEST ===\nTotal images: 2\nsamosa: 2"));

    Ok(())
}

#[test]
fn split_rejects_bad_ratios() -> Result<()> {
    let temp = assert_fs::TempDir::new()?;
    temp.child("raw/samosa").create_dir_all()?;
    cargo_run!(
        "split",
        "--raw_dir",
        temp.child("raw").path(),
        "--out_root",
        temp.path(),
        "--train",
        "0.9"
    )
    .failure()
    .stderr(predicate::str::contains("must sum to 1.0"));
    Ok(())
}

#[test]
fn weights_from_train_dir() -> Result<()> {
    let temp = assert_fs::TempDir::new()?;
    for i in 0..3 {
        temp.child(format!("train/pizza/{i}.png")).write_str("x")?;
    }
    temp.child("train/samosa/0.png").write_str("x")?;

    cargo_run!("weights", "--train_dir", temp.child("train").path())
        .success()
        .stdout(predicate::str::contains("counts: {\"pizza\": 3, \"samosa\": 1}"))
        .stdout(predicate::str::contains("class_weight (index->weight): {0: 0.667, 1: 2}"));

    Ok(())
}

#[test]
fn weights_keep_label_order() -> Result<()> {
    let temp = assert_fs::TempDir::new()?;
    for i in 0..3 {
        temp.child(format!("train/pizza/{i}.png")).write_str("x")?;
    }
    temp.child("train/samosa/0.png").write_str("x")?;

    cargo_run!(
        "weights",
        "--train_dir",
        temp.child("train").path(),
        "--labels",
        "samosa,pizza"
    )
    .success()
    .stdout(predicate::str::contains("counts: {\"samosa\": 1, \"pizza\": 3}"))
    .stdout(predicate::str::contains("class_weight (index->weight): {0: 2, 1: 0.667}"));

    Ok(())
}
