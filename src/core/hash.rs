use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::image::grayscale;

/// Side length of the thumbnail the average hash is computed from.
pub const HASH_SIZE: u32 = 8;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Invalid fingerprint '{value}': expected 16 hex characters")]
    InvalidFingerprint { value: String },
}

/// 64-bit average hash of an image.
///
/// Bit 63 corresponds to the top-left thumbnail sample and bit 0 to the
/// bottom-right one, so the hex rendering reads in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// Number of differing bits.
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::LowerHex for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl FromStr for Fingerprint {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 16 {
            return Err(HashError::InvalidFingerprint {
                value: s.to_string(),
            });
        }
        u64::from_str_radix(s, 16)
            .map(Fingerprint)
            .map_err(|_| HashError::InvalidFingerprint {
                value: s.to_string(),
            })
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.to_string()
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = HashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Average hash of a decoded image.
pub fn average_hash(img: &DynamicImage) -> Fingerprint {
    average_hash_luma(&grayscale(img))
}

/// Average hash of an already grayscale image: downsample to 8x8 with a
/// bilinear filter, then set one bit per sample that is at or above the
/// thumbnail mean.
pub fn average_hash_luma(gray: &GrayImage) -> Fingerprint {
    let thumb = imageops::resize(gray, HASH_SIZE, HASH_SIZE, FilterType::Triangle);
    let samples = thumb.as_raw();

    let sum: u32 = samples.iter().map(|&p| u32::from(p)).sum();
    let mean = f64::from(sum) / samples.len() as f64;

    let bits = samples
        .iter()
        .fold(0u64, |acc, &p| (acc << 1) | u64::from(f64::from(p) >= mean));
    Fingerprint(bits)
}
