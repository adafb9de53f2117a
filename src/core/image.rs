use image::{DynamicImage, GrayImage, ImageBuffer, ImageReader, Luma};
use std::path::Path;
use thiserror::Error;

use super::hash::{self, Fingerprint};

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot identify image file {path}: {message}")]
    Decode { path: String, message: String },
}

/// Grayscale view of a decoded image file. Only the 8-bit luma plane is
/// kept; the colour buffer is dropped right after conversion.
pub struct ImageRecord {
    width: u32,
    height: u32,
    gray: GrayImage,
}

impl ImageRecord {
    /// Open and decode `path`, sniffing the format from content and
    /// falling back to the extension.
    pub fn open(path: &Path) -> Result<Self, ImageError> {
        let display = path.display().to_string();

        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|source| ImageError::Io {
                path: display.clone(),
                source,
            })?;

        let image = reader.decode().map_err(|e| ImageError::Decode {
            path: display,
            message: e.to_string(),
        })?;

        Ok(Self::from_image(image))
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            gray: grayscale(&image),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Mean of the 8-bit grayscale conversion, on a 0-255 scale.
    pub fn mean_luminance(&self) -> f64 {
        let count = self.gray.as_raw().len();
        if count == 0 {
            return 0.0;
        }
        let sum: u64 = self.gray.as_raw().iter().map(|&p| u64::from(p)).sum();
        sum as f64 / count as f64
    }

    pub fn fingerprint(&self) -> Fingerprint {
        hash::average_hash_luma(&self.gray)
    }
}

/// ITU-R 601-2 luma (299/587/114) in 16-bit fixed point, rounded to
/// nearest. Alpha is ignored.
pub fn grayscale(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    ImageBuffer::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = (u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000) >> 16;
        Luma([luma as u8])
    })
}
