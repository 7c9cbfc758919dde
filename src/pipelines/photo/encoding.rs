// SPDX-License-Identifier: GPL-3.0-only

//! Async photo encoding
//!
//! This module handles encoding images to:
//! - JPEG (with quality control), used for captured photos
//! - PNG (lossless), used for the exported strip
//!
//! Encoding and disk writes run on the blocking pool.

use crate::errors::EncodingError;
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingFormat {
    /// JPEG format (lossy compression)
    Jpeg,
    /// PNG format (lossless compression)
    Png,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "jpg",
            EncodingFormat::Png => "png",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "JPEG",
            EncodingFormat::Png => "PNG",
        }
    }
}

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    #[default]
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Maximum => 98,
        }
    }
}

/// Encoded image data
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// Decode back into RGBA pixels
    pub fn decode(&self) -> Result<RgbaImage, EncodingError> {
        let format = match self.format {
            EncodingFormat::Jpeg => ImageFormat::Jpeg,
            EncodingFormat::Png => ImageFormat::Png,
        };
        image::load_from_memory_with_format(&self.data, format)
            .map(|image| image.to_rgba8())
            .map_err(|e| EncodingError::Decode(e.to_string()))
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Photo encoder
#[derive(Debug, Clone)]
pub struct PhotoEncoder {
    format: EncodingFormat,
    quality: EncodingQuality,
}

impl PhotoEncoder {
    /// Create a new encoder with JPEG format and high quality
    pub fn new() -> Self {
        Self {
            format: EncodingFormat::Jpeg,
            quality: EncodingQuality::High,
        }
    }

    /// Lossless encoder for exported strips
    pub fn png() -> Self {
        Self {
            format: EncodingFormat::Png,
            quality: EncodingQuality::Maximum,
        }
    }

    pub fn format(&self) -> EncodingFormat {
        self.format
    }

    /// Set encoding format
    pub fn set_format(&mut self, format: EncodingFormat) {
        self.format = format;
    }

    /// Set encoding quality (only affects JPEG)
    pub fn set_quality(&mut self, quality: EncodingQuality) {
        self.quality = quality;
    }

    /// Encode on the current thread
    pub fn encode_blocking(&self, image: &RgbaImage) -> Result<EncodedImage, EncodingError> {
        let data = match self.format {
            EncodingFormat::Jpeg => Self::encode_jpeg(image, self.quality)?,
            EncodingFormat::Png => Self::encode_png(image)?,
        };
        debug!(size = data.len(), format = ?self.format, "Encoding complete");

        Ok(EncodedImage {
            data,
            format: self.format,
            width: image.width(),
            height: image.height(),
        })
    }

    /// Encode an image in a background task
    pub async fn encode(&self, image: RgbaImage) -> Result<EncodedImage, EncodingError> {
        info!(
            width = image.width(),
            height = image.height(),
            format = ?self.format,
            "Starting encoding"
        );

        let encoder = self.clone();
        tokio::task::spawn_blocking(move || encoder.encode_blocking(&image))
            .await
            .map_err(|e| EncodingError::Task(e.to_string()))?
    }

    /// Save encoded data as `output_dir/file_name`, creating the directory if needed
    pub async fn save(
        &self,
        encoded: &EncodedImage,
        output_dir: &Path,
        file_name: &str,
    ) -> Result<PathBuf, EncodingError> {
        let filepath = output_dir.join(file_name);
        info!(path = %filepath.display(), "Saving image");

        let dir = output_dir.to_path_buf();
        let path = filepath.clone();
        let data = encoded.data.clone();
        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&dir)
                .and_then(|_| std::fs::write(&path, &data))
                .map_err(|e| EncodingError::Save {
                    path: path.clone(),
                    reason: e.to_string(),
                })
        })
        .await
        .map_err(|e| EncodingError::Task(e.to_string()))??;

        info!(path = %filepath.display(), "Image saved successfully");
        Ok(filepath)
    }

    /// `IMG_<timestamp>_<index>.<ext>` for frames kept from a session
    pub fn timestamped_file_name(&self, index: usize) -> String {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        format!("IMG_{}_{}.{}", timestamp, index, self.format.extension())
    }

    /// Encode image as JPEG
    fn encode_jpeg(image: &RgbaImage, quality: EncodingQuality) -> Result<Vec<u8>, EncodingError> {
        let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);

        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality.jpeg_quality());

        encoder
            .encode(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| EncodingError::Encode {
                format: EncodingFormat::Jpeg.name(),
                reason: e.to_string(),
            })?;

        Ok(buffer)
    }

    /// Encode image as PNG
    fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, EncodingError> {
        let mut buffer = Vec::new();

        image
            .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| EncodingError::Encode {
                format: EncodingFormat::Png.name(),
                reason: e.to_string(),
            })?;

        Ok(buffer)
    }
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_format_extensions() {
        assert_eq!(EncodingFormat::Jpeg.extension(), "jpg");
        assert_eq!(EncodingFormat::Png.extension(), "png");
    }

    #[test]
    fn test_jpeg_quality_values() {
        assert_eq!(EncodingQuality::Low.jpeg_quality(), 60);
        assert_eq!(EncodingQuality::Medium.jpeg_quality(), 80);
        assert_eq!(EncodingQuality::High.jpeg_quality(), 92);
        assert_eq!(EncodingQuality::Maximum.jpeg_quality(), 98);
        assert_eq!(EncodingQuality::default(), EncodingQuality::High);
    }

    #[test]
    fn test_png_is_lossless() {
        let image = RgbaImage::from_fn(5, 3, |x, y| Rgba([x as u8 * 40, y as u8 * 60, 7, 255]));
        let encoded = PhotoEncoder::png().encode_blocking(&image).unwrap();
        assert_eq!(encoded.format, EncodingFormat::Png);
        assert_eq!(encoded.decode().unwrap(), image);
    }

    #[test]
    fn test_jpeg_keeps_dimensions() {
        let image = RgbaImage::from_pixel(33, 17, Rgba([120, 60, 30, 255]));
        let encoded = PhotoEncoder::new().encode_blocking(&image).unwrap();
        assert_eq!(&encoded.data[..2], &[0xFF, 0xD8]);
        assert_eq!(encoded.decode().unwrap().dimensions(), (33, 17));
    }

    #[test]
    fn test_corrupt_data_fails_to_decode() {
        let encoded = EncodedImage {
            data: vec![1, 2, 3],
            format: EncodingFormat::Jpeg,
            width: 1,
            height: 1,
        };
        assert!(matches!(encoded.decode(), Err(EncodingError::Decode(_))));
    }

    #[test]
    fn test_timestamped_name() {
        let name = PhotoEncoder::new().timestamped_file_name(3);
        assert!(name.starts_with("IMG_"));
        assert!(name.ends_with("_3.jpg"));
    }
}
