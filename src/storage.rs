// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for photo files and assets

use crate::pipelines::photo::encoding::PhotoEncoder;
use crate::session::CapturedPhoto;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Ensure the output directory exists, creating it if necessary
pub fn ensure_directory(dir: &Path) -> Result<PathBuf, std::io::Error> {
    std::fs::create_dir_all(dir)?;
    info!(path = %dir.display(), "Photo directory ready");
    Ok(dir.to_path_buf())
}

/// Load the stamp asset; `None` (with a warning) when it cannot be read
pub async fn load_stamp(path: PathBuf) -> Option<RgbaImage> {
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Stamp image unavailable");
            return None;
        }
    };

    let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .ok()?;
    match decoded {
        Ok(image) => {
            debug!(path = %path.display(), width = image.width(), height = image.height(), "Stamp loaded");
            Some(image.to_rgba8())
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Stamp image could not be decoded");
            None
        }
    }
}

/// Write captured photos verbatim as `IMG_<timestamp>_<index>.jpg`
pub async fn save_captured_photos(
    photos: &[CapturedPhoto],
    output_dir: &Path,
) -> Result<Vec<PathBuf>, crate::errors::EncodingError> {
    let mut encoder = PhotoEncoder::new();
    let mut saved = Vec::with_capacity(photos.len());
    for photo in photos {
        encoder.set_format(photo.pixels.format);
        let name = encoder.timestamped_file_name(photo.index);
        saved.push(encoder.save(&photo.pixels, output_dir, &name).await?);
    }
    info!(count = saved.len(), dir = %output_dir.display(), "Captured photos kept");
    Ok(saved)
}

/// Photos in `dir` that the capture pipeline can read, sorted by name
pub fn list_images(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(crate::constants::file_formats::is_image_extension)
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_stamp_is_none() {
        let path = std::env::temp_dir().join(format!("photobooth-{}.jpg", uuid::Uuid::new_v4()));
        assert!(load_stamp(path).await.is_none());
    }

    #[tokio::test]
    async fn test_stamp_round_trip() {
        let dir = std::env::temp_dir().join(format!("photobooth-stamp-{}", uuid::Uuid::new_v4()));
        ensure_directory(&dir).unwrap();
        let path = dir.join("qr.png");
        RgbaImage::from_pixel(6, 6, image::Rgba([0, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let stamp = load_stamp(path).await.unwrap();
        assert_eq!(stamp.dimensions(), (6, 6));
        assert_eq!(list_images(&dir).len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }
}
