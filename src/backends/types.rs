// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for frame and landmark backends

use crate::errors::{BackendError, CaptureError};
use image::RgbaImage;
use std::sync::Arc;
use std::time::Instant;

pub type BackendResult<T> = Result<T, BackendError>;

/// A single RGBA frame delivered by a frame source
#[derive(Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA pixels, `width * height * 4` bytes
    pub data: Arc<[u8]>,
    /// When the frame was produced (for latency diagnostics)
    pub captured_at: Instant,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            data: data.into(),
            captured_at: Instant::now(),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }

    /// Frame filled with a single color (used by tests and placeholder sources)
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data: Vec<u8> = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::new(width, height, data)
    }

    /// A frame is usable once it has non-zero dimensions
    pub fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Copy the pixels into an owned image, validating size
    pub fn to_image(&self) -> Result<RgbaImage, CaptureError> {
        if !self.is_ready() {
            return Err(CaptureError::EmptyFrame {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.width as usize * self.height as usize * 4;
        if self.data.len() < expected {
            return Err(CaptureError::FrameDataTooSmall {
                expected,
                actual: self.data.len(),
            });
        }
        RgbaImage::from_raw(self.width, self.height, self.data[..expected].to_vec()).ok_or(
            CaptureError::FrameDataTooSmall {
                expected,
                actual: self.data.len(),
            },
        )
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_frame() {
        let frame = Frame::solid(4, 3, [1, 2, 3, 255]);
        assert!(frame.is_ready());
        assert_eq!(frame.data.len(), 4 * 3 * 4);
        let image = frame.to_image().unwrap();
        assert_eq!(image.get_pixel(3, 2).0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_empty_frame_rejected() {
        let frame = Frame::new(0, 10, Vec::new());
        assert!(!frame.is_ready());
        assert!(matches!(frame.to_image(), Err(CaptureError::EmptyFrame { .. })));
    }

    #[test]
    fn test_short_data_rejected() {
        let frame = Frame::new(2, 2, vec![0u8; 7]);
        assert!(matches!(
            frame.to_image(),
            Err(CaptureError::FrameDataTooSmall { expected: 16, actual: 7 })
        ));
    }
}
