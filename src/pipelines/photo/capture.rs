// SPDX-License-Identifier: MPL-2.0

//! Photo capture from a frame source
//!
//! Grabs the current frame at native resolution, center-crops it to the slot
//! aspect ratio, scales it to exactly the slot size, mirrors it horizontally
//! (the viewport is shown mirrored, so the photo matches what the user saw) and
//! encodes it.

use super::encoding::{EncodedImage, PhotoEncoder};
use crate::backends::FrameSource;
use crate::backends::types::Frame;
use crate::errors::CaptureError;
use crate::layout::SlotDims;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use std::sync::Arc;
use tracing::{debug, info};

/// Source rectangle selected by a cover crop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Largest centered rectangle of `src` with the aspect ratio of `dst`.
///
/// A wider source loses columns on both sides; a taller (or equal) source
/// loses rows at top and bottom. Degenerate targets keep the whole source.
pub fn cover_crop(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> CropRect {
    let full = CropRect {
        x: 0,
        y: 0,
        width: src_w,
        height: src_h,
    };
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return full;
    }

    let source_ar = src_w as f64 / src_h as f64;
    let target_ar = dst_w as f64 / dst_h as f64;

    if source_ar > target_ar {
        let width = ((src_h as f64 * target_ar).round() as u32).clamp(1, src_w);
        CropRect {
            x: (src_w - width) / 2,
            y: 0,
            width,
            height: src_h,
        }
    } else {
        let height = ((src_w as f64 / target_ar).round() as u32).clamp(1, src_h);
        CropRect {
            x: 0,
            y: (src_h - height) / 2,
            width: src_w,
            height,
        }
    }
}

/// Cover-crop `image` and scale the crop to exactly `width × height`
pub fn crop_to_fill(image: &RgbaImage, width: u32, height: u32, mirror: bool) -> RgbaImage {
    let crop = cover_crop(image.width(), image.height(), width, height);
    let view = imageops::crop_imm(image, crop.x, crop.y, crop.width, crop.height).to_image();
    let scaled = if (crop.width, crop.height) == (width, height) {
        view
    } else {
        imageops::resize(&view, width.max(1), height.max(1), FilterType::Triangle)
    };
    if mirror {
        imageops::flip_horizontal(&scaled)
    } else {
        scaled
    }
}

/// Photo capture handler
///
/// Turns one frame into the encoded slot image stored by the session.
#[derive(Debug, Clone)]
pub struct PhotoCapture {
    dims: SlotDims,
    encoder: PhotoEncoder,
}

impl PhotoCapture {
    pub fn new(dims: SlotDims, encoder: PhotoEncoder) -> Self {
        Self { dims, encoder }
    }

    pub fn dims(&self) -> SlotDims {
        self.dims
    }

    /// Pull the current frame from `source`; frames without dimensions are refused
    pub fn grab(source: &mut dyn FrameSource) -> Result<Arc<Frame>, CaptureError> {
        let frame = source.current_frame().ok_or(CaptureError::NoFrameAvailable)?;
        if !frame.is_ready() {
            return Err(CaptureError::EmptyFrame {
                width: frame.width,
                height: frame.height,
            });
        }
        debug!(width = frame.width, height = frame.height, "Frame captured from source");
        Ok(frame)
    }

    /// Crop, mirror and encode on the current thread
    pub fn process_blocking(&self, frame: &Frame) -> Result<EncodedImage, CaptureError> {
        let image = frame.to_image()?;
        let slot = crop_to_fill(&image, self.dims.width, self.dims.height, true);
        Ok(self.encoder.encode_blocking(&slot)?)
    }

    /// Crop, mirror and encode in a background task
    pub async fn process(&self, frame: Arc<Frame>) -> Result<EncodedImage, CaptureError> {
        info!(
            width = frame.width,
            height = frame.height,
            slot_width = self.dims.width,
            slot_height = self.dims.height,
            "Processing captured frame"
        );
        let capture = self.clone();
        tokio::task::spawn_blocking(move || capture.process_blocking(&frame))
            .await
            .map_err(|e| CaptureError::TaskFailed(e.to_string()))?
    }
}
