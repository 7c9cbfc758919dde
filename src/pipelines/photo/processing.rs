// SPDX-License-Identifier: MPL-2.0

//! Per-photo post-processing
//!
//! Runs on each cropped slot image before it is drawn into the strip:
//! - Greyscale conversion (ITU-R BT.601 luma)
//!
//! Tinting is not a per-pixel filter on the photo; it is blended over the
//! whole slot by the compositor after the draw.

use image::RgbaImage;
use tracing::debug;

/// BT.601 luma weights
const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// Post-processing configuration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PostProcessingConfig {
    /// Convert the photo to greyscale
    pub greyscale: bool,
}

/// Luma of one RGB pixel, rounded to the nearest integer
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    (LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Replace every pixel's RGB channels with its luma; alpha is untouched
pub fn apply_greyscale(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let l = luma(r, g, b);
        pixel.0[0] = l;
        pixel.0[1] = l;
        pixel.0[2] = l;
    }
}

/// Post-processor for slot images
#[derive(Debug, Clone, Default)]
pub struct PostProcessor {
    config: PostProcessingConfig,
}

impl PostProcessor {
    pub fn new(config: PostProcessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> PostProcessingConfig {
        self.config
    }

    /// Apply every enabled step in place
    pub fn process(&self, image: &mut RgbaImage) {
        if self.config.greyscale {
            apply_greyscale(image);
            debug!(
                width = image.width(),
                height = image.height(),
                "Greyscale applied"
            );
        }
    }
}
