// SPDX-License-Identifier: MPL-2.0

//! Async photo pipelines
//!
//! ```text
//! Frame source → Capture (crop, mirror, JPEG) → Photo store
//!                                                    ↓
//!                      Selection → Compositor → PNG encoding → photostrip.png
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Capture**: Grab the current frame and turn it into a slot-sized JPEG
//! 2. **Post-Processing**: Per-slot greyscale
//! 3. **Composition**: Frame color, slots, tint and stamp on one canvas
//! 4. **Encoding**: PNG for the strip, JPEG for captured photos
//! 5. **Disk I/O**: Save under a fixed name in the output directory

pub mod capture;
pub mod compositor;
pub mod encoding;
pub mod processing;

pub use capture::{CropRect, PhotoCapture, cover_crop};
pub use compositor::{
    ComposedStrip, CompletionBarrier, CompositionReport, CompositionSpec, StripCompositor,
    StripGeometry,
};
pub use encoding::{EncodedImage, EncodingFormat, EncodingQuality, PhotoEncoder};
pub use processing::{PostProcessingConfig, PostProcessor};

use crate::constants::strip::STRIP_FILE_NAME;
use crate::errors::AppResult;
use crate::session::CapturedPhoto;
use std::path::{Path, PathBuf};
use tracing::info;

/// A strip written to disk
#[derive(Debug, Clone)]
pub struct ExportedStrip {
    pub path: PathBuf,
    pub strip: ComposedStrip,
    pub encoded: EncodedImage,
}

/// Complete export pipeline
///
/// Orchestrates the compose → encode → save workflow.
#[derive(Debug, Clone)]
pub struct StripPipeline {
    compositor: StripCompositor,
    encoder: PhotoEncoder,
}

impl Default for StripPipeline {
    fn default() -> Self {
        Self::new(StripCompositor::default())
    }
}

impl StripPipeline {
    pub fn new(compositor: StripCompositor) -> Self {
        Self {
            compositor,
            encoder: PhotoEncoder::png(),
        }
    }

    pub fn compositor(&self) -> &StripCompositor {
        &self.compositor
    }

    /// Render the strip without saving it (download-screen preview)
    pub async fn preview(
        &self,
        spec: &CompositionSpec,
        photos: &[CapturedPhoto],
        selection: &[usize],
    ) -> AppResult<ComposedStrip> {
        Ok(self.compositor.compose(spec, photos, selection).await?)
    }

    /// Compose, encode as PNG and save as `photostrip.png` in `output_dir`
    pub async fn export(
        &self,
        spec: &CompositionSpec,
        photos: &[CapturedPhoto],
        selection: &[usize],
        output_dir: &Path,
    ) -> AppResult<ExportedStrip> {
        // Stage 1: Compose (decodes run concurrently)
        let strip = self.compositor.compose(spec, photos, selection).await?;

        // Stage 2: Encode
        let encoded = self.encoder.encode(strip.image.clone()).await?;

        // Stage 3: Save
        let path = self.encoder.save(&encoded, output_dir, STRIP_FILE_NAME).await?;

        info!(
            path = %path.display(),
            skipped = strip.skipped_slots.len(),
            stamped = strip.stamped,
            "Strip exported"
        );
        Ok(ExportedStrip {
            path,
            strip,
            encoded,
        })
    }
}
