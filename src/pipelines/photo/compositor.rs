// SPDX-License-Identifier: GPL-3.0-only

//! Photo strip compositor
//!
//! ```text
//! selection ──► decode (any order) ──► crop ──► greyscale? ──► draw ──► tint?
//!                                                                 │
//!                                         completion barrier ◄────┘
//!                                                 │
//!                                               stamp
//! ```
//!
//! The canvas is filled with the frame color, each selected photo is decoded
//! on the blocking pool and drawn into its slot as soon as it is ready, and the
//! stamp is drawn exactly once after every slot has reported in. A photo that
//! fails to decode leaves its slot in the frame color and still counts toward
//! the barrier.

use super::capture::crop_to_fill;
use super::processing::{PostProcessingConfig, PostProcessor};
use crate::color::{ColorPickers, RgbColor};
use crate::constants::strip::{BORDER, STAMP_MARGIN_X, STAMP_MARGIN_Y, STAMP_PAD, STAMP_RATIO};
use crate::errors::{ColorError, CompositionError};
use crate::layout::{LayoutConfig, Orientation, SlotDims, Surface};
use crate::render::{Rect, RenderTarget};
use crate::session::state::CapturedPhoto;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything that styles a strip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositionSpec {
    pub frame_color: RgbColor,
    pub tint_color: RgbColor,
    /// 0 disables the tint
    pub tint_opacity: f64,
    pub greyscale: bool,
    pub layout: LayoutConfig,
}

impl Default for CompositionSpec {
    fn default() -> Self {
        Self {
            frame_color: RgbColor::WHITE,
            tint_color: RgbColor::WHITE,
            tint_opacity: 0.0,
            greyscale: false,
            layout: LayoutConfig::default(),
        }
    }
}

impl CompositionSpec {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Take frame and tint colors from the pickers
    pub fn with_pickers(mut self, pickers: &ColorPickers) -> Self {
        self.frame_color = pickers.frame.color();
        self.tint_color = pickers.tint.color();
        self
    }

    /// Frame and tint colors from user-typed hex, rejecting anything but `RRGGBB`
    pub fn with_hex_colors(mut self, frame: &str, tint: &str) -> Result<Self, ColorError> {
        self.frame_color = RgbColor::from_hex(frame)?;
        self.tint_color = RgbColor::from_hex(tint)?;
        Ok(self)
    }

    pub fn with_tint_opacity(mut self, opacity: f64) -> Self {
        self.tint_opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_greyscale(mut self, greyscale: bool) -> Self {
        self.greyscale = greyscale;
        self
    }
}

/// Canvas, slot and stamp placement for one layout at one base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripGeometry {
    pub orientation: Orientation,
    pub count: u32,
    pub dims: SlotDims,
    pub stamp_size: u32,
    pub width: u32,
    pub height: u32,
}

impl StripGeometry {
    pub fn new(layout: &LayoutConfig, base: u32) -> Self {
        let orientation = layout.orientation();
        let count = layout.count() as u32;
        let dims = layout.slot_dims(base);
        let stamp_size = (STAMP_RATIO * dims.primary_base(orientation) as f64).round() as u32;
        let (strip_w, strip_h) = dims.strip_size(count, orientation);

        // The stamp band sits below the photos in both orientations
        let width = strip_w.saturating_add(2 * BORDER);
        let height = strip_h
            .saturating_add(2 * BORDER)
            .saturating_add(stamp_size)
            .saturating_add(STAMP_PAD);

        Self {
            orientation,
            count,
            dims,
            stamp_size,
            width,
            height,
        }
    }

    pub fn for_surface(layout: &LayoutConfig, surface: Surface) -> Self {
        Self::new(layout, surface.default_base())
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn slot_rect(&self, index: u32) -> Rect {
        let (x, y) = self.dims.slot_offset(index, self.orientation);
        Rect::new(
            x.saturating_add(BORDER),
            y.saturating_add(BORDER),
            self.dims.width,
            self.dims.height,
        )
    }

    pub fn stamp_rect(&self) -> Rect {
        Rect::new(
            self.width
                .saturating_sub(self.stamp_size.saturating_add(STAMP_MARGIN_X)),
            self.height
                .saturating_sub(self.stamp_size.saturating_add(STAMP_MARGIN_Y)),
            self.stamp_size,
            self.stamp_size,
        )
    }
}

/// Releases exactly once, when the number of arrivals reaches the participant count
#[derive(Debug, Clone)]
pub struct CompletionBarrier {
    expected: usize,
    arrived: usize,
    released: bool,
}

impl CompletionBarrier {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            arrived: 0,
            released: false,
        }
    }

    /// Record one completion; returns `true` only for the releasing arrival
    pub fn arrive(&mut self) -> bool {
        self.arrived += 1;
        self.try_release()
    }

    /// Returns `true` once if every participant has arrived (immediately for zero)
    pub fn try_release(&mut self) -> bool {
        if self.released || self.arrived < self.expected {
            return false;
        }
        self.released = true;
        true
    }

    pub fn arrived(&self) -> usize {
        self.arrived
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

/// What happened while drawing a strip
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionReport {
    /// Slots whose photo could not be decoded, in slot order
    pub skipped_slots: Vec<usize>,
    /// Whether the stamp was drawn
    pub stamped: bool,
}

/// A finished strip
#[derive(Debug, Clone)]
pub struct ComposedStrip {
    pub image: RgbaImage,
    pub geometry: StripGeometry,
    pub skipped_slots: Vec<usize>,
    pub stamped: bool,
}

/// Builds strips from captured photos
#[derive(Debug, Clone)]
pub struct StripCompositor {
    base: u32,
    stamp: Option<Arc<RgbaImage>>,
}

impl Default for StripCompositor {
    fn default() -> Self {
        Self::new(Surface::Export.default_base())
    }
}

impl StripCompositor {
    pub fn new(base: u32) -> Self {
        Self { base, stamp: None }
    }

    pub fn with_stamp(mut self, stamp: Option<RgbaImage>) -> Self {
        self.stamp = stamp.map(Arc::new);
        self
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn has_stamp(&self) -> bool {
        self.stamp.is_some()
    }

    pub fn geometry(&self, layout: &LayoutConfig) -> StripGeometry {
        StripGeometry::new(layout, self.base)
    }

    /// Compose into a fresh canvas
    pub async fn compose(
        &self,
        spec: &CompositionSpec,
        photos: &[CapturedPhoto],
        selection: &[usize],
    ) -> Result<ComposedStrip, CompositionError> {
        let geometry = self.geometry(&spec.layout);
        let mut image = RgbaImage::new(geometry.width, geometry.height);
        let report = self.compose_into(&mut image, spec, photos, selection).await?;

        Ok(ComposedStrip {
            image,
            geometry,
            skipped_slots: report.skipped_slots,
            stamped: report.stamped,
        })
    }

    /// Compose onto an existing target, which must match the strip canvas size
    pub async fn compose_into<T: RenderTarget>(
        &self,
        target: &mut T,
        spec: &CompositionSpec,
        photos: &[CapturedPhoto],
        selection: &[usize],
    ) -> Result<CompositionReport, CompositionError> {
        let geometry = self.geometry(&spec.layout);
        if target.dimensions() != geometry.canvas_size() {
            return Err(CompositionError::TargetSize {
                expected: geometry.canvas_size(),
                actual: target.dimensions(),
            });
        }
        if selection.len() != geometry.count as usize {
            return Err(CompositionError::SelectionSize {
                required: geometry.count as usize,
                selected: selection.len(),
            });
        }
        let sources = selection
            .iter()
            .map(|&index| {
                photos
                    .get(index)
                    .map(|photo| Arc::clone(&photo.pixels))
                    .ok_or(CompositionError::MissingPhoto(index))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            count = geometry.count,
            width = geometry.width,
            height = geometry.height,
            greyscale = spec.greyscale,
            tint_opacity = spec.tint_opacity,
            "Composing strip"
        );

        target.fill_rect(
            Rect::new(0, 0, geometry.width, geometry.height),
            spec.frame_color,
        );

        let processor = PostProcessor::new(PostProcessingConfig {
            greyscale: spec.greyscale,
        });
        let (slot_w, slot_h) = (geometry.dims.width, geometry.dims.height);

        let mut pending: FuturesUnordered<_> = sources
            .into_iter()
            .enumerate()
            .map(|(slot, pixels)| {
                let processor = processor.clone();
                let task = tokio::task::spawn_blocking(move || {
                    let decoded = pixels.decode()?;
                    let mut image = crop_to_fill(&decoded, slot_w, slot_h, false);
                    processor.process(&mut image);
                    Ok::<_, crate::errors::EncodingError>(image)
                });
                async move { (slot, task.await) }
            })
            .collect();

        let mut barrier = CompletionBarrier::new(pending.len());
        let mut report = CompositionReport::default();
        if barrier.try_release() {
            report.stamped = self.draw_stamp(target, &geometry);
        }

        while let Some((slot, result)) = pending.next().await {
            match result {
                Ok(Ok(image)) => {
                    let rect = geometry.slot_rect(slot as u32);
                    target.draw_image(&image, rect.x, rect.y);
                    if spec.tint_opacity > 0.0 {
                        target.blend_rect(rect, spec.tint_color, spec.tint_opacity);
                    }
                    debug!(slot, "Slot drawn");
                }
                Ok(Err(e)) => {
                    warn!(slot, error = %e, "Photo failed to decode, leaving slot empty");
                    report.skipped_slots.push(slot);
                }
                Err(e) => {
                    warn!(slot, error = %e, "Decode task failed, leaving slot empty");
                    report.skipped_slots.push(slot);
                }
            }

            if barrier.arrive() {
                report.stamped = self.draw_stamp(target, &geometry);
            }
        }

        report.skipped_slots.sort_unstable();
        Ok(report)
    }

    fn draw_stamp<T: RenderTarget>(&self, target: &mut T, geometry: &StripGeometry) -> bool {
        let Some(stamp) = &self.stamp else {
            debug!("No stamp loaded, skipping stamp");
            return false;
        };
        if geometry.stamp_size == 0 {
            return false;
        }
        let rect = geometry.stamp_rect();
        let scaled = imageops::resize(
            stamp.as_ref(),
            geometry.stamp_size,
            geometry.stamp_size,
            FilterType::Triangle,
        );
        target.draw_image(&scaled, rect.x, rect.y);
        debug!(x = rect.x, y = rect.y, size = geometry.stamp_size, "Stamp drawn");
        true
    }
}
