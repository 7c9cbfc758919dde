// SPDX-License-Identifier: GPL-3.0-only

//! Raster drawing surface used by the compositor
//!
//! The compositor only needs three primitives: fill a rectangle, blend a flat
//! color over a rectangle, and blit an image. [`RenderTarget`] abstracts them
//! so the strip can be drawn into anything that can display pixels; the crate
//! implements it for [`image::RgbaImage`]. All primitives clip to the target.

use crate::color::RgbColor;
use image::{Rgba, RgbaImage};

/// Axis-aligned rectangle in target pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersection with a `width × height` surface anchored at the origin
    pub fn clip(&self, width: u32, height: u32) -> Option<Rect> {
        let x1 = self.x.saturating_add(self.width).min(width);
        let y1 = self.y.saturating_add(self.height).min(height);
        if self.x >= x1 || self.y >= y1 {
            return None;
        }
        Some(Rect::new(self.x, self.y, x1 - self.x, y1 - self.y))
    }
}

/// Blend one channel: `src·(1−a) + over·a`, rounded
pub fn blend_channel(src: u8, over: u8, opacity: f64) -> u8 {
    let a = opacity.clamp(0.0, 1.0);
    (src as f64 * (1.0 - a) + over as f64 * a)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// A surface the compositor can draw on
pub trait RenderTarget {
    fn dimensions(&self) -> (u32, u32);

    /// Paint `rect` with an opaque color
    fn fill_rect(&mut self, rect: Rect, color: RgbColor);

    /// Alpha-blend a flat color over `rect`
    fn blend_rect(&mut self, rect: Rect, color: RgbColor, opacity: f64);

    /// Copy `image` with its top-left corner at `(x, y)`
    fn draw_image(&mut self, image: &RgbaImage, x: u32, y: u32);
}

impl RenderTarget for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbaImage::dimensions(self)
    }

    fn fill_rect(&mut self, rect: Rect, color: RgbColor) {
        let Some(rect) = rect.clip(self.width(), self.height()) else {
            return;
        };
        let pixel = Rgba([color.r, color.g, color.b, 255]);
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                self.put_pixel(x, y, pixel);
            }
        }
    }

    fn blend_rect(&mut self, rect: Rect, color: RgbColor, opacity: f64) {
        if opacity <= 0.0 {
            return;
        }
        let Some(rect) = rect.clip(self.width(), self.height()) else {
            return;
        };
        let over = color.to_array();
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                let pixel = self.get_pixel_mut(x, y);
                for c in 0..3 {
                    pixel.0[c] = blend_channel(pixel.0[c], over[c], opacity);
                }
            }
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, x: u32, y: u32) {
        image::imageops::replace(self, image, i64::from(x), i64::from(y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_is_clipped() {
        let mut target = RgbaImage::new(4, 4);
        target.fill_rect(Rect::new(2, 2, 10, 10), RgbColor::new(255, 0, 0));
        assert_eq!(target.get_pixel(3, 3).0, [255, 0, 0, 255]);
        assert_eq!(target.get_pixel(1, 1).0, [0, 0, 0, 0]);
        target.fill_rect(Rect::new(9, 9, 1, 1), RgbColor::WHITE);
    }

    #[test]
    fn test_blend_half() {
        let mut target = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        target.blend_rect(Rect::new(0, 0, 1, 2), RgbColor::new(200, 100, 255), 0.5);
        assert_eq!(target.get_pixel(0, 1).0, [100, 50, 128, 255]);
        assert_eq!(target.get_pixel(1, 1).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_zero_opacity_is_noop() {
        let mut target = RgbaImage::from_pixel(2, 2, Rgba([7, 7, 7, 255]));
        target.blend_rect(Rect::new(0, 0, 2, 2), RgbColor::BLACK, 0.0);
        assert!(target.pixels().all(|p| p.0 == [7, 7, 7, 255]));
    }

    #[test]
    fn test_draw_image_offsets() {
        let mut target = RgbaImage::new(5, 5);
        let patch = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        target.draw_image(&patch, 3, 3);
        assert_eq!(target.get_pixel(4, 4).0, [1, 2, 3, 255]);
        assert_eq!(target.get_pixel(2, 2).0, [0, 0, 0, 0]);
    }
}
