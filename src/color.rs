// SPDX-License-Identifier: GPL-3.0-only

//! Frame and tint colors
//!
//! Colors are picked in HSV space (a hue strip plus a saturation/value
//! gradient) and handed to the compositor as 8-bit RGB. The hex string is
//! always derived, never stored on its own except when the user types one.

use crate::errors::ColorError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const WHITE: RgbColor = RgbColor::new(255, 255, 255);
    pub const BLACK: RgbColor = RgbColor::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `RRGGBB` (either case)
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let trimmed = hex.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(hex.to_string()));
        }
        let value =
            u32::from_str_radix(digits, 16).map_err(|_| ColorError::InvalidHex(hex.to_string()))?;
        Ok(Self::new(
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        ))
    }

    /// Uppercase `#RRGGBB`
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for RgbColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for RgbColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for RgbColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<RgbColor> for String {
    fn from(color: RgbColor) -> Self {
        color.to_hex()
    }
}

/// HSV triple: hue in degrees `[0, 360)`, saturation and value in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsvColor {
    pub hue: f64,
    pub sat: f64,
    pub val: f64,
}

impl HsvColor {
    pub fn new(hue: f64, sat: f64, val: f64) -> Self {
        Self {
            hue: hue.clamp(0.0, 360.0),
            sat: sat.clamp(0.0, 1.0),
            val: val.clamp(0.0, 1.0),
        }
    }

    /// 60° sector conversion, channels rounded to the nearest integer
    pub fn to_rgb(&self) -> RgbColor {
        let (h, s, v) = (self.hue, self.sat, self.val);
        let c = v * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = v - c;

        let (r, g, b) = if h < 60.0 {
            (c, x, 0.0)
        } else if h < 120.0 {
            (x, c, 0.0)
        } else if h < 180.0 {
            (0.0, c, x)
        } else if h < 240.0 {
            (0.0, x, c)
        } else if h < 300.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        let channel = |value: f64| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        RgbColor::new(channel(r), channel(g), channel(b))
    }

    pub fn to_hex(&self) -> String {
        self.to_rgb().to_hex()
    }
}

impl Default for HsvColor {
    /// White: no saturation, full value
    fn default() -> Self {
        Self {
            hue: 0.0,
            sat: 0.0,
            val: 1.0,
        }
    }
}

/// Convert HSV to an uppercase `#RRGGBB` string
pub fn hsv_to_hex(hue: f64, sat: f64, val: f64) -> String {
    HsvColor::new(hue, sat, val).to_hex()
}

/// Inverse of [`hsv_to_hex`] on 6-digit input
pub fn hex_to_rgb(hex: &str) -> Result<[u8; 3], ColorError> {
    RgbColor::from_hex(hex).map(|c| c.to_array())
}

/// Keep only hex digits from free-form user input
pub fn sanitize_hex_input(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_hexdigit()).collect()
}

/// State of one color picker (hue strip + saturation/value gradient + hex box)
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPicker {
    hsv: HsvColor,
    color: RgbColor,
}

impl Default for ColorPicker {
    fn default() -> Self {
        Self::new(HsvColor::default())
    }
}

impl ColorPicker {
    pub fn new(hsv: HsvColor) -> Self {
        Self {
            hsv,
            color: hsv.to_rgb(),
        }
    }

    pub fn hsv(&self) -> HsvColor {
        self.hsv
    }

    /// Current color; follows the HSV triple unless a hex value was typed since
    pub fn color(&self) -> RgbColor {
        self.color
    }

    pub fn hex(&self) -> String {
        self.color.to_hex()
    }

    /// Hex box content (no leading `#`)
    pub fn hex_digits(&self) -> String {
        self.hex()[1..].to_string()
    }

    pub fn set_hue(&mut self, hue: f64) {
        self.hsv.hue = hue.clamp(0.0, 360.0);
        self.color = self.hsv.to_rgb();
    }

    pub fn set_saturation_value(&mut self, sat: f64, val: f64) {
        self.hsv.sat = sat.clamp(0.0, 1.0);
        self.hsv.val = val.clamp(0.0, 1.0);
        self.color = self.hsv.to_rgb();
    }

    /// Hue from a position along the hue strip
    pub fn pick_hue(&mut self, x: f64, strip_width: f64) {
        if strip_width <= 0.0 {
            return;
        }
        let x = x.clamp(0.0, strip_width);
        self.set_hue((x / strip_width * 360.0).round());
    }

    /// Saturation (left→right) and value (bottom→top) from a gradient position
    pub fn pick_gradient(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let x = x.clamp(0.0, width);
        let y = y.clamp(0.0, height);
        self.set_saturation_value(x / width, 1.0 - y / height);
    }

    /// Apply typed hex input.
    ///
    /// Non-hex characters are dropped. The color only changes when exactly six
    /// digits remain; the HSV triple is left as it was. Returns the sanitized
    /// text so the input box can be rewritten.
    pub fn input_hex(&mut self, input: &str) -> String {
        let digits = sanitize_hex_input(input);
        if digits.len() == 6
            && let Ok(color) = RgbColor::from_hex(&digits)
        {
            self.color = color;
        }
        digits
    }
}

/// The two independent pickers on the download screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorPickers {
    pub frame: ColorPicker,
    pub tint: ColorPicker,
}
