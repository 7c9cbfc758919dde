// SPDX-License-Identifier: GPL-3.0-only

//! Strip layout geometry
//!
//! Every surface that shows a strip (layout thumbnail, camera viewport,
//! selection preview, capture buffer, final export) derives its slot size
//! from [`slot_dims`]. The strip's long axis is pinned to `3 × base`; since the
//! gap is a fixed pixel count, small surfaces get slightly longer slots.

use crate::errors::LayoutError;
use serde::{Deserialize, Serialize};

/// Gap between adjacent slots, in pixels. Not scaled with `base`.
pub const SLOT_GAP: u32 = 10;

/// Strip length along the long axis, as a multiple of `base`.
pub const STRIP_LENGTH_FACTOR: u32 = 3;

/// Smallest number of photos in a strip
pub const MIN_PHOTO_COUNT: u8 = 1;

/// Largest number of photos in a strip
pub const MAX_PHOTO_COUNT: u8 = 6;

/// Strip orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Slots stacked vertically; `base` is the slot width
    #[default]
    Portrait,
    /// Slots side by side; `base` is the slot height
    Landscape,
}

impl Orientation {
    pub const ALL: [Orientation; 2] = [Orientation::Portrait, Orientation::Landscape];

    /// The other orientation
    pub fn toggle(self) -> Self {
        match self {
            Orientation::Portrait => Orientation::Landscape,
            Orientation::Landscape => Orientation::Portrait,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }

    /// Label for the button that switches away from this orientation
    pub fn toggle_label(&self) -> &'static str {
        match self {
            Orientation::Portrait => "change to landscape",
            Orientation::Landscape => "change to portrait",
        }
    }
}

impl std::str::FromStr for Orientation {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" | "p" => Ok(Orientation::Portrait),
            "landscape" | "l" => Ok(Orientation::Landscape),
            other => Err(LayoutError::InvalidOrientation(other.to_string())),
        }
    }
}

/// Pixel size of one slot plus the inter-slot gap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDims {
    pub width: u32,
    pub height: u32,
    pub gap: u32,
}

impl SlotDims {
    /// Width divided by height
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }

    /// Slot extent across the strip (width for portrait, height for landscape)
    pub fn primary_base(&self, orientation: Orientation) -> u32 {
        match orientation {
            Orientation::Portrait => self.width,
            Orientation::Landscape => self.height,
        }
    }

    /// Top-left corner of slot `index` relative to the first slot
    pub fn slot_offset(&self, index: u32, orientation: Orientation) -> (u32, u32) {
        match orientation {
            Orientation::Portrait => {
                (0, index.saturating_mul(self.height.saturating_add(self.gap)))
            }
            Orientation::Landscape => {
                (index.saturating_mul(self.width.saturating_add(self.gap)), 0)
            }
        }
    }

    /// Size of `count` slots laid out with gaps, without any border
    pub fn strip_size(&self, count: u32, orientation: Orientation) -> (u32, u32) {
        let gaps = self.gap.saturating_mul(count.saturating_sub(1));
        match orientation {
            Orientation::Portrait => {
                let height = self.height.saturating_mul(count).saturating_add(gaps);
                (self.width, height)
            }
            Orientation::Landscape => {
                let width = self.width.saturating_mul(count).saturating_add(gaps);
                (width, self.height)
            }
        }
    }
}

/// Compute slot dimensions for a strip of `count` photos.
///
/// Portrait: `width = base`, `height = floor((3·base − gap·(count−1)) / count)`.
/// Landscape swaps the two roles.
pub fn slot_dims(count: u32, orientation: Orientation, base: u32) -> SlotDims {
    let count = count.max(1);
    let long = base
        .saturating_mul(STRIP_LENGTH_FACTOR)
        .saturating_sub(SLOT_GAP.saturating_mul(count - 1))
        / count;
    match orientation {
        Orientation::Portrait => SlotDims {
            width: base,
            height: long,
            gap: SLOT_GAP,
        },
        Orientation::Landscape => SlotDims {
            width: long,
            height: base,
            gap: SLOT_GAP,
        },
    }
}

/// Surfaces that render a strip, each with its own reference size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Layout picker thumbnail (also sizes the camera viewport aspect ratio)
    Thumbnail,
    /// Strip preview next to the photo grid
    SelectionPreview,
    /// Final composited strip
    Export,
    /// Buffer each captured photo is rendered into
    Capture,
}

impl Surface {
    pub const ALL: [Surface; 4] = [
        Surface::Thumbnail,
        Surface::SelectionPreview,
        Surface::Export,
        Surface::Capture,
    ];

    /// Default base size for this surface
    pub fn default_base(&self) -> u32 {
        match self {
            Surface::Thumbnail => 160,
            Surface::SelectionPreview => 130,
            Surface::Export => 320,
            Surface::Capture => 640,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Surface::Thumbnail => "thumbnail",
            Surface::SelectionPreview => "selection preview",
            Surface::Export => "export",
            Surface::Capture => "capture",
        }
    }
}

/// Photo count and orientation chosen on the layout screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLayout", into = "RawLayout")]
pub struct LayoutConfig {
    count: u8,
    orientation: Orientation,
}

impl LayoutConfig {
    /// Create a layout, rejecting counts outside `1..=6`
    pub fn new(count: u8, orientation: Orientation) -> Result<Self, LayoutError> {
        if !(MIN_PHOTO_COUNT..=MAX_PHOTO_COUNT).contains(&count) {
            return Err(LayoutError::InvalidCount(count));
        }
        Ok(Self { count, orientation })
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Same count with the orientation flipped
    pub fn toggled(&self) -> Self {
        Self {
            count: self.count,
            orientation: self.orientation.toggle(),
        }
    }

    pub fn slot_dims(&self, base: u32) -> SlotDims {
        slot_dims(self.count as u32, self.orientation, base)
    }

    pub fn slot_dims_for(&self, surface: Surface) -> SlotDims {
        self.slot_dims(surface.default_base())
    }
}

impl Default for LayoutConfig {
    /// Three portrait photos, the classic booth strip
    fn default() -> Self {
        Self {
            count: 3,
            orientation: Orientation::Portrait,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawLayout {
    count: u8,
    #[serde(default)]
    orientation: Orientation,
}

impl TryFrom<RawLayout> for LayoutConfig {
    type Error = LayoutError;

    fn try_from(raw: RawLayout) -> Result<Self, Self::Error> {
        LayoutConfig::new(raw.count, raw.orientation)
    }
}

impl From<LayoutConfig> for RawLayout {
    fn from(layout: LayoutConfig) -> Self {
        RawLayout {
            count: layout.count,
            orientation: layout.orientation,
        }
    }
}

/// A slot rectangle inside a rendered strip preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSlot {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Captured photo shown in this slot, if one has been picked for it
    pub photo: Option<usize>,
}

/// Empty or partially filled strip as shown on the layout and selection screens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripPreview {
    pub orientation: Orientation,
    pub dims: SlotDims,
    pub width: u32,
    pub height: u32,
    pub slots: Vec<PreviewSlot>,
}

impl StripPreview {
    /// Lay out `layout.count()` slots at `base`, filling them in order from `selected`
    pub fn new(layout: &LayoutConfig, base: u32, selected: &[usize]) -> Self {
        let dims = layout.slot_dims(base);
        let count = layout.count() as u32;
        let (width, height) = dims.strip_size(count, layout.orientation());
        let slots = (0..count)
            .map(|i| {
                let (x, y) = dims.slot_offset(i, layout.orientation());
                PreviewSlot {
                    x,
                    y,
                    width: dims.width,
                    height: dims.height,
                    photo: selected.get(i as usize).copied(),
                }
            })
            .collect();

        Self {
            orientation: layout.orientation(),
            dims,
            width,
            height,
            slots,
        }
    }

    pub fn for_surface(layout: &LayoutConfig, surface: Surface, selected: &[usize]) -> Self {
        Self::new(layout, surface.default_base(), selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portrait_strip_length_is_pinned() {
        for base in [130, 160, 320, 640, 1000] {
            for count in 1..=6u32 {
                let dims = slot_dims(count, Orientation::Portrait, base);
                let used = dims.height * count + dims.gap * (count - 1);
                assert!(used <= base * 3, "count={count} base={base}");
                assert!(base * 3 - used < count, "count={count} base={base}");
                assert_eq!(dims.width, base);
            }
        }
    }

    #[test]
    fn test_huge_base_saturates() {
        let dims = slot_dims(1, Orientation::Portrait, u32::MAX);
        assert_eq!((dims.width, dims.height), (u32::MAX, u32::MAX));
        let dims = slot_dims(6, Orientation::Landscape, u32::MAX);
        assert_eq!(dims.height, u32::MAX);
        assert!(dims.strip_size(6, Orientation::Landscape).0 > u32::MAX - 6);
    }

    #[test]
    fn test_landscape_swaps_roles() {
        for count in 1..=6u32 {
            let p = slot_dims(count, Orientation::Portrait, 320);
            let l = slot_dims(count, Orientation::Landscape, 320);
            assert_eq!(p.width, l.height);
            assert_eq!(p.height, l.width);
        }
    }

    #[test]
    fn test_export_three_portrait() {
        let dims = slot_dims(3, Orientation::Portrait, 320);
        assert_eq!(dims, SlotDims { width: 320, height: 313, gap: 10 });
    }

    #[test]
    fn test_single_photo_is_full_length() {
        let dims = slot_dims(1, Orientation::Portrait, 160);
        assert_eq!(dims.height, 480);
    }

    #[test]
    fn test_degenerate_base_saturates() {
        let dims = slot_dims(6, Orientation::Portrait, 2);
        assert_eq!(dims.height, 0);
    }

    #[test]
    fn test_layout_count_range() {
        assert!(LayoutConfig::new(0, Orientation::Portrait).is_err());
        assert!(LayoutConfig::new(7, Orientation::Portrait).is_err());
        for count in 1..=6 {
            assert!(LayoutConfig::new(count, Orientation::Landscape).is_ok());
        }
    }

    #[test]
    fn test_layout_deserialize_validates() {
        let ok: LayoutConfig =
            serde_json::from_str(r#"{"count":4,"orientation":"landscape"}"#).unwrap();
        assert_eq!(ok.count(), 4);
        assert_eq!(ok.orientation(), Orientation::Landscape);
        assert!(serde_json::from_str::<LayoutConfig>(r#"{"count":9}"#).is_err());
    }

    #[test]
    fn test_orientation_parse_and_toggle() {
        assert_eq!("Portrait".parse::<Orientation>().unwrap(), Orientation::Portrait);
        assert_eq!("l".parse::<Orientation>().unwrap(), Orientation::Landscape);
        assert!("diagonal".parse::<Orientation>().is_err());
        assert_eq!(Orientation::Portrait.toggle(), Orientation::Landscape);
        assert_eq!(Orientation::Portrait.toggle_label(), "change to landscape");
    }

    #[test]
    fn test_strip_preview_slots() {
        let layout = LayoutConfig::new(3, Orientation::Landscape).unwrap();
        let preview = StripPreview::new(&layout, 130, &[2, 0]);
        let dims = slot_dims(3, Orientation::Landscape, 130);
        assert_eq!(preview.slots.len(), 3);
        assert_eq!(preview.slots[1].x, dims.width + SLOT_GAP);
        assert_eq!(preview.slots[1].y, 0);
        assert_eq!(preview.slots[0].photo, Some(2));
        assert_eq!(preview.slots[1].photo, Some(0));
        assert_eq!(preview.slots[2].photo, None);
        assert_eq!(preview.height, 130);
        assert_eq!(preview.width, dims.width * 3 + SLOT_GAP * 2);
    }
}
