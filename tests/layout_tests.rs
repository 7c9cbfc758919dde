// SPDX-License-Identifier: MPL-2.0

//! Integration tests for layout geometry

use photobooth::layout::{SLOT_GAP, StripPreview, Surface};
use photobooth::{LayoutConfig, Orientation, slot_dims};

#[test]
fn test_export_slot_for_three_portrait() {
    let dims = slot_dims(3, Orientation::Portrait, 320);
    assert_eq!((dims.width, dims.height, dims.gap), (320, 313, SLOT_GAP));
}

#[test]
fn test_single_photo_fills_the_strip() {
    let dims = slot_dims(1, Orientation::Portrait, 200);
    assert_eq!((dims.width, dims.height), (200, 600));
    let dims = slot_dims(1, Orientation::Landscape, 200);
    assert_eq!((dims.width, dims.height), (600, 200));
}

#[test]
fn test_every_surface_pins_the_strip_length() {
    let layout = LayoutConfig::new(4, Orientation::Portrait).unwrap();
    for surface in Surface::ALL {
        let base = surface.default_base();
        let dims = layout.slot_dims_for(surface);
        let (width, height) = dims.strip_size(4, Orientation::Portrait);
        assert_eq!(width, base);
        assert!(height <= base * 3, "{} overflows", surface.display_name());
        assert!(base * 3 - height < 4, "{} underfills", surface.display_name());
    }
}

#[test]
fn test_count_bounds() {
    assert!(LayoutConfig::new(0, Orientation::Portrait).is_err());
    assert!(LayoutConfig::new(7, Orientation::Landscape).is_err());
    for count in 1..=6 {
        assert!(LayoutConfig::new(count, Orientation::Portrait).is_ok());
    }
}

#[test]
fn test_orientation_toggle_keeps_count() {
    let layout = LayoutConfig::new(5, Orientation::Portrait).unwrap();
    let toggled = layout.toggled();
    assert_eq!(toggled.count(), 5);
    assert_eq!(toggled.orientation(), Orientation::Landscape);
    assert_eq!(toggled.toggled(), layout);
}

#[test]
fn test_preview_fills_slots_in_selection_order() {
    let layout = LayoutConfig::new(3, Orientation::Landscape).unwrap();
    let preview = StripPreview::for_surface(&layout, Surface::SelectionPreview, &[4, 1]);

    assert_eq!(preview.slots.len(), 3);
    assert_eq!(preview.slots[0].photo, Some(4));
    assert_eq!(preview.slots[1].photo, Some(1));
    assert_eq!(preview.slots[2].photo, None);

    // Landscape slots run left to right with a constant gap
    let step = preview.dims.width + SLOT_GAP;
    assert_eq!(preview.slots[1].x - preview.slots[0].x, step);
    assert!(preview.slots.iter().all(|slot| slot.y == 0));
    assert_eq!(preview.width, preview.dims.width * 3 + SLOT_GAP * 2);
}

#[test]
fn test_orientation_parsing() {
    assert_eq!("portrait".parse::<Orientation>().unwrap(), Orientation::Portrait);
    assert_eq!("Landscape".parse::<Orientation>().unwrap(), Orientation::Landscape);
    assert!("diagonal".parse::<Orientation>().is_err());
}
