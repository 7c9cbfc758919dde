// SPDX-License-Identifier: MPL-2.0

//! Integration tests for strip composition and export

use chrono::Local;
use image::{Rgba, RgbaImage};
use photobooth::color::RgbColor;
use photobooth::pipelines::photo::{
    CompositionSpec, EncodedImage, EncodingFormat, PhotoEncoder, StripCompositor, StripPipeline,
};
use photobooth::session::CapturedPhoto;
use photobooth::{LayoutConfig, Orientation};
use std::sync::Arc;

fn photo(index: usize, rgba: [u8; 4]) -> CapturedPhoto {
    let image = RgbaImage::from_pixel(64, 64, Rgba(rgba));
    let encoded = PhotoEncoder::png().encode_blocking(&image).unwrap();
    CapturedPhoto {
        index,
        pixels: Arc::new(encoded),
        captured_at: Local::now(),
    }
}

fn broken_photo(index: usize) -> CapturedPhoto {
    CapturedPhoto {
        index,
        pixels: Arc::new(EncodedImage {
            data: vec![0, 1, 2, 3],
            format: EncodingFormat::Png,
            width: 64,
            height: 64,
        }),
        captured_at: Local::now(),
    }
}

fn center(image: &RgbaImage, x: u32, y: u32, w: u32, h: u32) -> [u8; 4] {
    image.get_pixel(x + w / 2, y + h / 2).0
}

#[tokio::test]
async fn test_portrait_export_geometry() {
    let layout = LayoutConfig::new(3, Orientation::Portrait).unwrap();
    let stamp = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
    let compositor = StripCompositor::new(320).with_stamp(Some(stamp));
    let photos = vec![
        photo(0, [255, 0, 0, 255]),
        photo(1, [0, 255, 0, 255]),
        photo(2, [0, 0, 255, 255]),
    ];

    let strip = compositor
        .compose(&CompositionSpec::new(layout), &photos, &[0, 1, 2])
        .await
        .unwrap();

    assert_eq!(strip.image.dimensions(), (360, 1065));
    assert_eq!(strip.geometry.dims.width, 320);
    assert_eq!(strip.geometry.dims.height, 313);
    assert_eq!(strip.geometry.stamp_size, 58);
    assert!(strip.stamped);
    assert!(strip.skipped_slots.is_empty());

    // Border keeps the frame color
    assert_eq!(strip.image.get_pixel(2, 2).0, [255, 255, 255, 255]);

    let expected = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]];
    for (slot, color) in expected.iter().enumerate() {
        let rect = strip.geometry.slot_rect(slot as u32);
        assert_eq!(center(&strip.image, rect.x, rect.y, rect.width, rect.height), *color);
    }

    let stamp = strip.geometry.stamp_rect();
    assert_eq!(
        center(&strip.image, stamp.x, stamp.y, stamp.width, stamp.height),
        [0, 0, 0, 255]
    );
}

#[tokio::test]
async fn test_selection_order_maps_to_slots() {
    let layout = LayoutConfig::new(2, Orientation::Landscape).unwrap();
    let compositor = StripCompositor::new(160);
    let photos = vec![
        photo(0, [255, 0, 0, 255]),
        photo(1, [0, 255, 0, 255]),
        photo(2, [0, 0, 255, 255]),
    ];

    let strip = compositor
        .compose(&CompositionSpec::new(layout), &photos, &[2, 0])
        .await
        .unwrap();

    let first = strip.geometry.slot_rect(0);
    let second = strip.geometry.slot_rect(1);
    assert!(second.x > first.x);
    assert_eq!(
        center(&strip.image, first.x, first.y, first.width, first.height),
        [0, 0, 255, 255]
    );
    assert_eq!(
        center(&strip.image, second.x, second.y, second.width, second.height),
        [255, 0, 0, 255]
    );
    assert!(!strip.stamped);
}

#[tokio::test]
async fn test_greyscale_and_tint() {
    let layout = LayoutConfig::new(1, Orientation::Portrait).unwrap();
    let compositor = StripCompositor::new(100);
    let photos = vec![photo(0, [200, 40, 90, 255])];

    let grey = compositor
        .compose(
            &CompositionSpec::new(layout).with_greyscale(true),
            &photos,
            &[0],
        )
        .await
        .unwrap();
    let rect = grey.geometry.slot_rect(0);
    let [r, g, b, _] = center(&grey.image, rect.x, rect.y, rect.width, rect.height);
    assert_eq!(r, g);
    assert_eq!(g, b);

    let mut spec = CompositionSpec::new(layout).with_tint_opacity(1.0);
    spec.tint_color = RgbColor::from_hex("#0000FF").unwrap();
    let tinted = compositor.compose(&spec, &photos, &[0]).await.unwrap();
    assert_eq!(
        center(&tinted.image, rect.x, rect.y, rect.width, rect.height),
        [0, 0, 255, 255]
    );
}

#[tokio::test]
async fn test_undecodable_photo_leaves_slot_empty() {
    let layout = LayoutConfig::new(2, Orientation::Portrait).unwrap();
    let compositor = StripCompositor::new(100);
    let mut spec = CompositionSpec::new(layout);
    spec.frame_color = RgbColor::from_hex("#102030").unwrap();
    let photos = vec![photo(0, [255, 0, 0, 255]), broken_photo(1)];

    let strip = compositor.compose(&spec, &photos, &[0, 1]).await.unwrap();

    assert_eq!(strip.skipped_slots, vec![1]);
    let rect = strip.geometry.slot_rect(1);
    assert_eq!(
        center(&strip.image, rect.x, rect.y, rect.width, rect.height),
        [0x10, 0x20, 0x30, 255]
    );
}

#[tokio::test]
async fn test_incomplete_selection_rejected() {
    let layout = LayoutConfig::new(3, Orientation::Portrait).unwrap();
    let photos = vec![photo(0, [0, 0, 0, 255]), photo(1, [0, 0, 0, 255])];
    let result = StripCompositor::default()
        .compose(&CompositionSpec::new(layout), &photos, &[0, 1])
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_export_writes_photostrip() {
    let dir = std::env::temp_dir().join(format!("photobooth-export-{}", uuid::Uuid::new_v4()));
    let layout = LayoutConfig::new(2, Orientation::Portrait).unwrap();
    let photos = vec![photo(0, [255, 0, 0, 255]), photo(1, [0, 255, 0, 255])];
    let pipeline = StripPipeline::new(StripCompositor::new(120));

    let exported = pipeline
        .export(&CompositionSpec::new(layout), &photos, &[1, 0], &dir)
        .await
        .unwrap();

    assert_eq!(exported.path, dir.join("photostrip.png"));
    assert_eq!(exported.encoded.format, EncodingFormat::Png);
    let reloaded = image::open(&exported.path).unwrap().to_rgba8();
    assert_eq!(reloaded.dimensions(), exported.strip.geometry.canvas_size());

    std::fs::remove_dir_all(&dir).ok();
}
