// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use photobooth::constants::{MAX_PHOTOS, file_formats, messages, strip, timing};
use photobooth::pipelines::photo::EncodingQuality;
use std::time::Duration;

#[test]
fn test_quality_preset_ordering() {
    // Presets are ordered from lowest to highest quality
    let presets = [
        EncodingQuality::Low,
        EncodingQuality::Medium,
        EncodingQuality::High,
        EncodingQuality::Maximum,
    ];
    let mut previous = 0u8;
    for preset in presets {
        let quality = preset.jpeg_quality();
        assert!(quality > previous, "{:?} should beat the preset before it", preset);
        assert!(quality <= 100);
        previous = quality;
    }
    assert_eq!(EncodingQuality::default().jpeg_quality(), 92);
}

#[test]
fn test_session_timing() {
    assert_eq!(timing::COUNTDOWN_SECONDS, 3);
    assert_eq!(timing::COUNTDOWN_TICK, Duration::from_secs(1));
    assert_eq!(timing::SHUTTER_DELAY, Duration::from_millis(300));
    assert_eq!(timing::INFERENCE_INTERVAL, Duration::from_millis(100));
    assert!(timing::READINESS_POLL < timing::INFERENCE_INTERVAL);
}

#[test]
fn test_cap_message_names_the_cap() {
    assert_eq!(MAX_PHOTOS, 6);
    assert_eq!(
        messages::cap_reached(MAX_PHOTOS),
        "6 photos taken! Press done when ready."
    );
    assert!(messages::cap_reached(3).starts_with("3 photos taken"));
    assert!(!messages::CAMERA_DENIED.is_empty());
}

#[test]
fn test_strip_output_name() {
    assert_eq!(strip::STRIP_FILE_NAME, "photostrip.png");
    assert!(strip::STAMP_RATIO > 0.0 && strip::STAMP_RATIO < 1.0);
}

#[test]
fn test_image_extensions() {
    assert!(file_formats::is_image_extension("jpg"));
    assert!(file_formats::is_image_extension("PNG"));
    assert!(!file_formats::is_image_extension("mp4"));
}
