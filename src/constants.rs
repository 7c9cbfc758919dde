// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Maximum number of photos a capture session keeps
pub const MAX_PHOTOS: usize = 6;

/// Countdown and scheduling constants for the capture session
pub mod timing {
    use super::Duration;

    /// Countdown starts at this value and ticks down to zero
    pub const COUNTDOWN_SECONDS: u8 = 3;

    /// Period of the countdown timer
    pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

    /// Delay between the visual "0" and the shutter release
    pub const SHUTTER_DELAY: Duration = Duration::from_millis(300);

    /// Period of the gesture inference loop
    pub const INFERENCE_INTERVAL: Duration = Duration::from_millis(100);

    /// How often start-up checks whether the frame source has dimensions
    pub const READINESS_POLL: Duration = Duration::from_millis(50);

    /// How long the capture flash stays visible
    pub const FLASH_DURATION: Duration = Duration::from_millis(150);
}

/// Strip composition constants
pub mod strip {
    /// Frame border around the photos, in export pixels
    pub const BORDER: u32 = 20;

    /// Stamp edge as a fraction of the slot's primary dimension
    pub const STAMP_RATIO: f64 = 0.18;

    /// Extra canvas length reserved below the stamp
    pub const STAMP_PAD: u32 = 8;

    /// Distance from the stamp's right edge to the canvas edge
    pub const STAMP_MARGIN_X: u32 = 12;

    /// Distance from the stamp's bottom edge to the canvas edge
    pub const STAMP_MARGIN_Y: u32 = 10;

    /// File name of the exported strip
    pub const STRIP_FILE_NAME: &str = "photostrip.png";

    /// Stamp asset used when none is configured
    pub const DEFAULT_STAMP_PATH: &str = "qr.jpg";
}

/// User-facing messages
pub mod messages {
    pub const CAMERA_DENIED: &str =
        "Camera access denied. Please allow camera access and reload.";

    /// Shown once the session holds `capacity` photos
    pub fn cap_reached(capacity: usize) -> String {
        format!("{} photos taken! Press done when ready.", capacity)
    }

    pub const MANUAL_MODE: &str = "Gesture detection unavailable. Use the capture button.";
}

pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
