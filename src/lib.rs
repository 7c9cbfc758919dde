// SPDX-License-Identifier: MPL-2.0

//! Photobooth - gesture-triggered photo strips
//!
//! This library captures a short burst of photos through a wave-triggered
//! countdown, lets the user pick a subset, and composes them into a printable
//! strip with frame color, tint, greyscale and a stamped corner image.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`layout`]: Slot geometry shared by every surface
//! - [`color`]: HSV/hex color model and the two pickers
//! - [`gesture`]: Sliding-window wave recognizer
//! - [`session`]: Countdown/capture state machine and its async runtime
//! - [`selection`]: Ordered photo selection
//! - [`pipelines`]: Capture, composition and encoding
//! - [`render`]: Raster drawing surface
//! - [`backends`]: Frame sources and hand landmark providers
//! - [`config`]: User configuration handling
//! - [`storage`]: Output directory and asset handling
//!
//! # Example
//!
//! ```ignore
//! // Typically run via the command line:
//! // photobooth booth --frames ./frames --trace wave.json --count 3
//! ```

pub mod backends;
pub mod color;
pub mod config;
pub mod constants;
pub mod errors;
pub mod gesture;
pub mod layout;
pub mod pipelines;
pub mod render;
pub mod selection;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use color::{ColorPicker, ColorPickers, HsvColor, RgbColor, hex_to_rgb, hsv_to_hex};
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use gesture::{GestureConfig, WaveDetector};
pub use layout::{LayoutConfig, Orientation, SlotDims, StripPreview, Surface, slot_dims};
pub use pipelines::photo::{CompositionSpec, StripCompositor, StripPipeline};
pub use selection::PhotoSelection;
pub use session::{CaptureSession, SessionEvent, SessionHandle, SessionRuntime, SessionStatus};
