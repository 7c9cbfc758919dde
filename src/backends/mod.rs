// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for frames and hand tracking
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Capture session               │
//! └───────────┬───────────────────┬─────────────┘
//!             │                   │
//! ┌───────────┴──────┐  ┌─────────┴────────────┐
//! │   FrameSource    │  │ HandLandmarkProvider │
//! │ (still, sequence)│  │      (scripted)      │
//! └──────────────────┘  └──────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`frame_source`]: latest-frame access and file-backed sources
//! - [`landmarks`]: asynchronous hand landmark detection
//! - [`types`]: the shared [`Frame`](types::Frame) type

pub mod frame_source;
pub mod landmarks;
pub mod types;

pub use frame_source::{FrameSource, ImageSequenceSource, StillFrameSource, open_frame_source};
pub use landmarks::{HandLandmarkProvider, HandLandmarks, Landmark, ScriptedLandmarkProvider};
pub use types::{BackendResult, Frame};
