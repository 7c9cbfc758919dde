// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines for captured photos
//!
//! All heavy operations (crop and scale, JPEG/PNG encoding, decoding for
//! composition) run on the blocking pool so the session loop never stalls.
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │    Frame     │ ──▶ │  Capture          │ ──▶ │ JPEG in the  │
//! │   (RGBA)     │     │  - cover crop     │     │ photo store  │
//! │              │     │  - mirror         │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//!
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Selected     │ ──▶ │  Compositor       │ ──▶ │ photostrip   │
//! │ photos       │     │  - greyscale/tint │     │   .png       │
//! │              │     │  - stamp          │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: capture, composition and encoding

pub mod photo;
