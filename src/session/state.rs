// SPDX-License-Identifier: GPL-3.0-only

//! Capture session state types

use crate::errors::SessionError;
use crate::pipelines::photo::encoding::EncodedImage;
use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::debug;

/// Where the session is in its countdown/capture cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    /// Waiting for a trigger
    #[default]
    Idle,
    /// Counting down; `remaining` is the number on screen
    Countdown { remaining: u8 },
    /// Countdown finished, shutter pending or capture in flight
    Shuttering,
}

impl CaptureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, CaptureState::Idle)
    }

    pub fn is_counting_down(&self) -> bool {
        matches!(self, CaptureState::Countdown { .. })
    }

    /// Text for the countdown overlay
    pub fn overlay_text(&self) -> Option<String> {
        match self {
            CaptureState::Idle => None,
            CaptureState::Countdown { remaining } => Some(remaining.to_string()),
            CaptureState::Shuttering => Some("0".to_string()),
        }
    }
}

/// A photo taken during the session, stored exactly as encoded at capture time
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    pub index: usize,
    pub pixels: Arc<EncodedImage>,
    pub captured_at: DateTime<Local>,
}

/// Ordered, append-only photo list with a fixed capacity
#[derive(Debug, Clone)]
pub struct PhotoStore {
    photos: Vec<CapturedPhoto>,
    capacity: usize,
}

impl PhotoStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            photos: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a photo; its index is its position in the store
    pub fn push(&mut self, pixels: EncodedImage) -> Result<&CapturedPhoto, SessionError> {
        if self.is_full() {
            return Err(SessionError::StoreFull {
                capacity: self.capacity,
            });
        }
        let index = self.photos.len();
        self.photos.push(CapturedPhoto {
            index,
            pixels: Arc::new(pixels),
            captured_at: Local::now(),
        });
        debug!(index, total = self.photos.len(), "Photo stored");
        Ok(&self.photos[index])
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.photos.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&CapturedPhoto> {
        self.photos.get(index)
    }

    pub fn photos(&self) -> &[CapturedPhoto] {
        &self.photos
    }

    /// "n/6" counter text
    pub fn counter_text(&self) -> String {
        format!("{}/{}", self.photos.len(), self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::photo::encoding::EncodingFormat;

    fn encoded() -> EncodedImage {
        EncodedImage {
            data: vec![0xFF, 0xD8],
            format: EncodingFormat::Jpeg,
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_store_caps_at_capacity() {
        let mut store = PhotoStore::new(2);
        assert_eq!(store.push(encoded()).unwrap().index, 0);
        assert_eq!(store.push(encoded()).unwrap().index, 1);
        assert!(store.is_full());
        assert!(matches!(
            store.push(encoded()),
            Err(SessionError::StoreFull { capacity: 2 })
        ));
        assert_eq!(store.len(), 2);
        assert_eq!(store.counter_text(), "2/2");
    }

    #[test]
    fn test_overlay_text() {
        assert_eq!(CaptureState::Idle.overlay_text(), None);
        assert_eq!(
            CaptureState::Countdown { remaining: 2 }.overlay_text().as_deref(),
            Some("2")
        );
        assert_eq!(CaptureState::Shuttering.overlay_text().as_deref(), Some("0"));
    }
}
