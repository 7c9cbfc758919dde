// SPDX-License-Identifier: GPL-3.0-only

//! Hand landmark providers
//!
//! A provider looks at one frame and reports the hands it sees (the session
//! runs it in single-hand mode, so at most one). Each hand is a list of
//! normalized landmarks in camera space; the wave recognizer only reads the
//! index fingertip.
//!
//! [`ScriptedLandmarkProvider`] replays a recorded trace of fingertip
//! positions, which is how the CLI and the tests drive the recognizer without
//! a hand-tracking model.

use super::types::{BackendResult, Frame};
use crate::errors::BackendError;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Number of landmarks in a full hand model
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Index fingertip landmark
pub const INDEX_FINGER_TIP: usize = 8;

/// A point in normalized camera coordinates (`x`, `y` in `[0, 1]`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Landmarks of one detected hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub points: Vec<Landmark>,
}

impl HandLandmarks {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// A full hand with every landmark at the center except the index fingertip
    pub fn with_fingertip_x(x: f64) -> Self {
        let mut points = vec![Landmark::new(0.5, 0.5, 0.0); HAND_LANDMARK_COUNT];
        points[INDEX_FINGER_TIP].x = x;
        Self { points }
    }

    pub fn point(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }
}

/// Asynchronous hand detector
pub trait HandLandmarkProvider: Send + Sync {
    /// Detect hands in `frame`; an empty list means no hand
    fn detect(&self, frame: Arc<Frame>) -> BoxFuture<'static, BackendResult<Vec<HandLandmarks>>>;

    /// Release model resources
    fn close(&self) {}
}

/// Replays a fixed sequence of fingertip positions, one per detection call
///
/// `None` entries report no hand. Once the trace is exhausted every call
/// reports no hand.
pub struct ScriptedLandmarkProvider {
    trace: Mutex<VecDeque<Option<f64>>>,
}

impl ScriptedLandmarkProvider {
    pub fn new(trace: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            trace: Mutex::new(trace.into_iter().collect()),
        }
    }

    /// Load a JSON array of numbers and nulls, e.g. `[0.4, 0.42, null, 0.3]`
    pub fn from_json(json: &str) -> BackendResult<Self> {
        let trace: Vec<Option<f64>> = serde_json::from_str(json)
            .map_err(|e| BackendError::LandmarkInit(format!("invalid landmark trace: {}", e)))?;
        info!(samples = trace.len(), "Loaded landmark trace");
        Ok(Self::new(trace))
    }

    pub fn from_path(path: &Path) -> BackendResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            BackendError::LandmarkInit(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Samples not yet replayed
    pub fn remaining(&self) -> usize {
        self.trace.lock().map(|t| t.len()).unwrap_or(0)
    }
}

impl HandLandmarkProvider for ScriptedLandmarkProvider {
    fn detect(&self, _frame: Arc<Frame>) -> BoxFuture<'static, BackendResult<Vec<HandLandmarks>>> {
        let next = self
            .trace
            .lock()
            .map_err(|_| BackendError::Inference("landmark trace poisoned".into()))
            .map(|mut trace| trace.pop_front().flatten());

        Box::pin(async move {
            let hands = next?
                .map(|x| vec![HandLandmarks::with_fingertip_x(x)])
                .unwrap_or_default();
            Ok(hands)
        })
    }

    fn close(&self) {
        if let Ok(mut trace) = self.trace.lock() {
            debug!(discarded = trace.len(), "Closing scripted landmark provider");
            trace.clear();
        }
    }
}
