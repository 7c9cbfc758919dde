// SPDX-License-Identifier: GPL-3.0-only

//! Wave gesture recognition
//!
//! The recognizer is fed one observation per inference result: either no
//! hand, or the normalized horizontal position of the index fingertip. It keeps
//! a short sliding window of positions and reports a wave once the window shows
//! enough direction reversals over a wide enough swing.
//!
//! After a wave the recognizer disarms itself. The capture session re-arms it
//! once the countdown it started has produced a photo, so a single wave can
//! never trigger twice.

use crate::backends::landmarks::HandLandmarks;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Tunable thresholds for wave detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Number of samples in the sliding window
    pub buffer_size: usize,
    /// Deltas smaller than this are treated as jitter
    pub noise_floor: f64,
    /// Minimum `max - min` across the window
    pub sweep_threshold: f64,
    /// Minimum number of direction changes across the window
    pub min_reversals: usize,
    /// Landmark whose x coordinate is tracked (8 = index fingertip)
    pub landmark_index: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            buffer_size: 12,
            noise_floor: 0.008,
            sweep_threshold: 0.10,
            min_reversals: 2,
            landmark_index: 8,
        }
    }
}

/// A detected wave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveDetected {
    pub reversals: usize,
    pub swing: f64,
}

/// Count sign changes between consecutive deltas, ignoring deltas below `noise_floor`
pub fn count_reversals(samples: &[f64], noise_floor: f64) -> usize {
    let mut reversals = 0;
    let mut previous: Option<bool> = None;

    for pair in samples.windows(2) {
        let delta = pair[1] - pair[0];
        if delta.abs() < noise_floor {
            continue;
        }
        let rising = delta > 0.0;
        if previous.is_some_and(|p| p != rising) {
            reversals += 1;
        }
        previous = Some(rising);
    }

    reversals
}

/// `max - min` of the samples (0 for an empty slice)
pub fn swing(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}

/// Sliding-window wave detector
#[derive(Debug, Clone)]
pub struct WaveDetector {
    config: GestureConfig,
    buffer: VecDeque<f64>,
    armed: bool,
}

impl Default for WaveDetector {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl WaveDetector {
    /// Create an armed detector with an empty window
    pub fn new(config: GestureConfig) -> Self {
        Self {
            buffer: VecDeque::with_capacity(config.buffer_size),
            config,
            armed: true,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Number of samples currently in the window
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Window contents, oldest first
    pub fn samples(&self) -> Vec<f64> {
        self.buffer.iter().copied().collect()
    }

    /// Accept observations again, starting from an empty window
    pub fn arm(&mut self) {
        self.armed = true;
        self.buffer.clear();
    }

    /// Ignore observations until [`arm`](Self::arm) is called
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Feed the hands reported by one inference pass.
    ///
    /// Only the first hand is considered; a hand without the tracked landmark
    /// counts as no hand.
    pub fn observe_hands(&mut self, hands: &[HandLandmarks]) -> Option<WaveDetected> {
        let sample = hands
            .first()
            .and_then(|hand| hand.point(self.config.landmark_index))
            .map(|point| point.x);
        self.observe(sample)
    }

    /// Feed one observation: `None` when no hand is visible
    pub fn observe(&mut self, sample: Option<f64>) -> Option<WaveDetected> {
        if !self.armed {
            return None;
        }

        let Some(x) = sample else {
            if !self.buffer.is_empty() {
                trace!(discarded = self.buffer.len(), "Hand lost, clearing wave window");
            }
            self.buffer.clear();
            return None;
        };

        self.buffer.push_back(x);
        while self.buffer.len() > self.config.buffer_size {
            self.buffer.pop_front();
        }
        if self.buffer.len() < self.config.buffer_size {
            return None;
        }

        let samples = self.buffer.make_contiguous();
        let reversals = count_reversals(samples, self.config.noise_floor);
        let swing = swing(samples);

        if reversals >= self.config.min_reversals && swing >= self.config.sweep_threshold {
            debug!(reversals, swing, "Wave detected");
            self.buffer.clear();
            self.armed = false;
            return Some(WaveDetected { reversals, swing });
        }

        None
    }
}
