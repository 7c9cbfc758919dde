// SPDX-License-Identifier: GPL-3.0-only

//! Capture session
//!
//! [`CaptureSession`] is a pure state machine in the update/effect style: it
//! receives a [`Message`], mutates its state, and returns the [`Effect`]s the
//! caller must carry out (start a timer, grab a frame, emit an event, ...).
//! It never sleeps or spawns on its own, so every transition can be tested
//! synchronously. [`runtime::SessionRuntime`] executes the effects on tokio.
//!
//! ```text
//!        wave / manual (photos < cap)
//!   Idle ───────────────────────────► Countdown(3) ─tick─► Countdown(2) ─tick─► Countdown(1)
//!    ▲                                                                               │ tick
//!    │            capture complete (+1 photo, re-arm)                                ▼
//!    └──────────────────────────────────────────────────────────────────────── Shuttering
//!                                                                        (shutter after 300 ms)
//! ```

pub mod runtime;
pub mod scheduler;
pub mod state;

pub use runtime::{SessionHandle, SessionRuntime, SessionStatus};
pub use state::{CaptureState, CapturedPhoto, PhotoStore};

use crate::backends::landmarks::HandLandmarks;
use crate::constants::{MAX_PHOTOS, messages, timing};
use crate::errors::{BackendError, CaptureError, SessionError};
use crate::gesture::{GestureConfig, WaveDetected, WaveDetector};
use crate::layout::LayoutConfig;
use crate::pipelines::photo::encoding::EncodedImage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timer settings for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTiming {
    pub countdown_seconds: u8,
    #[serde(with = "millis")]
    pub countdown_tick: Duration,
    #[serde(with = "millis")]
    pub shutter_delay: Duration,
    #[serde(with = "millis")]
    pub inference_interval: Duration,
    #[serde(with = "millis")]
    pub readiness_poll: Duration,
    #[serde(with = "millis")]
    pub flash_duration: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            countdown_seconds: timing::COUNTDOWN_SECONDS,
            countdown_tick: timing::COUNTDOWN_TICK,
            shutter_delay: timing::SHUTTER_DELAY,
            inference_interval: timing::INFERENCE_INTERVAL,
            readiness_poll: timing::READINESS_POLL,
            flash_duration: timing::FLASH_DURATION,
        }
    }
}

/// Durations are stored as whole milliseconds in config files
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// What started a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Wave,
    Manual,
}

/// Inputs to the session state machine
#[derive(Debug)]
pub enum Message {
    /// The frame source is ready; `manual` when hand tracking is unavailable
    Started { manual: bool },
    /// The frame source could not be opened
    SourceFailed(BackendError),
    /// Manual capture button
    Trigger(Trigger),
    /// Inference interval fired
    InferenceTick,
    /// Inference was requested but no frame was ready
    InferenceSkipped,
    /// Hand landmark provider finished
    HandsDetected(Result<Vec<HandLandmarks>, BackendError>),
    /// Countdown interval fired
    CountdownTick,
    /// Shutter delay elapsed
    ShutterRelease,
    /// Capture pipeline finished
    CaptureComplete(Result<EncodedImage, CaptureError>),
    /// Leave the capture screen
    Leave,
}

/// Observable session events
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Frames are flowing; gesture detection running unless in manual mode
    Ready,
    /// Camera could not be used; the session is over
    CameraUnavailable(String),
    /// Hand tracking failed to start; only manual triggers work
    ManualModeEnabled(String),
    WaveDetected(WaveDetected),
    CountdownStarted(Trigger),
    /// Number on the countdown overlay (0 when the shutter is about to fire)
    Countdown(u8),
    PhotoCaptured { index: usize, total: usize },
    /// Show the flash overlay for this long
    Flash(Duration),
    /// A capture attempt failed and will be retried
    CaptureRetry(String),
    /// The photo cap was reached; no more countdowns will start
    CapReached(String),
    /// Teardown finished
    Stopped,
}

/// Work requested by the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartInferenceLoop(Duration),
    RunInference,
    StartCountdownTimer(Duration),
    StopCountdownTimer,
    ScheduleShutter(Duration),
    CaptureFrame,
    Emit(SessionEvent),
    /// Cancel every timer and in-flight job, close the provider, stop the source
    Teardown,
}

/// Capture session state machine
#[derive(Debug)]
pub struct CaptureSession {
    layout: LayoutConfig,
    timing: SessionTiming,
    state: CaptureState,
    detector: WaveDetector,
    store: PhotoStore,
    inference_in_flight: bool,
    manual_mode: bool,
    active: bool,
}

impl CaptureSession {
    pub fn new(layout: LayoutConfig, gesture: GestureConfig, timing: SessionTiming) -> Self {
        Self::with_capacity(layout, gesture, timing, MAX_PHOTOS)
    }

    pub fn with_capacity(
        layout: LayoutConfig,
        gesture: GestureConfig,
        timing: SessionTiming,
        capacity: usize,
    ) -> Self {
        Self {
            layout,
            timing,
            state: CaptureState::Idle,
            detector: WaveDetector::new(gesture),
            store: PhotoStore::new(capacity),
            inference_in_flight: false,
            manual_mode: false,
            active: false,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn timing(&self) -> &SessionTiming {
        &self.timing
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn detector(&self) -> &WaveDetector {
        &self.detector
    }

    pub fn store(&self) -> &PhotoStore {
        &self.store
    }

    pub fn photos(&self) -> &[CapturedPhoto] {
        self.store.photos()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_manual_mode(&self) -> bool {
        self.manual_mode
    }

    pub fn inference_in_flight(&self) -> bool {
        self.inference_in_flight
    }

    /// The "done" button: succeeds once at least `count` photos exist
    pub fn finish(&self) -> Result<&[CapturedPhoto], SessionError> {
        let required = self.layout.count() as usize;
        if self.store.len() < required {
            return Err(SessionError::NotEnoughPhotos {
                required,
                taken: self.store.len(),
            });
        }
        Ok(self.store.photos())
    }

    /// Consume the session, keeping its photos
    pub fn into_store(self) -> PhotoStore {
        self.store
    }

    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::Started { manual } => self.handle_started(manual),
            Message::SourceFailed(error) => self.handle_source_failed(error),
            Message::Trigger(trigger) => self.start_countdown(trigger),
            Message::InferenceTick => self.handle_inference_tick(),
            Message::InferenceSkipped => {
                self.inference_in_flight = false;
                Vec::new()
            }
            Message::HandsDetected(result) => self.handle_hands(result),
            Message::CountdownTick => self.handle_countdown_tick(),
            Message::ShutterRelease => self.handle_shutter_release(),
            Message::CaptureComplete(result) => self.handle_capture_complete(result),
            Message::Leave => self.handle_leave(),
        }
    }

    fn handle_started(&mut self, manual: bool) -> Vec<Effect> {
        if self.active {
            return Vec::new();
        }
        self.active = true;
        self.manual_mode = manual;
        info!(manual, count = self.layout.count(), "Capture session started");

        let mut effects = vec![Effect::Emit(SessionEvent::Ready)];
        if manual {
            self.detector.disarm();
            effects.push(Effect::Emit(SessionEvent::ManualModeEnabled(
                messages::MANUAL_MODE.to_string(),
            )));
        } else {
            effects.push(Effect::StartInferenceLoop(self.timing.inference_interval));
        }
        effects
    }

    fn handle_source_failed(&mut self, error: BackendError) -> Vec<Effect> {
        warn!(error = %error, "Frame source unavailable");
        self.active = false;
        let message = match error {
            BackendError::PermissionDenied => messages::CAMERA_DENIED.to_string(),
            other => other.to_string(),
        };
        vec![
            Effect::Emit(SessionEvent::CameraUnavailable(message)),
            Effect::Teardown,
        ]
    }

    /// `Idle → Countdown(n)`, gated on the photo cap
    fn start_countdown(&mut self, trigger: Trigger) -> Vec<Effect> {
        if !self.active {
            return Vec::new();
        }
        if !self.state.is_idle() || self.store.is_full() {
            debug!(?trigger, state = ?self.state, photos = self.store.len(), "Trigger ignored");
            return Vec::new();
        }

        // A wave already disarmed the detector; a manual trigger must too
        self.detector.disarm();
        let remaining = self.timing.countdown_seconds.max(1);
        self.state = CaptureState::Countdown { remaining };
        info!(?trigger, remaining, "Countdown started");

        vec![
            Effect::Emit(SessionEvent::CountdownStarted(trigger)),
            Effect::Emit(SessionEvent::Countdown(remaining)),
            Effect::StartCountdownTimer(self.timing.countdown_tick),
        ]
    }

    fn handle_inference_tick(&mut self) -> Vec<Effect> {
        if !self.active || self.manual_mode || self.inference_in_flight {
            return Vec::new();
        }
        if !self.detector.is_armed() || !self.state.is_idle() || self.store.is_full() {
            return Vec::new();
        }
        self.inference_in_flight = true;
        vec![Effect::RunInference]
    }

    fn handle_hands(&mut self, result: Result<Vec<HandLandmarks>, BackendError>) -> Vec<Effect> {
        self.inference_in_flight = false;
        if !self.active {
            return Vec::new();
        }
        let hands = match result {
            Ok(hands) => hands,
            Err(e) => {
                debug!(error = %e, "Hand inference failed");
                return Vec::new();
            }
        };
        if !self.state.is_idle() || self.store.is_full() {
            return Vec::new();
        }

        match self.detector.observe_hands(&hands) {
            Some(wave) => {
                let mut effects = vec![Effect::Emit(SessionEvent::WaveDetected(wave))];
                effects.extend(self.start_countdown(Trigger::Wave));
                effects
            }
            None => Vec::new(),
        }
    }

    fn handle_countdown_tick(&mut self) -> Vec<Effect> {
        let CaptureState::Countdown { remaining } = self.state else {
            return Vec::new();
        };

        if remaining > 1 {
            let remaining = remaining - 1;
            self.state = CaptureState::Countdown { remaining };
            debug!(remaining, "Countdown tick");
            return vec![Effect::Emit(SessionEvent::Countdown(remaining))];
        }

        self.state = CaptureState::Shuttering;
        debug!("Countdown complete, shutter pending");
        vec![
            Effect::StopCountdownTimer,
            Effect::Emit(SessionEvent::Countdown(0)),
            Effect::ScheduleShutter(self.timing.shutter_delay),
        ]
    }

    fn handle_shutter_release(&mut self) -> Vec<Effect> {
        if self.state != CaptureState::Shuttering || !self.active {
            return Vec::new();
        }
        vec![Effect::CaptureFrame]
    }

    fn handle_capture_complete(&mut self, result: Result<EncodedImage, CaptureError>) -> Vec<Effect> {
        if self.state != CaptureState::Shuttering || !self.active {
            return Vec::new();
        }

        let encoded = match result {
            Ok(encoded) => encoded,
            Err(e) => {
                // Stay in Shuttering: leaving it requires a photo
                warn!(error = %e, "Capture failed, retrying");
                return vec![
                    Effect::Emit(SessionEvent::CaptureRetry(e.to_string())),
                    Effect::ScheduleShutter(self.timing.readiness_poll),
                ];
            }
        };

        let index = match self.store.push(encoded) {
            Ok(photo) => photo.index,
            Err(e) => {
                warn!(error = %e, "Photo dropped");
                self.state = CaptureState::Idle;
                return Vec::new();
            }
        };
        let total = self.store.len();
        self.state = CaptureState::Idle;
        info!(index, total, "Photo captured");

        let mut effects = vec![
            Effect::Emit(SessionEvent::PhotoCaptured { index, total }),
            Effect::Emit(SessionEvent::Flash(self.timing.flash_duration)),
        ];

        if self.store.is_full() {
            self.detector.disarm();
            info!(total, "Photo cap reached");
            effects.push(Effect::Emit(SessionEvent::CapReached(
                messages::cap_reached(self.store.capacity()),
            )));
        } else if !self.manual_mode {
            self.detector.arm();
        }
        effects
    }

    fn handle_leave(&mut self) -> Vec<Effect> {
        if !self.active {
            return vec![Effect::Teardown];
        }
        info!(photos = self.store.len(), "Leaving capture session");
        self.active = false;
        self.state = CaptureState::Idle;
        self.inference_in_flight = false;
        self.detector.disarm();
        vec![Effect::Teardown, Effect::Emit(SessionEvent::Stopped)]
    }
}
