// SPDX-License-Identifier: GPL-3.0-only

//! Async driver for [`CaptureSession`]
//!
//! One tokio task owns the session, the frame source and every scheduled task.
//! It waits for the source to become ready, then loops over an mpsc channel:
//! each [`Message`] is applied to the state machine and the returned
//! [`Effect`]s are executed. Timers and background jobs send their results back
//! through the same channel, so all mutation happens on this one task.
//! After every update a [`SessionStatus`] snapshot is published on a watch
//! channel for callers that need to know whether anything is still running.

use super::scheduler::{ScheduledTask, SessionTasks};
use super::state::CaptureState;
use super::{CaptureSession, Effect, Message, SessionEvent, Trigger};
use crate::backends::{BackendResult, FrameSource, HandLandmarkProvider};
use crate::errors::{BackendError, CaptureError};
use crate::pipelines::photo::capture::PhotoCapture;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};

/// Snapshot of the session taken right after each update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStatus {
    pub active: bool,
    pub state: CaptureState,
    pub inference_in_flight: bool,
    pub photos: usize,
}

impl SessionStatus {
    pub fn of(session: &CaptureSession) -> Self {
        Self {
            active: session.is_active(),
            state: session.state(),
            inference_in_flight: session.inference_in_flight(),
            photos: session.store().len(),
        }
    }

    /// A countdown, shutter or detection is pending
    pub fn is_busy(&self) -> bool {
        !self.state.is_idle() || self.inference_in_flight
    }
}

/// Cloneable control handle for a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: UnboundedSender<Message>,
    status: watch::Receiver<SessionStatus>,
}

impl SessionHandle {
    /// Press the manual capture button
    pub fn trigger(&self) -> bool {
        self.sender.send(Message::Trigger(Trigger::Manual)).is_ok()
    }

    /// Leave the capture screen
    pub fn leave(&self) -> bool {
        self.sender.send(Message::Leave).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Latest published status
    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }
}

/// Owns a capture session and executes its effects
pub struct SessionRuntime {
    session: CaptureSession,
    capture: PhotoCapture,
    provider: BackendResult<Arc<dyn HandLandmarkProvider>>,
    sender: UnboundedSender<Message>,
    receiver: UnboundedReceiver<Message>,
    events: UnboundedSender<SessionEvent>,
    status: watch::Sender<SessionStatus>,
    tasks: SessionTasks,
}

impl SessionRuntime {
    /// Create a runtime and the receiving end of its event stream.
    ///
    /// A provider error switches the session to manual triggering.
    pub fn new(
        session: CaptureSession,
        capture: PhotoCapture,
        provider: BackendResult<Arc<dyn HandLandmarkProvider>>,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (events, event_rx) = mpsc::unbounded_channel();
        let (status, _) = watch::channel(SessionStatus::of(&session));
        let runtime = Self {
            session,
            capture,
            provider,
            sender,
            receiver,
            events,
            status,
            tasks: SessionTasks::default(),
        };
        (runtime, event_rx)
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            sender: self.sender.clone(),
            status: self.status.subscribe(),
        }
    }

    /// Spawn [`run`](Self::run) inside a `session` span with a fresh id
    pub fn spawn(
        self,
        source: BackendResult<Box<dyn FrameSource>>,
    ) -> (SessionHandle, JoinHandle<CaptureSession>) {
        let handle = self.handle();
        let id = uuid::Uuid::new_v4();
        let span = info_span!("session", id = %id);
        let task = tokio::spawn(self.run(source).instrument(span));
        (handle, task)
    }

    /// Run until the session is left (or the source fails to open) and return it
    pub async fn run(mut self, source: BackendResult<Box<dyn FrameSource>>) -> CaptureSession {
        let mut source = match source {
            Ok(source) => source,
            Err(e) => {
                let effects = self.apply(Message::SourceFailed(e));
                self.execute_without_source(effects);
                return self.session;
            }
        };

        if !self.wait_until_ready(source.as_mut()).await {
            let effects = self.apply(Message::Leave);
            self.execute_all(effects, source.as_mut());
            return self.session;
        }

        let manual = match &self.provider {
            Ok(_) => false,
            Err(e) => {
                warn!(error = %e, "Hand tracking unavailable, switching to manual mode");
                true
            }
        };
        let effects = self.apply(Message::Started { manual });
        if self.execute_all(effects, source.as_mut()) {
            return self.session;
        }

        while let Some(message) = self.receiver.recv().await {
            let effects = self.apply(message);
            if self.execute_all(effects, source.as_mut()) {
                break;
            }
        }

        self.session
    }

    /// Update the state machine and publish the new status before any effect runs
    fn apply(&mut self, message: Message) -> Vec<Effect> {
        let effects = self.session.update(message);
        self.status.send_replace(SessionStatus::of(&self.session));
        effects
    }

    /// Poll the source until it reports dimensions; `false` if asked to leave first
    async fn wait_until_ready(&mut self, source: &mut dyn FrameSource) -> bool {
        let poll = self.session.timing().readiness_poll;
        loop {
            if let Some((width, height)) = source.dimensions() {
                info!(width, height, "Frame source ready");
                return true;
            }
            tokio::select! {
                _ = tokio::time::sleep(poll) => {}
                message = self.receiver.recv() => match message {
                    Some(Message::Leave) | None => return false,
                    Some(other) => debug!(?other, "Ignoring message before start-up"),
                },
            }
        }
    }

    /// Execute effects in order; returns `true` once teardown ran
    fn execute_all(&mut self, effects: Vec<Effect>, source: &mut dyn FrameSource) -> bool {
        let mut torn_down = false;
        for effect in effects {
            torn_down |= self.execute(effect, source);
        }
        torn_down
    }

    fn execute_without_source(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Emit(event) => self.emit(event),
                Effect::Teardown => self.teardown(None),
                other => debug!(?other, "Effect skipped, no frame source"),
            }
        }
    }

    fn execute(&mut self, effect: Effect, source: &mut dyn FrameSource) -> bool {
        match effect {
            Effect::StartInferenceLoop(period) => {
                self.tasks.inference_loop = Some(ScheduledTask::interval(
                    "inference-loop",
                    period,
                    self.sender.clone(),
                    || Message::InferenceTick,
                ));
            }
            Effect::RunInference => self.run_inference(source),
            Effect::StartCountdownTimer(period) => {
                self.tasks.countdown = Some(ScheduledTask::interval(
                    "countdown",
                    period,
                    self.sender.clone(),
                    || Message::CountdownTick,
                ));
            }
            Effect::StopCountdownTimer => {
                if let Some(task) = self.tasks.countdown.take() {
                    task.cancel();
                }
            }
            Effect::ScheduleShutter(delay) => {
                self.tasks.shutter = Some(ScheduledTask::delay(
                    "shutter",
                    delay,
                    self.sender.clone(),
                    Message::ShutterRelease,
                ));
            }
            Effect::CaptureFrame => self.capture_frame(source),
            Effect::Emit(event) => self.emit(event),
            Effect::Teardown => {
                self.teardown(Some(source));
                return true;
            }
        }
        false
    }

    fn run_inference(&mut self, source: &mut dyn FrameSource) {
        let Ok(provider) = &self.provider else {
            let _ = self.sender.send(Message::InferenceSkipped);
            return;
        };
        let Some(frame) = source.current_frame() else {
            let _ = self.sender.send(Message::InferenceSkipped);
            return;
        };

        let detection = provider.detect(frame);
        let sender = self.sender.clone();
        self.tasks.inference_job = Some(ScheduledTask::spawn("inference", async move {
            let result = detection.await;
            let _ = sender.send(Message::HandsDetected(result));
        }));
    }

    fn capture_frame(&mut self, source: &mut dyn FrameSource) {
        let frame = match PhotoCapture::grab(source) {
            Ok(frame) => frame,
            Err(e) => {
                let _ = self.sender.send(Message::CaptureComplete(Err(e)));
                return;
            }
        };

        let capture = self.capture.clone();
        let sender = self.sender.clone();
        self.tasks.capture_job = Some(ScheduledTask::spawn("capture", async move {
            let result: Result<_, CaptureError> = capture.process(frame).await;
            let _ = sender.send(Message::CaptureComplete(result));
        }));
    }

    fn emit(&self, event: SessionEvent) {
        debug!(?event, "Session event");
        let _ = self.events.send(event);
    }

    /// Cancel all timers and jobs, close the provider, stop the source
    fn teardown(&mut self, source: Option<&mut dyn FrameSource>) {
        self.tasks.cancel_all();
        if let Ok(provider) = &self.provider {
            provider.close();
        }
        if let Some(source) = source {
            source.stop();
        }
        info!("Capture session torn down");
    }
}

impl std::fmt::Debug for SessionRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRuntime")
            .field("session", &self.session)
            .field("manual", &self.provider.is_err())
            .field("tasks", &self.tasks)
            .finish()
    }
}

/// Provider that always fails to initialize, for callers that run without hand tracking
pub fn no_provider(reason: impl Into<String>) -> BackendResult<Arc<dyn HandLandmarkProvider>> {
    Err(BackendError::LandmarkInit(reason.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{Frame, HandLandmarks, ScriptedLandmarkProvider, StillFrameSource};
    use futures::future::BoxFuture;
    use crate::gesture::GestureConfig;
    use crate::layout::{LayoutConfig, Orientation, slot_dims};
    use crate::pipelines::photo::encoding::PhotoEncoder;
    use crate::session::SessionTiming;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts detections that never resolve
    #[derive(Default)]
    struct StallingProvider {
        calls: AtomicUsize,
    }

    impl HandLandmarkProvider for StallingProvider {
        fn detect(
            &self,
            _frame: Arc<Frame>,
        ) -> BoxFuture<'static, BackendResult<Vec<HandLandmarks>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(futures::future::pending())
        }
    }

    /// Reports no dimensions for the first `warmup` polls
    struct WarmingSource {
        inner: StillFrameSource,
        warmup: Cell<usize>,
    }

    impl FrameSource for WarmingSource {
        fn current_frame(&mut self) -> Option<Arc<Frame>> {
            if self.warmup.get() > 0 {
                return None;
            }
            self.inner.current_frame()
        }

        fn stop(&mut self) {
            self.inner.stop();
        }

        fn is_stopped(&self) -> bool {
            self.inner.is_stopped()
        }

        fn dimensions(&self) -> Option<(u32, u32)> {
            let warmup = self.warmup.get();
            if warmup > 0 {
                self.warmup.set(warmup - 1);
                return None;
            }
            self.inner.dimensions()
        }
    }

    fn runtime(
        provider: BackendResult<Arc<dyn HandLandmarkProvider>>,
    ) -> (SessionRuntime, UnboundedReceiver<SessionEvent>) {
        let layout = LayoutConfig::new(2, Orientation::Portrait).unwrap();
        let session =
            CaptureSession::new(layout, GestureConfig::default(), SessionTiming::default());
        let capture = PhotoCapture::new(slot_dims(2, Orientation::Portrait, 32), PhotoEncoder::new());
        SessionRuntime::new(session, capture, provider)
    }

    fn still_source() -> BackendResult<Box<dyn FrameSource>> {
        Ok(Box::new(StillFrameSource::new(Frame::solid(64, 48, [200, 30, 30, 255]))))
    }

    async fn next_photo(events: &mut UnboundedReceiver<SessionEvent>) -> usize {
        loop {
            match events.recv().await {
                Some(SessionEvent::PhotoCaptured { total, .. }) => return total,
                Some(_) => continue,
                None => panic!("event stream closed"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_permission_denied_ends_session() {
        let (runtime, mut events) = runtime(no_provider("none"));
        let session = runtime.run(Err(BackendError::PermissionDenied)).await;
        assert!(!session.is_active());
        assert_eq!(
            events.recv().await,
            Some(SessionEvent::CameraUnavailable(
                "Camera access denied. Please allow camera access and reload.".into()
            ))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_capture_cycle() {
        let (runtime, mut events) = runtime(no_provider("model missing"));
        let (handle, task) = runtime.spawn(still_source());

        assert_eq!(events.recv().await, Some(SessionEvent::Ready));
        assert!(matches!(
            events.recv().await,
            Some(SessionEvent::ManualModeEnabled(_))
        ));

        let started = tokio::time::Instant::now();
        assert!(handle.trigger());
        assert_eq!(next_photo(&mut events).await, 1);
        assert!(started.elapsed() >= Duration::from_millis(3300));

        handle.leave();
        let session = task.await.unwrap();
        assert_eq!(session.store().len(), 1);
        let photo = &session.photos()[0];
        assert_eq!(
            (photo.pixels.width, photo.pixels.height),
            (32, slot_dims(2, Orientation::Portrait, 32).height)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wave_trace_triggers_capture() {
        let trace = [0.40, 0.42, 0.41, 0.30, 0.20, 0.10, 0.09, 0.20, 0.30, 0.40, 0.41, 0.42]
            .into_iter()
            .map(Some);
        let provider: Arc<dyn HandLandmarkProvider> = Arc::new(ScriptedLandmarkProvider::new(trace));
        let (runtime, mut events) = runtime(Ok(provider));
        let (handle, task) = runtime.spawn(still_source());

        loop {
            match events.recv().await {
                Some(SessionEvent::WaveDetected(wave)) => {
                    assert!(wave.reversals >= 2);
                    break;
                }
                Some(_) => continue,
                None => panic!("event stream closed"),
            }
        }
        assert_eq!(next_photo(&mut events).await, 1);

        handle.leave();
        let session = task.await.unwrap();
        assert_eq!(session.store().len(), 1);
        assert!(!session.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_busy_while_detection_pending() {
        let provider = Arc::new(StallingProvider::default());
        let (runtime, mut events) = runtime(Ok(provider.clone() as Arc<dyn HandLandmarkProvider>));
        let (handle, task) = runtime.spawn(still_source());
        assert_eq!(events.recv().await, Some(SessionEvent::Ready));

        while provider.calls.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let status = handle.status();
        assert!(status.state.is_idle());
        assert!(status.inference_in_flight);
        assert!(status.is_busy());

        handle.leave();
        task.await.unwrap();
        assert!(!handle.status().active);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_busy_during_countdown() {
        let (runtime, mut events) = runtime(no_provider("none"));
        let (handle, task) = runtime.spawn(still_source());
        assert_eq!(events.recv().await, Some(SessionEvent::Ready));
        assert!(!handle.status().is_busy());

        handle.trigger();
        loop {
            if let Some(SessionEvent::CountdownStarted(_)) = events.recv().await {
                break;
            }
        }
        assert!(handle.status().is_busy());

        assert_eq!(next_photo(&mut events).await, 1);
        let status = handle.status();
        assert!(!status.is_busy());
        assert_eq!(status.photos, 1);

        handle.leave();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_ready_source() {
        let source: Box<dyn FrameSource> = Box::new(WarmingSource {
            inner: StillFrameSource::new(Frame::solid(8, 8, [0, 0, 0, 255])),
            warmup: Cell::new(4),
        });
        let (runtime, mut events) = runtime(no_provider("none"));
        let started = tokio::time::Instant::now();
        let (handle, task) = runtime.spawn(Ok(source));

        assert_eq!(events.recv().await, Some(SessionEvent::Ready));
        assert!(started.elapsed() >= Duration::from_millis(200));

        handle.leave();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_leave_during_countdown_cancels_timers() {
        let (runtime, mut events) = runtime(no_provider("none"));
        let (handle, task) = runtime.spawn(still_source());
        assert_eq!(events.recv().await, Some(SessionEvent::Ready));

        handle.trigger();
        loop {
            if let Some(SessionEvent::Countdown(2)) = events.recv().await {
                break;
            }
        }
        handle.leave();
        let session = task.await.unwrap();
        assert!(session.store().is_empty());
        assert!(session.state().is_idle());

        tokio::time::sleep(Duration::from_secs(10)).await;
        let mut rest = Vec::new();
        while let Ok(event) = events.try_recv() {
            rest.push(event);
        }
        assert_eq!(rest, vec![SessionEvent::Stopped]);
        assert!(handle.is_closed());
    }
}
