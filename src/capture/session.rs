//! Capture session state machine.
//!
//! One session is one camera run: Idle → Starting → Active → Paused →
//! Stopped. A dedicated worker thread owns the video source and the frame
//! surface, ticks on a fixed interval, and pipes frames through OCR → the
//! recognition filter → the normalizer → the lookup index. Overlapping
//! ticks are skipped while a capture is in flight (busy-skip, no queueing),
//! and a resolved result pauses the loop until the user clears it.
//!
//! Sessions are identified by a generation token. Events are tagged with it
//! and the manager discards events from stale generations, so an OCR call
//! that outlives its session can never touch current state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use image::RgbaImage;

use crate::capture::device::{CameraDevice, CameraProvider, VideoSource};
use crate::dataset::{LookupIndex, ScanResult};
use crate::error::CameraError;
use crate::normalize::normalize;
use crate::ocr::engine::TextRecognizer;
use crate::ocr::filter::RecognitionFilter;
use crate::ocr::preprocess::prepare_frame;

/// How often the worker checks its flags between interval ticks.
const POLL_STEP: Duration = Duration::from_millis(25);

/// How often stream readiness is re-checked while starting.
const READY_POLL_STEP: Duration = Duration::from_millis(100);

/// Capture session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No session, or the last one failed back here.
    Idle,
    /// Acquiring the stream, waiting for usable dimensions.
    Starting,
    /// Ticking and capturing.
    Active,
    /// A result is displayed; the interval timer is suspended.
    Paused,
    /// Explicitly closed.
    Stopped,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "Idle"),
            CaptureState::Starting => write!(f, "Starting"),
            CaptureState::Active => write!(f, "Active"),
            CaptureState::Paused => write!(f, "Paused"),
            CaptureState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Timing and preprocessing knobs for capture sessions.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Interval between capture ticks.
    pub interval: Duration,
    /// Maximum wait for the stream to report usable dimensions.
    pub ready_timeout: Duration,
    /// Delay before re-opening after a device switch.
    pub settle_delay: Duration,
    /// Optional binarization threshold for OCR preprocessing.
    pub ocr_threshold: Option<u8>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            ready_timeout: Duration::from_secs(10),
            settle_delay: Duration::from_millis(500),
            ocr_threshold: None,
        }
    }
}

impl CaptureConfig {
    pub fn from_app(config: &crate::config::AppConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.capture_interval_ms),
            ready_timeout: Duration::from_millis(config.stream_timeout_ms),
            settle_delay: Duration::from_millis(config.device_settle_ms),
            ocr_threshold: config.ocr_threshold,
        }
    }
}

/// Events emitted by a capture worker.
#[derive(Debug)]
pub enum SessionEvent {
    /// Stream is ready and ticking has begun.
    Ready { width: u32, height: u32 },
    /// The filter extracted a candidate from a frame.
    Candidate { code: String },
    /// Same candidate as the last accepted one; nothing acted on.
    DuplicateIgnored { code: String },
    /// Candidate survived the filter but resolved to no known location.
    Miss { code: String },
    /// Candidate resolved; the loop paused itself.
    Resolved(ScanResult),
    /// One frame's recognition failed; the loop continues.
    OcrFailed(String),
    /// The session ended with a camera error and is restartable.
    Camera(CameraError),
    /// The worker exited after an explicit stop.
    Stopped,
}

/// State shared between a session handle and its worker thread.
struct SessionShared {
    stop: AtomicBool,
    paused: AtomicBool,
    busy: AtomicBool,
    capture_requested: AtomicBool,
    state: Mutex<CaptureState>,
    last_accepted: Mutex<Option<String>>,
}

impl SessionShared {
    fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            busy: AtomicBool::new(false),
            capture_requested: AtomicBool::new(false),
            state: Mutex::new(CaptureState::Idle),
            last_accepted: Mutex::new(None),
        }
    }

    fn set_state(&self, state: CaptureState) {
        if let Ok(mut s) = self.state.lock() {
            *s = state;
        }
    }

    fn state(&self) -> CaptureState {
        self.state.lock().map(|s| *s).unwrap_or(CaptureState::Idle)
    }
}

/// Handle for one camera run. Dropping it requests a stop; the worker exits
/// on its next flag check.
pub struct CaptureSession {
    generation: u64,
    device_id: Option<String>,
    shared: Arc<SessionShared>,
    _handle: JoinHandle<()>,
}

impl CaptureSession {
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn state(&self) -> CaptureState {
        self.shared.state()
    }

    /// Requests a single-shot capture. Permitted only while Active with no
    /// capture in flight and no result displayed; otherwise a no-op
    /// returning false.
    pub fn capture_now(&self) -> bool {
        if self.state() != CaptureState::Active
            || self.shared.busy.load(Ordering::SeqCst)
            || self.shared.paused.load(Ordering::SeqCst)
        {
            return false;
        }
        self.shared.capture_requested.store(true, Ordering::SeqCst);
        true
    }

    /// Clears the displayed result and resumes ticking. Also forgets the
    /// last accepted candidate so the same label can be scanned again.
    pub fn clear_result(&self) {
        if let Ok(mut last) = self.shared.last_accepted.lock() {
            *last = None;
        }
        self.shared.paused.store(false, Ordering::SeqCst);
        if self.shared.state() == CaptureState::Paused {
            self.shared.set_state(CaptureState::Active);
        }
    }

    /// Requests the worker to stop. Idempotent and safe with an OCR call in
    /// flight: its eventual result is discarded by the generation guard.
    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::SeqCst);
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Everything a worker needs for one session run.
struct Worker {
    generation: u64,
    device_id: Option<String>,
    provider: Arc<dyn CameraProvider>,
    recognizer: Arc<Mutex<Box<dyn TextRecognizer>>>,
    index: Arc<LookupIndex>,
    filter: RecognitionFilter,
    config: CaptureConfig,
    settle: Duration,
    shared: Arc<SessionShared>,
    events: Sender<(u64, SessionEvent)>,
}

impl Worker {
    fn send(&self, event: SessionEvent) {
        let _ = self.events.send((self.generation, event));
    }

    fn stopped(&self) -> bool {
        self.shared.stop.load(Ordering::SeqCst)
    }

    fn run(mut self) {
        // Settle delay after a device switch, so the previous hardware
        // handle can release before we grab the new one.
        if !self.settle.is_zero() && self.sleep_interruptible(self.settle) {
            self.finish_stopped(None);
            return;
        }

        self.shared.set_state(CaptureState::Starting);

        let mut source = match self.provider.open(self.device_id.as_deref()) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("session {}: camera open failed: {e}", self.generation);
                self.shared.set_state(CaptureState::Idle);
                self.send(SessionEvent::Camera(e));
                return;
            }
        };

        let Some((width, height)) = self.wait_for_ready(source.as_mut()) else {
            return;
        };

        tracing::info!(
            "session {}: stream ready at {width}x{height}, ticking every {:?}",
            self.generation,
            self.config.interval
        );
        self.shared.set_state(CaptureState::Active);
        self.send(SessionEvent::Ready { width, height });

        // The frame surface is reused across ticks; grab_into reallocates
        // it only when the stream dimensions change.
        let mut surface = RgbaImage::new(width, height);
        let mut next_tick = Instant::now() + self.config.interval;

        while !self.stopped() {
            let manual = self.shared.capture_requested.swap(false, Ordering::SeqCst);
            let due = Instant::now() >= next_tick;
            if !due && !manual {
                thread::sleep(POLL_STEP);
                continue;
            }
            if due {
                next_tick = Instant::now() + self.config.interval;
            }

            // Result displayed: the timer is suspended, nothing is captured.
            if self.shared.paused.load(Ordering::SeqCst) {
                continue;
            }
            // Capture already in flight: skip this tick, never queue.
            if self.shared.busy.swap(true, Ordering::SeqCst) {
                continue;
            }
            self.process_tick(source.as_mut(), &mut surface);
            self.shared.busy.store(false, Ordering::SeqCst);
        }

        self.finish_stopped(Some(source.as_mut()));
    }

    /// Sleeps in short steps; returns true if a stop arrived meanwhile.
    fn sleep_interruptible(&self, total: Duration) -> bool {
        let deadline = Instant::now() + total;
        loop {
            if self.stopped() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return self.stopped();
            }
            thread::sleep(POLL_STEP.min(remaining));
        }
    }

    /// Waits for the stream to report usable dimensions, bounded by the
    /// readiness timeout. None means the session already ended.
    fn wait_for_ready(&self, source: &mut dyn VideoSource) -> Option<(u32, u32)> {
        let deadline = Instant::now() + self.config.ready_timeout;
        loop {
            if self.stopped() {
                source.release();
                self.finish_stopped(None);
                return None;
            }
            if let Some(dims) = source.dimensions() {
                return Some(dims);
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    "session {}: stream not ready within {:?}",
                    self.generation,
                    self.config.ready_timeout
                );
                source.release();
                self.shared.set_state(CaptureState::Idle);
                self.send(SessionEvent::Camera(CameraError::StreamTimeout(
                    self.config.ready_timeout,
                )));
                return None;
            }
            thread::sleep(READY_POLL_STEP);
        }
    }

    fn finish_stopped(&self, source: Option<&mut dyn VideoSource>) {
        if let Some(source) = source {
            source.release();
        }
        self.shared.set_state(CaptureState::Stopped);
        self.send(SessionEvent::Stopped);
    }

    /// One capture: frame → OCR → filter → de-dup → normalize → lookup.
    fn process_tick(&mut self, source: &mut dyn VideoSource, surface: &mut RgbaImage) {
        if let Err(e) = source.grab_into(surface) {
            tracing::debug!("session {}: {e}", self.generation);
            self.send(SessionEvent::OcrFailed(e.to_string()));
            return;
        }

        let prepared = prepare_frame(surface, self.config.ocr_threshold);
        let recognized = match self.recognizer.lock() {
            Ok(mut recognizer) => recognizer.recognize(&prepared),
            Err(_) => return,
        };
        // The session may have stopped while OCR was running; its result
        // must not feed the pipeline anymore.
        if self.stopped() {
            return;
        }
        let text = match recognized {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("session {}: OCR failed: {e}", self.generation);
                self.send(SessionEvent::OcrFailed(e.to_string()));
                return;
            }
        };

        // Frames without anything location-shaped are discarded silently.
        let Some(code) = self.filter.extract(&text) else {
            return;
        };
        self.send(SessionEvent::Candidate { code: code.clone() });

        // De-duplicate against the last accepted candidate for this session.
        if let Ok(mut last) = self.shared.last_accepted.lock() {
            if last.as_deref() == Some(code.as_str()) {
                tracing::debug!("session {}: repeated detection {code}", self.generation);
                self.send(SessionEvent::DuplicateIgnored { code });
                return;
            }
            *last = Some(code.clone());
        }

        let resolved = normalize(&code)
            .ok()
            .and_then(|codes| codes.first().and_then(|c| self.index.find(c)));

        match resolved {
            Some(result) => {
                tracing::info!(
                    "session {}: resolved {code} -> {}",
                    self.generation,
                    result.location
                );
                self.shared.paused.store(true, Ordering::SeqCst);
                self.shared.set_state(CaptureState::Paused);
                self.send(SessionEvent::Resolved(result));
            }
            None => self.send(SessionEvent::Miss { code }),
        }
    }
}

/// Owns the current capture session and the event channel, and filters
/// events by generation so stale completions never reach the UI.
pub struct CaptureManager {
    provider: Arc<dyn CameraProvider>,
    recognizer: Arc<Mutex<Box<dyn TextRecognizer>>>,
    index: Arc<LookupIndex>,
    config: CaptureConfig,
    events_tx: Sender<(u64, SessionEvent)>,
    events_rx: Receiver<(u64, SessionEvent)>,
    next_generation: u64,
    session: Option<CaptureSession>,
}

impl CaptureManager {
    pub fn new(
        provider: Arc<dyn CameraProvider>,
        recognizer: Box<dyn TextRecognizer>,
        index: Arc<LookupIndex>,
        config: CaptureConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            provider,
            recognizer: Arc::new(Mutex::new(recognizer)),
            index,
            config,
            events_tx,
            events_rx,
            next_generation: 0,
            session: None,
        }
    }

    pub fn devices(&self) -> Result<Vec<CameraDevice>, CameraError> {
        self.provider.enumerate()
    }

    /// Starts a new session for the given device (or the provider default).
    /// Any previous session is stopped first.
    pub fn start(&mut self, device_id: Option<String>) {
        self.start_with_settle(device_id, Duration::ZERO);
    }

    fn start_with_settle(&mut self, device_id: Option<String>, settle: Duration) {
        self.stop();

        self.next_generation += 1;
        let generation = self.next_generation;
        let shared = Arc::new(SessionShared::new());

        let worker = Worker {
            generation,
            device_id: device_id.clone(),
            provider: Arc::clone(&self.provider),
            recognizer: Arc::clone(&self.recognizer),
            index: Arc::clone(&self.index),
            filter: RecognitionFilter::new(),
            config: self.config.clone(),
            settle,
            shared: Arc::clone(&shared),
            events: self.events_tx.clone(),
        };

        let handle = thread::spawn(move || worker.run());

        self.session = Some(CaptureSession {
            generation,
            device_id,
            shared,
            _handle: handle,
        });
    }

    /// Stops the current session, releasing the stream. Idempotent.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!("stopping capture session {}", session.generation);
            session.stop();
        }
    }

    /// Stops the current session and re-enters Starting with the new device
    /// after a short settle delay.
    pub fn switch_device(&mut self, device_id: String) {
        let settle = self.config.settle_delay;
        self.start_with_settle(Some(device_id), settle);
    }

    pub fn capture_now(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.capture_now())
    }

    pub fn clear_result(&self) {
        if let Some(session) = &self.session {
            session.clear_result();
        }
    }

    pub fn state(&self) -> CaptureState {
        self.session
            .as_ref()
            .map(|s| s.state())
            .unwrap_or(CaptureState::Idle)
    }

    pub fn session_device(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.device_id())
    }

    /// Drains pending events, discarding any from stale generations.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let current = self.session.as_ref().map(|s| s.generation);
        let mut events = Vec::new();
        while let Ok((generation, event)) = self.events_rx.try_recv() {
            if Some(generation) == current {
                events.push(event);
            } else {
                tracing::debug!("discarding stale event from session {generation}: {event:?}");
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::AreaType;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    const TEST_DATA: &str = r#"[
        { "LOCATION": "B-17.1B", "REFERENCEID": "ref-b17", "TYPE": "STACKING_AREA" }
    ]"#;

    fn test_index() -> Arc<LookupIndex> {
        Arc::new(LookupIndex::from_json(TEST_DATA).unwrap())
    }

    fn fast_config() -> CaptureConfig {
        CaptureConfig {
            interval: Duration::from_millis(20),
            ready_timeout: Duration::from_millis(300),
            settle_delay: Duration::from_millis(10),
            ocr_threshold: None,
        }
    }

    /// Provider whose sources are immediately ready (or never ready).
    struct MockProvider {
        ready: bool,
    }

    impl CameraProvider for MockProvider {
        fn enumerate(&self) -> Result<Vec<CameraDevice>, CameraError> {
            Ok(vec![CameraDevice {
                device_id: "mock".to_string(),
                label: "Mock".to_string(),
            }])
        }

        fn open(&self, _device_id: Option<&str>) -> Result<Box<dyn VideoSource>, CameraError> {
            Ok(Box::new(MockSource { ready: self.ready }))
        }
    }

    struct MockSource {
        ready: bool,
    }

    impl VideoSource for MockSource {
        fn dimensions(&mut self) -> Option<(u32, u32)> {
            self.ready.then_some((8, 8))
        }

        fn grab_into(&mut self, surface: &mut RgbaImage) -> Result<(), CameraError> {
            if surface.dimensions() != (8, 8) {
                *surface = RgbaImage::new(8, 8);
            }
            Ok(())
        }

        fn release(&mut self) {}
    }

    /// Recognizer that replays a script, then repeats its last line.
    struct ScriptRecognizer {
        script: VecDeque<String>,
        last: String,
        calls: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl ScriptRecognizer {
        fn new(script: &[&str], calls: Arc<AtomicUsize>, delay: Duration) -> Box<Self> {
            Box::new(Self {
                script: script.iter().map(|s| s.to_string()).collect(),
                last: script.last().map(|s| s.to_string()).unwrap_or_default(),
                calls,
                delay,
            })
        }
    }

    impl TextRecognizer for ScriptRecognizer {
        fn recognize(&mut self, _img: &image::GrayImage) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            Ok(self.script.pop_front().unwrap_or_else(|| self.last.clone()))
        }
    }

    fn manager_with(
        script: &[&str],
        calls: Arc<AtomicUsize>,
        delay: Duration,
    ) -> CaptureManager {
        CaptureManager::new(
            Arc::new(MockProvider { ready: true }),
            ScriptRecognizer::new(script, calls, delay),
            test_index(),
            fast_config(),
        )
    }

    /// Polls until an event matches, or panics after the timeout.
    fn wait_for(
        manager: &mut CaptureManager,
        timeout: Duration,
        mut pred: impl FnMut(&SessionEvent) -> bool,
    ) -> Vec<SessionEvent> {
        let deadline = Instant::now() + timeout;
        let mut seen = Vec::new();
        while Instant::now() < deadline {
            for event in manager.poll() {
                let hit = pred(&event);
                seen.push(event);
                if hit {
                    return seen;
                }
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("expected event did not arrive; saw {seen:?}");
    }

    fn drain_for(manager: &mut CaptureManager, window: Duration) -> Vec<SessionEvent> {
        let deadline = Instant::now() + window;
        let mut seen = Vec::new();
        while Instant::now() < deadline {
            seen.extend(manager.poll());
            thread::sleep(Duration::from_millis(5));
        }
        seen
    }

    #[test]
    fn test_resolve_pauses_and_stops_invoking_ocr() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = manager_with(&["B-17 1B"], Arc::clone(&calls), Duration::ZERO);
        manager.start(None);

        let events = wait_for(&mut manager, Duration::from_secs(2), |e| {
            matches!(e, SessionEvent::Resolved(_))
        });
        let resolved = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Resolved(_)))
            .count();
        assert_eq!(resolved, 1);
        assert_eq!(manager.state(), CaptureState::Paused);

        // While paused, ticks must not reach the OCR collaborator.
        let before = calls.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(150));
        assert_eq!(calls.load(Ordering::SeqCst), before);

        // Clearing the result resumes ticking (and re-arms de-duplication).
        manager.clear_result();
        wait_for(&mut manager, Duration::from_secs(2), |e| {
            matches!(e, SessionEvent::Resolved(_))
        });
        manager.stop();
    }

    #[test]
    fn test_duplicate_candidates_trigger_one_lookup() {
        // "K-1204" misses the index, so the loop keeps scanning and the
        // second identical detection exercises de-duplication.
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = manager_with(&["K-1204"], calls, Duration::ZERO);
        manager.start(None);

        let events = wait_for(&mut manager, Duration::from_secs(2), |e| {
            matches!(e, SessionEvent::DuplicateIgnored { .. })
        });
        let misses = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Miss { .. }))
            .count();
        assert_eq!(misses, 1, "repeated detections must not re-run the lookup");
        assert_eq!(manager.state(), CaptureState::Active);
        manager.stop();
    }

    #[test]
    fn test_stop_discards_pending_completion() {
        // Recognition takes longer than the session lives: the completion
        // lands after stop and a new session has started, so the manager
        // must discard it.
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = manager_with(&["B-17 1B"], Arc::clone(&calls), Duration::from_millis(200));
        manager.start(None);

        wait_for(&mut manager, Duration::from_secs(2), |e| {
            matches!(e, SessionEvent::Ready { .. })
        });
        // Let the first capture get in flight, then kill the session.
        while calls.load(Ordering::SeqCst) == 0 {
            thread::sleep(Duration::from_millis(5));
        }
        manager.stop();

        // Second session only ever sees garbage text.
        let calls2 = Arc::new(AtomicUsize::new(0));
        let replacement: Box<dyn TextRecognizer> =
            ScriptRecognizer::new(&["NOTHING"], calls2, Duration::ZERO);
        manager.recognizer = Arc::new(Mutex::new(replacement));
        manager.start(None);

        let events = drain_for(&mut manager, Duration::from_millis(600));
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, SessionEvent::Resolved(_) | SessionEvent::Candidate { .. })),
            "stale completion leaked into the new session: {events:?}"
        );
        manager.stop();
    }

    #[test]
    fn test_stream_timeout_reports_camera_error() {
        let mut manager = CaptureManager::new(
            Arc::new(MockProvider { ready: false }),
            ScriptRecognizer::new(&[], Arc::new(AtomicUsize::new(0)), Duration::ZERO),
            test_index(),
            fast_config(),
        );
        manager.start(None);

        wait_for(&mut manager, Duration::from_secs(2), |e| {
            matches!(e, SessionEvent::Camera(CameraError::StreamTimeout(_)))
        });
        assert_eq!(manager.state(), CaptureState::Idle);

        // The failure is recoverable: a retry spawns a fresh session.
        manager.start(None);
        assert_ne!(manager.state(), CaptureState::Stopped);
        manager.stop();
    }

    #[test]
    fn test_capture_now_rejected_while_result_shown() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = manager_with(&["B-17 1B"], calls, Duration::ZERO);
        manager.start(None);
        wait_for(&mut manager, Duration::from_secs(2), |e| {
            matches!(e, SessionEvent::Resolved(_))
        });

        assert!(!manager.capture_now(), "manual capture must be a no-op while paused");
        manager.clear_result();
        manager.stop();
    }

    #[test]
    fn test_stop_is_idempotent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = manager_with(&["NOTHING"], calls, Duration::ZERO);
        manager.start(None);
        manager.stop();
        manager.stop();
        assert_eq!(manager.state(), CaptureState::Idle);
    }

    #[test]
    fn test_switch_device_restarts_with_new_device() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = manager_with(&["NOTHING"], calls, Duration::ZERO);
        manager.start(None);
        wait_for(&mut manager, Duration::from_secs(2), |e| {
            matches!(e, SessionEvent::Ready { .. })
        });

        manager.switch_device("mock".to_string());
        assert_eq!(manager.session_device(), Some("mock"));
        wait_for(&mut manager, Duration::from_secs(2), |e| {
            matches!(e, SessionEvent::Ready { .. })
        });
        manager.stop();
    }

    #[test]
    fn test_resolved_event_carries_lookup_result() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = manager_with(&["AISLE B17 1B"], calls, Duration::ZERO);
        manager.start(None);

        let events = wait_for(&mut manager, Duration::from_secs(2), |e| {
            matches!(e, SessionEvent::Resolved(_))
        });
        let result = events
            .iter()
            .find_map(|e| match e {
                SessionEvent::Resolved(r) => Some(r),
                _ => None,
            })
            .unwrap();
        assert_eq!(result.location, "B-17.1B");
        assert_eq!(result.reference_id, "ref-b17");
        assert_eq!(result.area_type, AreaType::Stacking);
        manager.stop();
    }
}
