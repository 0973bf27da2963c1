//! Scripted collaborators for driving a [`Monitor`](vigil_runtime::Monitor)
//!
//! Each mock hands out a shared call counter so tests can observe calls after the
//! mock itself has moved into the monitor.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use vigil_core::{
    DetectorOptions, DetectorResult, LandmarkSet, SampleTelemetry, SessionReport, VigilError,
    VigilResult,
};
use vigil_runtime::{Camera, Detector, FrameStream, Reporter};

/// What the camera currently sees, interpreted by [`ScriptedDetector`]
#[derive(Debug, Clone, PartialEq)]
pub enum MockFrame {
    Face(LandmarkSet),
    NoFace,
    /// Inference returns an error
    Fail,
    /// Inference never completes
    Stall,
}

// ============================================================================
// Detector
// ============================================================================

/// Call counters of a [`ScriptedDetector`]
#[derive(Debug, Default)]
pub struct DetectorCalls {
    configured: AtomicUsize,
    inferred: AtomicUsize,
    released: AtomicUsize,
}

impl DetectorCalls {
    pub fn configured(&self) -> usize {
        self.configured.load(Ordering::SeqCst)
    }

    pub fn inferred(&self) -> usize {
        self.inferred.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct ScriptedDetector {
    calls: Arc<DetectorCalls>,
    fail_configure: bool,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model loading always fails
    pub fn failing_configure() -> Self {
        ScriptedDetector {
            fail_configure: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Arc<DetectorCalls> {
        Arc::clone(&self.calls)
    }
}

impl Detector<MockFrame> for ScriptedDetector {
    async fn configure(&self, _options: &DetectorOptions) -> VigilResult<()> {
        self.calls.configured.fetch_add(1, Ordering::SeqCst);
        if self.fail_configure {
            return Err(VigilError::ModelLoadFailed("scripted model failure".into()));
        }
        Ok(())
    }

    async fn infer(&self, frame: &MockFrame) -> VigilResult<DetectorResult> {
        self.calls.inferred.fetch_add(1, Ordering::SeqCst);
        match frame {
            MockFrame::Face(lm) => Ok(DetectorResult::single(lm.clone())),
            MockFrame::NoFace => Ok(DetectorResult::empty()),
            MockFrame::Fail => Err(VigilError::InferenceFailed("scripted inference failure".into())),
            MockFrame::Stall => std::future::pending().await,
        }
    }

    fn release(&self) {
        self.calls.released.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Camera
// ============================================================================

#[derive(Debug)]
struct SceneState {
    frame: MockFrame,
    ended: bool,
}

/// Shared view of what the camera sees. Cloning shares the scene.
#[derive(Debug, Clone)]
pub struct Scene {
    state: Arc<Mutex<SceneState>>,
}

impl Scene {
    pub fn new(frame: MockFrame) -> Self {
        Scene {
            state: Arc::new(Mutex::new(SceneState { frame, ended: false })),
        }
    }

    pub fn set(&self, frame: MockFrame) {
        self.state.lock().frame = frame;
    }

    /// End every open stream
    pub fn end(&self) {
        self.state.lock().ended = true;
    }

    fn current(&self) -> Option<MockFrame> {
        let state = self.state.lock();
        (!state.ended).then(|| state.frame.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Ready,
    PermissionDenied,
    Unavailable,
}

/// Open/close counters of a [`ScriptedCamera`]
#[derive(Debug, Default)]
pub struct CameraCalls {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl CameraCalls {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Streams currently held open
    pub fn open_streams(&self) -> usize {
        self.opened() - self.closed()
    }
}

pub struct ScriptedCamera {
    scene: Scene,
    mode: CameraMode,
    frame_interval: Duration,
    calls: Arc<CameraCalls>,
}

impl ScriptedCamera {
    /// 10 frames per second of `scene`
    pub fn new(scene: Scene) -> Self {
        ScriptedCamera {
            scene,
            mode: CameraMode::Ready,
            frame_interval: Duration::from_millis(100),
            calls: Arc::default(),
        }
    }

    pub fn with_mode(mut self, mode: CameraMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn calls(&self) -> Arc<CameraCalls> {
        Arc::clone(&self.calls)
    }
}

impl Camera for ScriptedCamera {
    type Stream = ScriptedStream;

    async fn open(&self) -> VigilResult<ScriptedStream> {
        match self.mode {
            CameraMode::PermissionDenied => Err(VigilError::CameraPermissionDenied),
            CameraMode::Unavailable => Err(VigilError::CameraUnavailable("no capture device".into())),
            CameraMode::Ready => {
                self.calls.opened.fetch_add(1, Ordering::SeqCst);
                Ok(ScriptedStream {
                    scene: self.scene.clone(),
                    frame_interval: self.frame_interval,
                    calls: Arc::clone(&self.calls),
                })
            }
        }
    }
}

pub struct ScriptedStream {
    scene: Scene,
    frame_interval: Duration,
    calls: Arc<CameraCalls>,
}

impl FrameStream for ScriptedStream {
    type Frame = MockFrame;

    async fn next_frame(&mut self) -> Option<MockFrame> {
        tokio::time::sleep(self.frame_interval).await;
        self.scene.current()
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.calls.closed.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Reporter
// ============================================================================

/// Everything a [`RecordingReporter`] was asked to send
#[derive(Debug, Default, Clone)]
pub struct ReportLog {
    pub started: usize,
    pub sample_attempts: usize,
    pub samples: Vec<SampleTelemetry>,
    pub summary_attempts: usize,
    pub summaries: Vec<SessionReport>,
}

#[derive(Debug, Clone)]
pub struct RecordingReporter {
    log: Arc<Mutex<ReportLog>>,
    authenticated: bool,
    fail_samples: bool,
    hang_samples: bool,
    fail_summary: bool,
    pending_samples: Arc<AtomicUsize>,
}

/// Counts a call for as long as its future is alive
struct PendingCall(Arc<AtomicUsize>);

impl PendingCall {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        PendingCall(Arc::clone(counter))
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for RecordingReporter {
    fn default() -> Self {
        RecordingReporter {
            log: Arc::default(),
            authenticated: true,
            fail_samples: false,
            hang_samples: false,
            fail_summary: false,
            pending_samples: Arc::default(),
        }
    }
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caller without a login
    pub fn anonymous() -> Self {
        RecordingReporter {
            authenticated: false,
            ..Self::default()
        }
    }

    pub fn failing_samples(mut self) -> Self {
        self.fail_samples = true;
        self
    }

    /// Telemetry calls that never resolve
    pub fn hanging_samples(mut self) -> Self {
        self.hang_samples = true;
        self
    }

    pub fn failing_summary(mut self) -> Self {
        self.fail_summary = true;
        self
    }

    /// Copy of the log so far
    pub fn log(&self) -> ReportLog {
        self.log.lock().clone()
    }

    /// Telemetry calls still awaiting completion
    pub fn pending_samples(&self) -> usize {
        self.pending_samples.load(Ordering::SeqCst)
    }
}

impl Reporter for RecordingReporter {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    async fn session_started(&self) -> VigilResult<()> {
        self.log.lock().started += 1;
        Ok(())
    }

    async fn sample(&self, telemetry: &SampleTelemetry) -> VigilResult<()> {
        {
            let mut log = self.log.lock();
            log.sample_attempts += 1;
            if self.fail_samples {
                return Err(VigilError::ReportFailed("scripted telemetry failure".into()));
            }
            if !self.hang_samples {
                log.samples.push(telemetry.clone());
                return Ok(());
            }
        }
        let _pending = PendingCall::enter(&self.pending_samples);
        std::future::pending().await
    }

    async fn summary(&self, report: &SessionReport) -> VigilResult<()> {
        let mut log = self.log.lock();
        log.summary_attempts += 1;
        if self.fail_summary {
            return Err(VigilError::ReportFailed("scripted summary failure".into()));
        }
        log.summaries.push(report.clone());
        Ok(())
    }
}
