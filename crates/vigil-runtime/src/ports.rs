//! Collaborator interfaces
//!
//! The monitor never loads models or opens devices itself. Callers hand it
//! implementations of these traits. Acquired resources are plain values:
//! dropping a [`FrameStream`] must release the device.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;
use vigil_core::{
    DetectorOptions, DetectorResult, SampleTelemetry, SessionReport, VigilError, VigilResult,
};

/// Frame type produced by a camera
pub type FrameOf<C> = <<C as Camera>::Stream as FrameStream>::Frame;

/// Capture device
pub trait Camera: Send + Sync + 'static {
    type Stream: FrameStream;

    /// Acquire the device. Permission and availability failures are returned here.
    fn open(&self) -> impl Future<Output = VigilResult<Self::Stream>> + Send;
}

/// Acquired capture stream. Dropping it stops the device.
pub trait FrameStream: Send + 'static {
    /// Opaque frame handle, passed untouched to the detector
    type Frame: Send + Sync + 'static;

    /// Next frame, `None` once the stream has ended
    fn next_frame(&mut self) -> impl Future<Output = Option<Self::Frame>> + Send;
}

/// Face-mesh detector capability
pub trait Detector<F>: Send + Sync + 'static {
    /// Load and configure the model. Called once per session start.
    fn configure(&self, options: &DetectorOptions) -> impl Future<Output = VigilResult<()>> + Send;

    /// Run inference on one frame
    fn infer(&self, frame: &F) -> impl Future<Output = VigilResult<DetectorResult>> + Send;

    /// Drop the model handle. Called on every exit path of a session.
    fn release(&self) {}
}

/// Host visibility signal, queried at every tick
pub trait Visibility: Send + Sync + 'static {
    fn is_hidden(&self) -> bool;
}

/// Receiver of per-sample telemetry and the session report
pub trait Reporter: Send + Sync + 'static {
    /// Reports are only sent for authenticated callers
    fn is_authenticated(&self) -> bool {
        true
    }

    fn session_started(&self) -> impl Future<Output = VigilResult<()>> + Send {
        async { Ok(()) }
    }

    fn sample(&self, telemetry: &SampleTelemetry) -> impl Future<Output = VigilResult<()>> + Send;

    fn summary(&self, report: &SessionReport) -> impl Future<Output = VigilResult<()>> + Send;
}

/// Shared visibility flag set by the host
#[derive(Debug, Clone, Default)]
pub struct VisibilityFlag {
    hidden: Arc<AtomicBool>,
}

impl VisibilityFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.store(hidden, Ordering::Release);
    }
}

impl Visibility for VisibilityFlag {
    fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::Acquire)
    }
}

/// Always visible
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysVisible;

impl Visibility for AlwaysVisible {
    fn is_hidden(&self) -> bool {
        false
    }
}

/// Reporter that writes payloads to the log as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    async fn sample(&self, telemetry: &SampleTelemetry) -> VigilResult<()> {
        let json = serde_json::to_string(telemetry).map_err(|e| VigilError::ReportFailed(e.to_string()))?;
        info!(target: "vigil::report", payload = %json, "attention sample");
        Ok(())
    }

    async fn summary(&self, report: &SessionReport) -> VigilResult<()> {
        let json = serde_json::to_string(report).map_err(|e| VigilError::ReportFailed(e.to_string()))?;
        info!(target: "vigil::report", payload = %json, "attention session report");
        Ok(())
    }
}
