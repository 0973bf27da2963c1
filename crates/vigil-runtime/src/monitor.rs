//! Attention Monitor - session lifecycle on tokio
//!
//! Two tasks run per session:
//! - the frame task pulls frames, runs inference and feeds results to the sampler
//! - the tick task consolidates one sample per interval
//!
//! Both go through one mutex around the [`Sampler`] and never hold it across
//! an await, so a tick can never see a half-updated EMA. Only the tick task
//! records samples.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use vigil_core::{
    AttentionConfig, LandmarkSet, Sample, SessionSummary, VigilError, VigilResult,
};
use vigil_session::{Clock, LiveStats, Sampler};

use crate::{Camera, Detector, FrameOf, FrameStream, Reporter, TokioClock, Visibility};

/// Result of stopping a session
#[derive(Debug)]
pub struct SessionOutcome {
    /// Always available, even when delivery failed
    pub summary: SessionSummary,
    /// Outcome of sending the summary to the reporter
    pub delivery: VigilResult<()>,
}

impl SessionOutcome {
    pub fn delivered(&self) -> bool {
        self.delivery.is_ok()
    }
}

/// Releases the detector when dropped
struct DetectorLease<D, F>
where
    D: Detector<F>,
{
    detector: Arc<D>,
    _frame: std::marker::PhantomData<fn(&F)>,
}

impl<D, F> DetectorLease<D, F>
where
    D: Detector<F>,
{
    fn new(detector: Arc<D>) -> Self {
        DetectorLease {
            detector,
            _frame: std::marker::PhantomData,
        }
    }
}

impl<D, F> Drop for DetectorLease<D, F>
where
    D: Detector<F>,
{
    fn drop(&mut self) {
        self.detector.release();
        debug!("detector released");
    }
}

struct RunningSession {
    shutdown: watch::Sender<bool>,
    frame_task: JoinHandle<()>,
    tick_task: JoinHandle<()>,
}

impl RunningSession {
    fn abort(&self) {
        let _ = self.shutdown.send(true);
        self.frame_task.abort();
        self.tick_task.abort();
    }
}

/// Attention monitor
pub struct Monitor<C, D, V, R>
where
    C: Camera,
    D: Detector<FrameOf<C>>,
    V: Visibility,
    R: Reporter,
{
    config: AttentionConfig,
    camera: Arc<C>,
    detector: Arc<D>,
    visibility: Arc<V>,
    reporter: Arc<R>,
    clock: Arc<dyn Clock>,
    sampler: Arc<Mutex<Sampler>>,
    running: Option<RunningSession>,
}

impl<C, D, V, R> Monitor<C, D, V, R>
where
    C: Camera,
    D: Detector<FrameOf<C>>,
    V: Visibility,
    R: Reporter,
{
    pub fn new(config: AttentionConfig, camera: C, detector: D, visibility: V, reporter: R) -> Self {
        Self::with_clock(
            config,
            camera,
            detector,
            visibility,
            reporter,
            Arc::new(TokioClock::new()),
        )
    }

    pub fn with_clock(
        config: AttentionConfig,
        camera: C,
        detector: D,
        visibility: V,
        reporter: R,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Monitor {
            sampler: Arc::new(Mutex::new(Sampler::new(&config))),
            config,
            camera: Arc::new(camera),
            detector: Arc::new(detector),
            visibility: Arc::new(visibility),
            reporter: Arc::new(reporter),
            clock,
            running: None,
        }
    }

    pub fn config(&self) -> &AttentionConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Display values of the running session
    pub fn live(&self) -> Option<LiveStats> {
        self.sampler.lock().live(self.clock.now())
    }

    /// Samples recorded so far
    pub fn samples(&self) -> Vec<Sample> {
        self.sampler.lock().samples().to_vec()
    }

    /// Acquire resources and begin sampling.
    ///
    /// Returns `Ok(false)` if a session is already running. Invalid
    /// configuration and acquisition failures are returned and leave the
    /// monitor idle.
    pub async fn start(&mut self) -> VigilResult<bool> {
        if self.running.is_some() {
            debug!("monitor start ignored: already running");
            return Ok(false);
        }
        self.config.validate()?;

        if let Err(e) = self.detector.configure(&self.config.detector).await {
            let e = acquisition_error(e, VigilError::ModelLoadFailed);
            warn!(error = %e, "detector configuration failed");
            return Err(e);
        }
        let lease: DetectorLease<D, FrameOf<C>> = DetectorLease::new(Arc::clone(&self.detector));

        let stream = match self.camera.open().await {
            Ok(stream) => stream,
            Err(e) => {
                let e = acquisition_error(e, VigilError::CameraUnavailable);
                warn!(error = %e, "camera acquisition failed");
                return Err(e);
            }
        };

        if self.reporter.is_authenticated() {
            let reporter = Arc::clone(&self.reporter);
            tokio::spawn(async move {
                if let Err(e) = reporter.session_started().await {
                    debug!(error = %e, "session start notification failed");
                }
            });
        }

        self.sampler.lock().start(self.clock.now());

        let (shutdown, shutdown_rx) = watch::channel(false);
        let frame_task = tokio::spawn(run_frames(
            stream,
            lease,
            Arc::clone(&self.sampler),
            Arc::clone(&self.clock),
            self.config.detector.inference_timeout,
            shutdown_rx.clone(),
        ));
        let tick_task = tokio::spawn(run_ticks(
            Arc::clone(&self.sampler),
            Arc::clone(&self.clock),
            Arc::clone(&self.visibility),
            Arc::clone(&self.reporter),
            self.config.sampler.sample_interval,
            shutdown_rx,
        ));

        self.running = Some(RunningSession {
            shutdown,
            frame_task,
            tick_task,
        });
        info!(
            interval = %humantime::format_duration(self.config.sampler.sample_interval),
            "attention monitor started"
        );
        Ok(true)
    }

    /// Release resources, summarize and report.
    ///
    /// Returns `None` if no session was running.
    pub async fn stop(&mut self) -> Option<SessionOutcome> {
        let running = self.running.take()?;
        let _ = running.shutdown.send(true);

        if let Err(e) = running.tick_task.await {
            warn!(error = %e, "tick task ended abnormally");
        }
        if let Err(e) = running.frame_task.await {
            warn!(error = %e, "frame task ended abnormally");
        }

        let summary = self.sampler.lock().stop(self.clock.now())?;
        info!(
            duration = %humantime::format_duration(Duration::from_millis(summary.session_duration_ms)),
            samples = summary.total_samples,
            "attention monitor stopped"
        );

        let delivery = self.deliver(&summary).await;
        if let Err(e) = &delivery {
            warn!(error = %e, "attention summary was not delivered");
        }
        Some(SessionOutcome { summary, delivery })
    }

    async fn deliver(&self, summary: &SessionSummary) -> VigilResult<()> {
        if !self.reporter.is_authenticated() {
            return Err(VigilError::NotAuthenticated);
        }
        self.reporter.summary(&summary.report()).await
    }
}

/// Dropping a running monitor ends the session: tasks are aborted, the
/// summary is computed and delivery is handed to the current runtime.
impl<C, D, V, R> Drop for Monitor<C, D, V, R>
where
    C: Camera,
    D: Detector<FrameOf<C>>,
    V: Visibility,
    R: Reporter,
{
    fn drop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        running.abort();

        let Some(summary) = self.sampler.lock().stop(self.clock.now()) else {
            return;
        };
        let report = summary.report();
        info!(
            samples = summary.total_samples,
            "attention monitor dropped while running"
        );

        if !self.reporter.is_authenticated() {
            debug!("attention summary not sent: caller not authenticated");
            return;
        }
        match Handle::try_current() {
            Ok(handle) => {
                let reporter = Arc::clone(&self.reporter);
                handle.spawn(async move {
                    if let Err(e) = reporter.summary(&report).await {
                        warn!(error = %e, report = ?report, "attention summary was not delivered");
                    }
                });
            }
            Err(_) => {
                warn!(report = ?report, "no runtime to deliver attention summary");
            }
        }
    }
}

fn acquisition_error(e: VigilError, wrap: fn(String) -> VigilError) -> VigilError {
    if e.is_acquisition_failure() {
        e
    } else {
        wrap(e.to_string())
    }
}

/// Outcome of one frame: outer `None` when the stream ended
async fn next_result<S, D>(
    stream: &mut S,
    detector: &D,
    limit: Duration,
) -> Option<Option<LandmarkSet>>
where
    S: FrameStream,
    D: Detector<S::Frame>,
{
    let frame = stream.next_frame().await?;
    let landmarks = match timeout(limit, detector.infer(&frame)).await {
        Ok(Ok(result)) => result.into_primary(),
        Ok(Err(e)) => {
            debug!(error = %e, "inference failed, treating frame as no face");
            None
        }
        Err(_) => {
            debug!(limit = ?limit, "inference timed out, treating frame as no face");
            None
        }
    };
    Some(landmarks)
}

async fn run_frames<S, D>(
    mut stream: S,
    lease: DetectorLease<D, S::Frame>,
    sampler: Arc<Mutex<Sampler>>,
    clock: Arc<dyn Clock>,
    limit: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: FrameStream,
    D: Detector<S::Frame>,
{
    let detector = Arc::clone(&lease.detector);
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            outcome = next_result(&mut stream, detector.as_ref(), limit) => {
                let Some(landmarks) = outcome else {
                    info!("frame stream ended");
                    break;
                };
                sampler.lock().observe(landmarks.as_ref(), clock.now());
            }
        }
    }
    drop(stream);
    drop(lease);
}

async fn run_ticks<V, R>(
    sampler: Arc<Mutex<Sampler>>,
    clock: Arc<dyn Clock>,
    visibility: Arc<V>,
    reporter: Arc<R>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    V: Visibility,
    R: Reporter,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                let hidden = visibility.is_hidden();
                let sample = sampler.lock().tick(hidden, clock.now());
                let Some(sample) = sample else {
                    break;
                };
                if reporter.is_authenticated() {
                    let reporter = Arc::clone(&reporter);
                    let telemetry = sample.telemetry();
                    // A stuck reporter must not pile up one task per tick
                    tokio::spawn(async move {
                        match timeout(period, reporter.sample(&telemetry)).await {
                            Ok(Ok(())) => {}
                            Ok(Err(e)) => debug!(error = %e, "sample telemetry dropped"),
                            Err(_) => debug!(limit = ?period, "sample telemetry timed out"),
                        }
                    });
                }
            }
        }
    }
}
