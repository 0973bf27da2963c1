//! Single-shot scoring
//!
//! [`SnapshotEngine::compute`] runs extractor and scorer once on one frame,
//! with no temporal state. [`SnapshotSampler`] calls it on a fixed interval
//! for pages that do not run a full monitor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, OnceCell};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant, Interval, MissedTickBehavior};
use tracing::debug;
use vigil_core::{AttentionConfig, DetectorOptions, VigilError, VigilResult};
use vigil_face::FaceAnalyzer;
use vigil_session::{Clock, SnapshotSeries};

use crate::{Detector, FrameStream, TokioClock};

/// Lazily configured detector plus analyzer
pub struct SnapshotEngine<D> {
    detector: Arc<D>,
    analyzer: FaceAnalyzer,
    options: DetectorOptions,
    ready: OnceCell<()>,
}

impl<D> SnapshotEngine<D> {
    pub fn new(config: &AttentionConfig, detector: D) -> Self {
        Self::from_shared(config, Arc::new(detector))
    }

    pub fn from_shared(config: &AttentionConfig, detector: Arc<D>) -> Self {
        SnapshotEngine {
            detector,
            analyzer: FaceAnalyzer::from_config(config),
            options: config.detector.clone(),
            ready: OnceCell::new(),
        }
    }

    /// Configure the detector on first use only
    pub async fn ensure<F>(&self) -> VigilResult<()>
    where
        D: Detector<F>,
    {
        self.ready
            .get_or_try_init(|| self.detector.configure(&self.options))
            .await
            .map(|_| ())
    }

    /// Attention of one frame in `0..=1`.
    ///
    /// Never fails: no face, detector errors and timeouts all score 0.
    pub async fn compute<F>(&self, frame: &F) -> f64
    where
        D: Detector<F>,
        F: Sync,
    {
        match self.try_compute(frame).await {
            Ok(score) => score,
            Err(e) => {
                debug!(error = %e, "single-shot scoring failed");
                0.0
            }
        }
    }

    async fn try_compute<F>(&self, frame: &F) -> VigilResult<f64>
    where
        D: Detector<F>,
        F: Sync,
    {
        let limit = self.options.inference_timeout;
        // One budget covers first-use configuration and inference
        let result = timeout(limit, async {
            self.ensure::<F>().await?;
            self.detector.infer(frame).await
        })
        .await
        .map_err(|_| VigilError::InferenceTimeout(limit))??;
        Ok(self.analyzer.score_unit(result.primary()))
    }
}

/// Periodic single-shot sampling into a [`SnapshotSeries`]
pub struct SnapshotSampler {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<SnapshotSeries>,
}

impl SnapshotSampler {
    /// Begin sampling `stream` every `config.snapshot.interval`.
    ///
    /// Without an engine the fallback score is recorded. With one, a
    /// stream that has ended or produces no frame within the inference
    /// timeout scores 0.
    pub fn spawn<S, D>(
        config: &AttentionConfig,
        stream: S,
        engine: Option<Arc<SnapshotEngine<D>>>,
    ) -> VigilResult<Self>
    where
        S: FrameStream,
        D: Detector<S::Frame>,
    {
        config.validate()?;
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_snapshots(
            SnapshotSeries::new(config.snapshot.clone()),
            config.snapshot.interval,
            stream,
            engine,
            shutdown_rx,
        ));
        Ok(SnapshotSampler { shutdown, task })
    }

    /// Stop sampling and hand back everything recorded
    pub async fn stop(self) -> VigilResult<SnapshotSeries> {
        let _ = self.shutdown.send(true);
        self.task
            .await
            .map_err(|e| VigilError::InferenceFailed(format!("snapshot task failed: {e}")))
    }
}

async fn run_snapshots<S, D>(
    mut series: SnapshotSeries,
    period: Duration,
    mut stream: S,
    engine: Option<Arc<SnapshotEngine<D>>>,
    mut shutdown: watch::Receiver<bool>,
) -> SnapshotSeries
where
    S: FrameStream,
    D: Detector<S::Frame>,
{
    let clock = TokioClock::new();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // Shutdown cancels a tick at any point, including a stalled frame
        // read or detector call
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            value = next_snapshot(&mut ticker, &mut stream, engine.as_deref()) => {
                let snapshot = series.record(value, clock.now());
                debug!(score = snapshot.score.value(), fallback = snapshot.fallback, "snapshot recorded");
            }
        }
    }
    series
}

/// Wait for the next tick and score one frame. `None` means no engine.
async fn next_snapshot<S, D>(
    ticker: &mut Interval,
    stream: &mut S,
    engine: Option<&SnapshotEngine<D>>,
) -> Option<f64>
where
    S: FrameStream,
    D: Detector<S::Frame>,
{
    ticker.tick().await;
    let engine = engine?;
    let frame = timeout(engine.options.inference_timeout, stream.next_frame())
        .await
        .ok()
        .flatten();
    let score = match frame {
        Some(frame) => engine.compute(&frame).await,
        None => 0.0,
    };
    Some(score)
}
