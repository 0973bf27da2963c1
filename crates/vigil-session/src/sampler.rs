//! Temporal Smoother / Sampler - the session state machine
//!
//! `idle → running → idle`, re-entrant after every stop.
//!
//! Two entry points mutate a running session:
//! - [`Sampler::observe`] for every detector result (updates EMA and last-face time)
//! - [`Sampler::tick`] once per sample interval (the only writer of samples)
//!
//! All session state lives in one owned value created by `start` and dropped
//! by `stop`, so nothing leaks from one session into the next.

use std::time::Duration;

use tracing::{debug, info};
use vigil_core::{
    AttentionConfig, InstantScore, LandmarkSet, Sample, SampleOrigin, SamplerConfig,
    SessionSummary, SignalTriple, Timestamp,
};
use vigil_face::{AttentionLevel, FaceAnalyzer, FrameEvaluation};

use crate::{Ema, SessionAggregator};

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerPhase {
    Idle,
    Running,
}

/// What the session currently looks like, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveStatus {
    Started,
    /// Last frame had a face with this label
    Frame(AttentionLevel),
    /// Last frame had no face; not yet consolidated by a tick
    FaceNotDetected,
    /// Soft absence recorded
    NoFace,
    /// Hard absence recorded
    ProlongedAbsence,
    /// Host surface hidden
    Hidden,
}

impl LiveStatus {
    pub fn label(self) -> &'static str {
        match self {
            LiveStatus::Started => "started",
            LiveStatus::Frame(level) => level.label(),
            LiveStatus::FaceNotDetected => "face not detected",
            LiveStatus::NoFace => "no face",
            LiveStatus::ProlongedAbsence => "prolonged absence",
            LiveStatus::Hidden => "hidden (penalized)",
        }
    }
}

/// Display values of a running session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveStats {
    pub status: LiveStatus,
    /// Smoothed score, or the absence value of the last absent tick
    pub displayed_score: InstantScore,
    /// Rounded mean of all samples so far
    pub running_average: u8,
    /// Percentage of samples at or above the attentive cutoff
    pub attentive_pct: u8,
    pub total_samples: u64,
    pub elapsed: Duration,
}

/// State owned by one running session
#[derive(Debug)]
struct ActiveSession {
    started_at: Timestamp,
    last_face_at: Timestamp,
    ema: Ema,
    last_signals: Option<SignalTriple>,
    samples: Vec<Sample>,
    sum: u64,
    attentive: u64,
    displayed: InstantScore,
    status: LiveStatus,
}

impl ActiveSession {
    fn new(now: Timestamp, config: &SamplerConfig) -> Self {
        let ema = Ema::new(config.ema_alpha, config.ema_seed);
        ActiveSession {
            started_at: now,
            last_face_at: now,
            displayed: ema.score(),
            ema,
            last_signals: None,
            samples: Vec::new(),
            sum: 0,
            attentive: 0,
            status: LiveStatus::Started,
        }
    }

    fn push(&mut self, sample: Sample, attentive_cutoff: u8) {
        self.sum += u64::from(sample.value());
        if sample.value() >= attentive_cutoff {
            self.attentive += 1;
        }
        self.samples.push(sample);
    }

    fn running_average(&self) -> u8 {
        if self.samples.is_empty() {
            return 0;
        }
        (self.sum as f64 / self.samples.len() as f64).round() as u8
    }

    fn attentive_pct(&self) -> u8 {
        let total = self.samples.len().max(1) as f64;
        (100.0 * self.attentive as f64 / total).round() as u8
    }
}

/// Fixed-cadence sampler
#[derive(Debug)]
pub struct Sampler {
    config: SamplerConfig,
    analyzer: FaceAnalyzer,
    aggregator: SessionAggregator,
    session: Option<ActiveSession>,
}

impl Sampler {
    pub fn new(config: &AttentionConfig) -> Self {
        Sampler {
            config: config.sampler.clone(),
            analyzer: FaceAnalyzer::from_config(config),
            aggregator: SessionAggregator::new(
                config.weighting.clone(),
                config.sampler.attentive_cutoff,
            ),
            session: None,
        }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn analyzer(&self) -> &FaceAnalyzer {
        &self.analyzer
    }

    pub fn phase(&self) -> SamplerPhase {
        if self.session.is_some() {
            SamplerPhase::Running
        } else {
            SamplerPhase::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Begin a session. Returns false (and changes nothing) if one is running.
    pub fn start(&mut self, now: Timestamp) -> bool {
        if self.session.is_some() {
            debug!("sampler start ignored: session already running");
            return false;
        }
        self.session = Some(ActiveSession::new(now, &self.config));
        info!(at = ?now, "attention session started");
        true
    }

    /// Feed one detector result. Only updates smoothing state, never samples.
    pub fn observe(&mut self, face: Option<&LandmarkSet>, now: Timestamp) -> Option<FrameEvaluation> {
        let session = self.session.as_mut()?;
        let Some(landmarks) = face else {
            session.status = LiveStatus::FaceNotDetected;
            return None;
        };

        let eval = self.analyzer.evaluate(landmarks);
        session.last_face_at = now;
        session.ema.update(f64::from(eval.score.value()));
        session.displayed = session.ema.score();
        session.last_signals = Some(eval.signals);
        session.status = LiveStatus::Frame(eval.level);
        Some(eval)
    }

    /// Consolidate one sample. `hidden` is the host visibility at tick time.
    pub fn tick(&mut self, hidden: bool, now: Timestamp) -> Option<Sample> {
        let cfg = &self.config;
        let session = self.session.as_mut()?;
        let since = now.since(session.last_face_at);

        let sample = if hidden {
            Sample::absent(
                InstantScore::new(cfg.full_absence_score),
                SampleOrigin::Hidden,
                now,
            )
        } else if since >= cfg.hard_absence {
            Sample::absent(
                InstantScore::new(cfg.full_absence_score),
                SampleOrigin::HardAbsence,
                now,
            )
        } else if since > cfg.soft_absence {
            Sample::absent(
                InstantScore::new(cfg.partial_absence_score),
                SampleOrigin::SoftAbsence,
                now,
            )
        } else {
            Sample::face(session.ema.score(), now, session.last_signals)
        };

        match sample.origin {
            SampleOrigin::Face => {}
            origin => {
                session.displayed = sample.score;
                session.status = match origin {
                    SampleOrigin::Hidden => LiveStatus::Hidden,
                    SampleOrigin::HardAbsence => LiveStatus::ProlongedAbsence,
                    _ => LiveStatus::NoFace,
                };
            }
        }

        session.push(sample, cfg.attentive_cutoff);
        Some(sample)
    }

    /// End the session and summarize it. `None` if no session was running.
    pub fn stop(&mut self, now: Timestamp) -> Option<SessionSummary> {
        let session = self.session.take()?;
        let values: Vec<u8> = session.samples.iter().map(Sample::value).collect();
        let elapsed = now.since(session.started_at);
        let summary = self.aggregator.summarize(&values, elapsed);

        info!(
            samples = summary.total_samples,
            average = summary.average_score_0to100,
            adjusted = summary.time_adjusted_average_0to100,
            "attention session stopped"
        );
        Some(summary)
    }

    /// Display values, `None` when idle
    pub fn live(&self, now: Timestamp) -> Option<LiveStats> {
        let session = self.session.as_ref()?;
        Some(LiveStats {
            status: session.status,
            displayed_score: session.displayed,
            running_average: session.running_average(),
            attentive_pct: session.attentive_pct(),
            total_samples: session.samples.len() as u64,
            elapsed: now.since(session.started_at),
        })
    }

    /// Samples recorded so far in the running session
    pub fn samples(&self) -> &[Sample] {
        self.session
            .as_ref()
            .map(|s| s.samples.as_slice())
            .unwrap_or(&[])
    }

    /// Current smoothed score, `None` when idle
    pub fn smoothed(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.ema.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::Point;
    use vigil_face::mesh;

    fn t(ms: u64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    fn attentive_face() -> LandmarkSet {
        let mut lm = LandmarkSet::default();
        lm.set_point(mesh::EYE_CORNER_INNER, Point::new(0.55, 0.40));
        lm.set_point(mesh::EYE_CORNER_OUTER, Point::new(0.65, 0.40));
        lm.set_point(mesh::EYE_UPPER_OUTER, Point::new(0.61, 0.385));
        lm.set_point(mesh::EYE_LOWER_OUTER, Point::new(0.61, 0.415));
        lm.set_point(mesh::EYE_UPPER_INNER, Point::new(0.59, 0.385));
        lm.set_point(mesh::EYE_LOWER_INNER, Point::new(0.59, 0.415));
        lm.set_point(mesh::MOUTH_LEFT, Point::new(0.40, 0.70));
        lm.set_point(mesh::MOUTH_RIGHT, Point::new(0.60, 0.70));
        lm.set_point(mesh::LIP_UPPER, Point::new(0.50, 0.70));
        lm.set_point(mesh::LIP_LOWER, Point::new(0.50, 0.71));
        lm.set_point(mesh::CHEEK_LEFT, Point::new(0.30, 0.55));
        lm.set_point(mesh::CHEEK_RIGHT, Point::new(0.70, 0.55));
        lm.set_point(mesh::NOSE_TIP, Point::new(0.50, 0.55));
        lm
    }

    fn sampler() -> Sampler {
        Sampler::new(&AttentionConfig::default())
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut s = sampler();
        assert_eq!(s.phase(), SamplerPhase::Idle);
        assert!(s.start(t(0)));

        s.observe(Some(&attentive_face()), t(200));
        s.tick(false, t(1000));

        assert!(!s.start(t(1100)));
        assert_eq!(s.samples().len(), 1);
        assert_eq!(s.phase(), SamplerPhase::Running);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut s = sampler();
        assert!(s.stop(t(0)).is_none());

        s.start(t(0));
        assert!(s.stop(t(1000)).is_some());
        assert!(s.stop(t(2000)).is_none());
        assert_eq!(s.phase(), SamplerPhase::Idle);
    }

    #[test]
    fn test_idle_ignores_callbacks() {
        let mut s = sampler();
        assert!(s.observe(Some(&attentive_face()), t(0)).is_none());
        assert!(s.tick(false, t(1000)).is_none());
        assert!(s.live(t(1000)).is_none());
        assert!(s.samples().is_empty());
    }

    #[test]
    fn test_absence_escalation() {
        let mut s = sampler();
        s.start(t(0));

        // Face seen at 0; ema seed 80 blended with 100 → 87
        s.observe(Some(&attentive_face()), t(0));

        let recent = s.tick(false, t(500)).unwrap();
        assert_eq!(recent.origin, SampleOrigin::Face);
        assert_eq!(recent.value(), 87);

        let soft = s.tick(false, t(1500)).unwrap();
        assert_eq!(soft.origin, SampleOrigin::SoftAbsence);
        assert_eq!(soft.value(), 40);

        let hard = s.tick(false, t(3500)).unwrap();
        assert_eq!(hard.origin, SampleOrigin::HardAbsence);
        assert_eq!(hard.value(), 0);
    }

    #[test]
    fn test_absence_window_edges() {
        let mut s = sampler();
        s.start(t(0));

        assert_eq!(s.tick(false, t(1000)).unwrap().origin, SampleOrigin::Face);
        assert_eq!(s.tick(false, t(1001)).unwrap().origin, SampleOrigin::SoftAbsence);
        assert_eq!(s.tick(false, t(2999)).unwrap().origin, SampleOrigin::SoftAbsence);
        assert_eq!(s.tick(false, t(3000)).unwrap().origin, SampleOrigin::HardAbsence);
    }

    #[test]
    fn test_hidden_overrides_face() {
        let mut s = sampler();
        s.start(t(0));
        s.observe(Some(&attentive_face()), t(900));

        let sample = s.tick(true, t(1000)).unwrap();
        assert_eq!(sample.origin, SampleOrigin::Hidden);
        assert_eq!(sample.value(), 0);
        assert_eq!(sample.telemetry().reason.as_deref(), Some("tab_hidden"));

        let live = s.live(t(1000)).unwrap();
        assert_eq!(live.status, LiveStatus::Hidden);
        assert_eq!(live.displayed_score.value(), 0);
    }

    #[test]
    fn test_only_latest_ema_is_consolidated() {
        let mut s = sampler();
        s.start(t(0));
        let face = attentive_face();
        for ms in [100, 200, 300, 400] {
            s.observe(Some(&face), t(ms));
        }
        let expected = s.smoothed().unwrap().round() as u8;

        let sample = s.tick(false, t(1000)).unwrap();
        assert_eq!(sample.value(), expected);
        assert_eq!(s.samples().len(), 1);
        assert!(sample.signals.is_some());
    }

    #[test]
    fn test_missing_frames_only_update_status() {
        let mut s = sampler();
        s.start(t(0));
        assert!(s.observe(None, t(100)).is_none());
        assert!(s.samples().is_empty());
        assert_eq!(s.live(t(100)).unwrap().status, LiveStatus::FaceNotDetected);
    }

    #[test]
    fn test_live_stats() {
        let mut s = sampler();
        s.start(t(0));
        s.observe(Some(&attentive_face()), t(0));
        s.tick(false, t(500)); // 87
        s.tick(false, t(1500)); // 40

        let live = s.live(t(1500)).unwrap();
        assert_eq!(live.total_samples, 2);
        assert_eq!(live.running_average, 64); // 63.5 rounds up
        assert_eq!(live.attentive_pct, 50);
        assert_eq!(live.status, LiveStatus::NoFace);
        assert_eq!(live.elapsed, Duration::from_millis(1500));
    }

    #[test]
    fn test_stop_summarizes_and_resets() {
        let mut s = sampler();
        s.start(t(0));
        s.observe(Some(&attentive_face()), t(0));
        s.tick(false, t(1000)); // 87
        s.tick(true, t(2000)); // 0

        let summary = s.stop(t(2000)).unwrap();
        assert_eq!(summary.total_samples, 2);
        assert_eq!(summary.average_score_0to100, 44); // 43.5
        assert_eq!(summary.time_adjusted_average_0to100, 42); // 44 * 0.95 = 41.8
        assert_eq!(summary.attentive_fraction, 50);
        assert_eq!(summary.session_duration_ms, 2000);
        assert_eq!(summary.average_score_0to1, 0.44);

        // Fresh state on restart: seeded EMA, no samples, new start time
        assert!(s.start(t(10_000)));
        assert!(s.samples().is_empty());
        assert_eq!(s.smoothed(), Some(80.0));
        let first = s.tick(false, t(10_500)).unwrap();
        assert_eq!(first.value(), 80);
    }
}
