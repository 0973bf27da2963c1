//! Attention pipeline configuration
//!
//! Every threshold, penalty and timing window is a tuning parameter. The
//! defaults are empirical values, not derived constants.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{VigilError, VigilResult};

/// Landmark geometry configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Added to every ratio denominator
    pub epsilon: f32,
    /// Degrees per unit of normalized nose offset
    pub yaw_degrees_per_unit: f32,
    /// Empirical correction applied on top of `yaw_degrees_per_unit`
    pub yaw_correction: f32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            epsilon: 1e-6,
            yaw_degrees_per_unit: 90.0,
            yaw_correction: 1.2,
        }
    }
}

/// Threshold-penalty scoring rules
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Eyes count as closed strictly below this ratio
    pub ear_closed_threshold: f32,
    /// Mouth counts as open strictly above this ratio
    pub mar_open_threshold: f32,
    /// Head counts as turned strictly above this many degrees
    pub yaw_turned_threshold: f32,
    pub eyes_closed_penalty: u8,
    pub mouth_open_penalty: u8,
    pub head_turned_penalty: u8,
    /// Frame label cutoffs
    pub attentive_label_cutoff: u8,
    pub medium_label_cutoff: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            ear_closed_threshold: 0.20,
            mar_open_threshold: 0.35,
            yaw_turned_threshold: 20.0,
            eyes_closed_penalty: 30,
            mouth_open_penalty: 15,
            head_turned_penalty: 25,
            attentive_label_cutoff: 80,
            medium_label_cutoff: 60,
        }
    }
}

/// Temporal smoother / sampler configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Tick period
    #[serde(with = "millis", rename = "sample_interval_ms")]
    pub sample_interval: Duration,
    /// EMA smoothing factor
    pub ema_alpha: f64,
    /// Neutral EMA value at session start
    pub ema_seed: f64,
    /// Without a face for longer than this, record `partial_absence_score`
    #[serde(with = "millis", rename = "soft_absence_ms")]
    pub soft_absence: Duration,
    /// Without a face for this long, record `full_absence_score`
    #[serde(with = "millis", rename = "hard_absence_ms")]
    pub hard_absence: Duration,
    pub partial_absence_score: u8,
    pub full_absence_score: u8,
    /// Samples at or above this value count as attentive
    pub attentive_cutoff: u8,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            sample_interval: Duration::from_millis(1000),
            ema_alpha: 0.35,
            ema_seed: 80.0,
            soft_absence: Duration::from_millis(1000),
            hard_absence: Duration::from_millis(3000),
            partial_absence_score: 40,
            full_absence_score: 0,
            attentive_cutoff: 80,
        }
    }
}

/// Session-duration weighting curve
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightingConfig {
    /// Sessions up to this long get `short_factor`
    #[serde(with = "millis", rename = "short_session_ms")]
    pub short_session: Duration,
    /// Sessions at least this long get `ramp_end_factor`
    #[serde(with = "millis", rename = "target_session_ms")]
    pub target_session: Duration,
    pub short_factor: f64,
    pub ramp_start_factor: f64,
    pub ramp_end_factor: f64,
}

impl Default for WeightingConfig {
    fn default() -> Self {
        WeightingConfig {
            short_session: Duration::from_secs(5 * 60),
            target_session: Duration::from_secs(20 * 60),
            short_factor: 0.95,
            ramp_start_factor: 0.98,
            ramp_end_factor: 1.05,
        }
    }
}

/// Options handed to the face detector, plus the per-inference safety timeout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    pub max_faces: u8,
    pub refine_landmarks: bool,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    #[serde(with = "millis", rename = "inference_timeout_ms")]
    pub inference_timeout: Duration,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        DetectorOptions {
            max_faces: 1,
            refine_landmarks: true,
            min_detection_confidence: 0.6,
            min_tracking_confidence: 0.5,
            inference_timeout: Duration::from_millis(2000),
        }
    }
}

/// Single-shot snapshot sampling
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    #[serde(with = "millis", rename = "interval_ms")]
    pub interval: Duration,
    /// Recorded when no scoring engine is available. Distinct from the EMA seed.
    pub fallback_score: u8,
    /// Most recent snapshots kept
    pub max_samples: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        SnapshotConfig {
            interval: Duration::from_millis(5000),
            fallback_score: 95,
            max_samples: 200,
        }
    }
}

/// Complete attention pipeline configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttentionConfig {
    pub extractor: ExtractorConfig,
    pub scoring: ScoringConfig,
    pub sampler: SamplerConfig,
    pub weighting: WeightingConfig,
    pub detector: DetectorOptions,
    pub snapshot: SnapshotConfig,
}

impl AttentionConfig {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> VigilResult<Self> {
        let config: AttentionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> VigilResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> VigilResult<()> {
        let s = &self.sampler;
        if !(s.ema_alpha > 0.0 && s.ema_alpha <= 1.0) {
            return Err(invalid(format!("ema_alpha must be in (0, 1], got {}", s.ema_alpha)));
        }
        if !(0.0..=100.0).contains(&s.ema_seed) {
            return Err(invalid(format!("ema_seed must be in [0, 100], got {}", s.ema_seed)));
        }
        if s.sample_interval.is_zero() {
            return Err(invalid("sample_interval must be non-zero"));
        }
        if s.soft_absence >= s.hard_absence {
            return Err(invalid("soft_absence must be shorter than hard_absence"));
        }
        if s.partial_absence_score > 100 || s.full_absence_score > 100 || s.attentive_cutoff > 100 {
            return Err(invalid("sampler scores must be within 0..=100"));
        }

        let w = &self.weighting;
        if w.short_session >= w.target_session {
            return Err(invalid("short_session must be shorter than target_session"));
        }
        if w.short_factor <= 0.0 || w.ramp_start_factor <= 0.0 || w.ramp_end_factor <= 0.0 {
            return Err(invalid("weighting factors must be positive"));
        }

        if self.extractor.epsilon <= 0.0 {
            return Err(invalid("extractor epsilon must be positive"));
        }
        if self.detector.inference_timeout.is_zero() {
            return Err(invalid("inference_timeout must be non-zero"));
        }
        if self.snapshot.interval.is_zero() || self.snapshot.max_samples == 0 {
            return Err(invalid("snapshot interval and max_samples must be non-zero"));
        }
        if self.snapshot.fallback_score > 100 {
            return Err(invalid("snapshot fallback_score must be within 0..=100"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> VigilError {
    VigilError::InvalidConfig(msg.into())
}

/// `Duration` carried as integer milliseconds
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
