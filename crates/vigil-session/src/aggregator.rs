//! Session Aggregator - sample sequence to summary
//!
//! Duration weighting policy: very short sessions are slightly discounted,
//! sessions in the target range ramp up to full trust, long sessions get a
//! small capped boost.

use std::time::Duration;

use vigil_core::{SessionSummary, WeightingConfig};

/// Reduces a finished session to its [`SessionSummary`]
#[derive(Debug, Clone)]
pub struct SessionAggregator {
    weighting: WeightingConfig,
    attentive_cutoff: u8,
}

impl Default for SessionAggregator {
    fn default() -> Self {
        SessionAggregator {
            weighting: WeightingConfig::default(),
            attentive_cutoff: 80,
        }
    }
}

impl SessionAggregator {
    pub fn new(weighting: WeightingConfig, attentive_cutoff: u8) -> Self {
        SessionAggregator {
            weighting,
            attentive_cutoff,
        }
    }

    /// Weighting factor for a session of the given length
    pub fn time_weight_factor(&self, session: Duration) -> f64 {
        let w = &self.weighting;
        if session <= w.short_session {
            return w.short_factor;
        }
        if session < w.target_session {
            let span = (w.target_session - w.short_session).as_secs_f64();
            let t = (session - w.short_session).as_secs_f64() / span;
            return w.ramp_start_factor + (w.ramp_end_factor - w.ramp_start_factor) * t;
        }
        w.ramp_end_factor
    }

    pub fn summarize(&self, samples: &[u8], session: Duration) -> SessionSummary {
        let session_duration_ms = session.as_millis().min(u64::MAX as u128) as u64;
        if samples.is_empty() {
            return SessionSummary::empty(session_duration_ms);
        }

        let total = samples.len() as u64;
        let sum: u64 = samples.iter().map(|v| u64::from(*v)).sum();
        let attentive = samples
            .iter()
            .filter(|v| **v >= self.attentive_cutoff)
            .count() as u64;

        let average_0to100 = round_percent(sum as f64 / total as f64);
        let factor = self.time_weight_factor(session);
        let adjusted = round_percent(f64::from(average_0to100) * factor);

        SessionSummary {
            average_score_0to1: (f64::from(average_0to100) / 100.0).clamp(0.0, 1.0),
            average_score_0to100: average_0to100,
            time_adjusted_average_0to100: adjusted,
            attentive_fraction: round_percent(100.0 * attentive as f64 / total as f64),
            total_samples: total,
            session_duration_ms,
        }
    }
}

/// Summary with default weighting and an attentive cutoff of 80
pub fn summarize(samples: &[u8], session_duration_ms: u64) -> SessionSummary {
    SessionAggregator::default().summarize(samples, Duration::from_millis(session_duration_ms))
}

fn round_percent(v: f64) -> u8 {
    v.round().clamp(0.0, 100.0) as u8
}
