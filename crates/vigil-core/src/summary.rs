//! Session summary and the payloads that cross into the external API

use serde::{Deserialize, Serialize};

/// Session-level result, computed once at session end
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// `average_score_0to100 / 100`, in `0..=1`
    pub average_score_0to1: f64,
    /// Rounded mean of all samples
    pub average_score_0to100: u8,
    /// Mean after the session-duration weighting
    pub time_adjusted_average_0to100: u8,
    /// Percentage of samples at or above the attentive cutoff
    pub attentive_fraction: u8,
    pub total_samples: u64,
    pub session_duration_ms: u64,
}

impl SessionSummary {
    /// Summary of a session with no samples
    pub fn empty(session_duration_ms: u64) -> Self {
        SessionSummary {
            average_score_0to1: 0.0,
            average_score_0to100: 0,
            time_adjusted_average_0to100: 0,
            attentive_fraction: 0,
            total_samples: 0,
            session_duration_ms,
        }
    }

    pub fn report(&self) -> SessionReport {
        SessionReport::from(self)
    }
}

/// Session-end payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub average_score: f64,
    pub average_score_100: u8,
    pub time_adjusted_avg: u8,
    pub attentive_pct: u8,
    pub total_samples: u64,
    pub session_ms: u64,
}

impl From<&SessionSummary> for SessionReport {
    fn from(s: &SessionSummary) -> Self {
        SessionReport {
            average_score: s.average_score_0to1,
            average_score_100: s.average_score_0to100,
            time_adjusted_avg: s.time_adjusted_average_0to100,
            attentive_pct: s.attentive_fraction,
            total_samples: s.total_samples,
            session_ms: s.session_duration_ms,
        }
    }
}

/// Per-sample payload. Signal fields are only present for face samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleTelemetry {
    pub score: u8,
    pub absent: bool,
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ear: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mar: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaw: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_field_names() {
        let summary = SessionSummary {
            average_score_0to1: 0.72,
            average_score_0to100: 72,
            time_adjusted_average_0to100: 68,
            attentive_fraction: 55,
            total_samples: 240,
            session_duration_ms: 240_500,
        };

        let json = serde_json::to_value(summary.report()).unwrap();
        assert_eq!(json["average_score"], 0.72);
        assert_eq!(json["average_score_100"], 72);
        assert_eq!(json["time_adjusted_avg"], 68);
        assert_eq!(json["attentive_pct"], 55);
        assert_eq!(json["total_samples"], 240);
        assert_eq!(json["session_ms"], 240_500);
    }

    #[test]
    fn test_empty_summary() {
        let summary = SessionSummary::empty(1234);
        assert_eq!(summary.total_samples, 0);
        assert_eq!(summary.average_score_0to1, 0.0);
        assert_eq!(summary.session_duration_ms, 1234);
    }
}
