//! Consolidated samples - the temporal record of a session

use serde::{Deserialize, Serialize};

use crate::{InstantScore, SampleTelemetry, SignalTriple, Timestamp};

/// Why a tick recorded the value it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleOrigin {
    /// Face seen recently, value is the smoothed score
    Face,
    /// Face missing for longer than the soft window
    SoftAbsence,
    /// Face missing for longer than the hard window
    HardAbsence,
    /// Host surface not visible
    Hidden,
}

impl SampleOrigin {
    pub fn is_absent(self) -> bool {
        !matches!(self, SampleOrigin::Face)
    }

    /// Reason string carried on telemetry
    pub fn reason(self) -> Option<&'static str> {
        match self {
            SampleOrigin::Face => None,
            SampleOrigin::SoftAbsence | SampleOrigin::HardAbsence => Some("no_face"),
            SampleOrigin::Hidden => Some("tab_hidden"),
        }
    }
}

/// One immutable unit of the session record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Consolidated value
    pub score: InstantScore,
    /// What produced the value
    pub origin: SampleOrigin,
    /// Tick time
    pub at: Timestamp,
    /// Signals of the last scored frame, for face samples
    pub signals: Option<SignalTriple>,
}

impl Sample {
    pub fn face(score: InstantScore, at: Timestamp, signals: Option<SignalTriple>) -> Self {
        Sample {
            score,
            origin: SampleOrigin::Face,
            at,
            signals,
        }
    }

    pub fn absent(score: InstantScore, origin: SampleOrigin, at: Timestamp) -> Self {
        Sample {
            score,
            origin,
            at,
            signals: None,
        }
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.score.value()
    }

    pub fn is_absent(&self) -> bool {
        self.origin.is_absent()
    }

    /// Best-effort per-sample payload
    pub fn telemetry(&self) -> SampleTelemetry {
        SampleTelemetry {
            score: self.value(),
            absent: self.is_absent(),
            reason: self.origin.reason().map(str::to_owned),
            ear: self.signals.map(|s| s.ear),
            mar: self.signals.map(|s| s.mar),
            yaw: self.signals.map(|s| s.yaw_abs),
        }
    }
}
