//! Per-frame signals and the instantaneous score

use serde::{Deserialize, Serialize};

/// The three scalar signals derived from one [`LandmarkSet`](crate::LandmarkSet).
///
/// The values are only meaningful together: they are always computed from
/// the same landmark set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalTriple {
    /// Eye-openness ratio. Lower means more closed.
    pub ear: f32,
    /// Mouth-openness ratio. Higher means more open.
    pub mar: f32,
    /// Absolute head-yaw estimate in degrees
    #[serde(rename = "yaw")]
    pub yaw_abs: f32,
}

impl SignalTriple {
    pub fn new(ear: f32, mar: f32, yaw_abs: f32) -> Self {
        SignalTriple {
            ear,
            mar,
            yaw_abs: yaw_abs.abs(),
        }
    }
}

/// Instantaneous attentiveness score in `0..=100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstantScore(u8);

impl InstantScore {
    pub const MIN: InstantScore = InstantScore(0);
    pub const MAX: InstantScore = InstantScore(100);

    /// Clamp to `0..=100`
    #[inline]
    pub fn new(value: u8) -> Self {
        InstantScore(value.min(100))
    }

    /// Round and clamp a real-valued score
    #[inline]
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return InstantScore::MIN;
        }
        InstantScore(value.round().clamp(0.0, 100.0) as u8)
    }

    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Score as a fraction in `0..=1`
    #[inline]
    pub fn as_unit(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl From<InstantScore> for u8 {
    fn from(score: InstantScore) -> u8 {
        score.0
    }
}
