//! Exponential moving average of frame scores

use vigil_core::InstantScore;

/// `value = alpha * raw + (1 - alpha) * value`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ema {
    alpha: f64,
    value: f64,
}

impl Ema {
    pub fn new(alpha: f64, seed: f64) -> Self {
        Ema {
            alpha: alpha.clamp(f64::EPSILON, 1.0),
            value: seed,
        }
    }

    /// Blend in a new raw value, returning the updated average
    pub fn update(&mut self, raw: f64) -> f64 {
        self.value = self.alpha * raw + (1.0 - self.alpha) * self.value;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn score(&self) -> InstantScore {
        InstantScore::from_f64(self.value)
    }
}
