//! Snapshot series - the stateless sampling mode
//!
//! Some callers only take a single-shot score every few seconds instead of
//! running the full sampler. Their results are kept here, capped to the most
//! recent entries.

use std::collections::VecDeque;

use vigil_core::{InstantScore, SnapshotConfig, Timestamp};

/// One single-shot result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub at: Timestamp,
    pub score: InstantScore,
    /// True when no engine was available and the fallback was recorded
    pub fallback: bool,
}

/// Bounded series of snapshots
#[derive(Debug, Clone)]
pub struct SnapshotSeries {
    config: SnapshotConfig,
    entries: VecDeque<Snapshot>,
}

impl SnapshotSeries {
    pub fn new(config: SnapshotConfig) -> Self {
        SnapshotSeries {
            entries: VecDeque::with_capacity(config.max_samples.min(1024)),
            config,
        }
    }

    /// Record a single-shot result in `0..=1`.
    /// `None` means no scoring engine was available.
    pub fn record(&mut self, value: Option<f64>, at: Timestamp) -> Snapshot {
        let snapshot = match value {
            Some(v) if !v.is_nan() => Snapshot {
                at,
                score: InstantScore::from_f64(v * 100.0),
                fallback: false,
            },
            _ => Snapshot {
                at,
                score: InstantScore::new(self.config.fallback_score),
                fallback: true,
            },
        };

        while !self.entries.is_empty() && self.entries.len() >= self.config.max_samples {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
        snapshot
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }

    /// Rounded mean as a fraction, 0 when empty
    pub fn average_0to1(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.entries.iter().map(|s| u64::from(s.score.value())).sum();
        let avg100 = (sum as f64 / self.entries.len() as f64).round();
        (avg100 / 100.0).clamp(0.0, 1.0)
    }

    pub fn average_0to100(&self) -> u8 {
        (self.average_0to1() * 100.0).round() as u8
    }
}
