//! Frame Scorer - threshold-penalty rules
//!
//! Rule-based on purpose: every point lost can be traced to one violated
//! threshold. Penalties are independent and additive; a value exactly at a
//! threshold is not penalized.

use vigil_core::{InstantScore, ScoringConfig, SignalTriple};

/// Which rules a frame violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Violations {
    pub eyes_closed: bool,
    pub mouth_open: bool,
    pub head_turned: bool,
}

impl Violations {
    pub fn none(&self) -> bool {
        !(self.eyes_closed || self.mouth_open || self.head_turned)
    }

    pub fn count(&self) -> usize {
        [self.eyes_closed, self.mouth_open, self.head_turned]
            .iter()
            .filter(|v| **v)
            .count()
    }
}

/// Coarse per-frame label for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttentionLevel {
    Attentive,
    Medium,
    Low,
}

impl AttentionLevel {
    pub fn label(self) -> &'static str {
        match self {
            AttentionLevel::Attentive => "attentive",
            AttentionLevel::Medium => "medium attention",
            AttentionLevel::Low => "low attention",
        }
    }
}

/// Rule-based frame scorer
#[derive(Debug, Clone, Default)]
pub struct FrameScorer {
    config: ScoringConfig,
}

impl FrameScorer {
    pub fn new(config: ScoringConfig) -> Self {
        FrameScorer { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Rules violated by a triple (strict inequality on the bad side)
    pub fn violations(&self, t: &SignalTriple) -> Violations {
        Violations {
            eyes_closed: t.ear < self.config.ear_closed_threshold,
            mouth_open: t.mar > self.config.mar_open_threshold,
            head_turned: t.yaw_abs > self.config.yaw_turned_threshold,
        }
    }

    /// 100 minus the penalty of every violated rule, floored at 0
    pub fn score(&self, t: &SignalTriple) -> InstantScore {
        let v = self.violations(t);
        let mut score: i32 = 100;
        if v.eyes_closed {
            score -= i32::from(self.config.eyes_closed_penalty);
        }
        if v.mouth_open {
            score -= i32::from(self.config.mouth_open_penalty);
        }
        if v.head_turned {
            score -= i32::from(self.config.head_turned_penalty);
        }
        InstantScore::new(score.clamp(0, 100) as u8)
    }

    /// Label a raw frame score
    pub fn level(&self, score: InstantScore) -> AttentionLevel {
        if score.value() >= self.config.attentive_label_cutoff {
            AttentionLevel::Attentive
        } else if score.value() >= self.config.medium_label_cutoff {
            AttentionLevel::Medium
        } else {
            AttentionLevel::Low
        }
    }
}
