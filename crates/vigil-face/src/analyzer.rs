//! Extractor and scorer combined

use vigil_core::{AttentionConfig, InstantScore, LandmarkSet, SignalTriple};

use crate::{AttentionLevel, FrameScorer, LandmarkExtractor};

/// Result of analyzing one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEvaluation {
    pub signals: SignalTriple,
    pub score: InstantScore,
    pub level: AttentionLevel,
}

/// One-call frame analysis
#[derive(Debug, Clone, Default)]
pub struct FaceAnalyzer {
    extractor: LandmarkExtractor,
    scorer: FrameScorer,
}

impl FaceAnalyzer {
    pub fn new(extractor: LandmarkExtractor, scorer: FrameScorer) -> Self {
        FaceAnalyzer { extractor, scorer }
    }

    pub fn from_config(config: &AttentionConfig) -> Self {
        FaceAnalyzer {
            extractor: LandmarkExtractor::new(config.extractor.clone()),
            scorer: FrameScorer::new(config.scoring.clone()),
        }
    }

    pub fn evaluate(&self, landmarks: &LandmarkSet) -> FrameEvaluation {
        let signals = self.extractor.extract(landmarks);
        let score = self.scorer.score(&signals);
        FrameEvaluation {
            signals,
            score,
            level: self.scorer.level(score),
        }
    }

    /// Score of an optional face as a fraction in `0..=1`; no face scores 0
    pub fn score_unit(&self, landmarks: Option<&LandmarkSet>) -> f64 {
        landmarks
            .map(|lm| self.evaluate(lm).score.as_unit())
            .unwrap_or(0.0)
    }

    pub fn extractor(&self) -> &LandmarkExtractor {
        &self.extractor
    }

    pub fn scorer(&self) -> &FrameScorer {
        &self.scorer
    }
}
