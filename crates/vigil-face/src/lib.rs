//! Vigil Face - per-frame attention signals
//!
//! This is NOT pose estimation or facial recognition.
//! A face mesh is reduced to three coarse signals which are then scored
//! with explainable threshold-penalty rules.
//!
//! # Pipeline
//!
//! LandmarkSet → [`LandmarkExtractor`] → SignalTriple → [`FrameScorer`] → InstantScore
//!
//! [`FaceAnalyzer`] runs both stages in one call.

pub mod analyzer;
pub mod extractor;
pub mod scorer;

pub use analyzer::*;
pub use extractor::*;
pub use scorer::*;
