//! Landmark Metric Extractor - face mesh to signals
//!
//! Indices refer to the 468-point face mesh. Points missing from a short
//! landmark set read as the origin, so extraction never fails.

use vigil_core::{ExtractorConfig, LandmarkSet, Point, SignalTriple};

/// Face mesh indices used by the extractor
pub mod mesh {
    /// Upper/lower eyelid pairs and eye corners (right eye)
    pub const EYE_UPPER_OUTER: usize = 386;
    pub const EYE_LOWER_OUTER: usize = 374;
    pub const EYE_UPPER_INNER: usize = 385;
    pub const EYE_LOWER_INNER: usize = 380;
    pub const EYE_CORNER_OUTER: usize = 263;
    pub const EYE_CORNER_INNER: usize = 362;

    /// Inner lips and mouth corners
    pub const LIP_UPPER: usize = 13;
    pub const LIP_LOWER: usize = 14;
    pub const MOUTH_LEFT: usize = 78;
    pub const MOUTH_RIGHT: usize = 308;

    pub const CHEEK_LEFT: usize = 234;
    pub const CHEEK_RIGHT: usize = 454;
    pub const NOSE_TIP: usize = 1;
}

/// Stateless landmark geometry
#[derive(Debug, Clone, Default)]
pub struct LandmarkExtractor {
    config: ExtractorConfig,
}

impl LandmarkExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        LandmarkExtractor { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// All three signals from one landmark set
    pub fn extract(&self, lm: &LandmarkSet) -> SignalTriple {
        SignalTriple::new(
            self.eye_openness(lm),
            self.mouth_openness(lm),
            self.yaw_degrees(lm),
        )
    }

    /// Mean of two eyelid gaps over the eye width
    pub fn eye_openness(&self, lm: &LandmarkSet) -> f32 {
        let vertical = (dist(lm, mesh::EYE_UPPER_OUTER, mesh::EYE_LOWER_OUTER)
            + dist(lm, mesh::EYE_UPPER_INNER, mesh::EYE_LOWER_INNER))
            / 2.0;
        let horizontal = dist(lm, mesh::EYE_CORNER_OUTER, mesh::EYE_CORNER_INNER) + self.config.epsilon;
        vertical / horizontal
    }

    /// Lip gap over mouth width
    pub fn mouth_openness(&self, lm: &LandmarkSet) -> f32 {
        let vertical = dist(lm, mesh::LIP_UPPER, mesh::LIP_LOWER);
        let horizontal = dist(lm, mesh::MOUTH_LEFT, mesh::MOUTH_RIGHT) + self.config.epsilon;
        vertical / horizontal
    }

    /// Signed head-turn estimate in degrees.
    ///
    /// Coarse proxy: the nose offset from the cheek midpoint, normalized by
    /// cheek width and scaled by an empirical factor. It is not a calibrated
    /// pose estimate.
    pub fn yaw_degrees(&self, lm: &LandmarkSet) -> f32 {
        let left = lm.point(mesh::CHEEK_LEFT);
        let right = lm.point(mesh::CHEEK_RIGHT);
        let nose = lm.point(mesh::NOSE_TIP);

        let mid_x = (left.x + right.x) / 2.0;
        let offset = (nose.x - mid_x) / (right.x - left.x + self.config.epsilon);
        offset * self.config.yaw_degrees_per_unit * self.config.yaw_correction
    }
}

#[inline]
fn dist(lm: &LandmarkSet, a: usize, b: usize) -> f32 {
    Point::distance(&lm.point(a), &lm.point(b))
}
