//! Synthetic face meshes
//!
//! Every builder produces a full 468-point set. Feature points are placed so
//! the extractor reads known values: eye width 0.1, mouth width 0.2, cheeks
//! 0.4 apart centered on x = 0.5.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vigil_core::{LandmarkSet, Point, MIN_LANDMARKS};
use vigil_face::mesh;

/// Parametric face pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBuilder {
    /// Eyelid gap; eye openness is `eye_gap / 0.1`
    pub eye_gap: f32,
    /// Lip gap; mouth openness is `lip_gap / 0.2`
    pub lip_gap: f32,
    /// Nose offset from the cheek midpoint; yaw is `offset / 0.4 * 108` degrees
    pub nose_offset: f32,
    /// Uniform noise added to every coordinate
    pub jitter: f32,
    pub seed: u64,
}

impl FaceBuilder {
    /// Open eyes, closed mouth, facing the camera
    pub fn attentive() -> Self {
        FaceBuilder {
            eye_gap: 0.03,
            lip_gap: 0.02,
            nose_offset: 0.0,
            jitter: 0.0,
            seed: 0,
        }
    }

    pub fn eyes_closed() -> Self {
        FaceBuilder {
            eye_gap: 0.01,
            ..Self::attentive()
        }
    }

    pub fn yawning() -> Self {
        FaceBuilder {
            lip_gap: 0.1,
            ..Self::attentive()
        }
    }

    /// Roughly 27 degrees of yaw
    pub fn head_turned() -> Self {
        FaceBuilder {
            nose_offset: 0.1,
            ..Self::attentive()
        }
    }

    /// Every rule violated at once
    pub fn distracted() -> Self {
        FaceBuilder {
            eye_gap: 0.01,
            lip_gap: 0.1,
            nose_offset: -0.1,
            ..Self::attentive()
        }
    }

    pub fn with_jitter(mut self, jitter: f32, seed: u64) -> Self {
        self.jitter = jitter.abs();
        self.seed = seed;
        self
    }

    pub fn build(&self) -> LandmarkSet {
        // Background points on a coarse grid, away from every feature
        let mut lm: LandmarkSet = (0..MIN_LANDMARKS)
            .map(|i| Point::new((i % 26) as f32 / 26.0, (i / 26) as f32 / 18.0))
            .collect();

        let half_eye = self.eye_gap / 2.0;
        lm.set_point(mesh::EYE_CORNER_INNER, Point::new(0.55, 0.40));
        lm.set_point(mesh::EYE_CORNER_OUTER, Point::new(0.65, 0.40));
        lm.set_point(mesh::EYE_UPPER_OUTER, Point::new(0.61, 0.40 - half_eye));
        lm.set_point(mesh::EYE_LOWER_OUTER, Point::new(0.61, 0.40 + half_eye));
        lm.set_point(mesh::EYE_UPPER_INNER, Point::new(0.59, 0.40 - half_eye));
        lm.set_point(mesh::EYE_LOWER_INNER, Point::new(0.59, 0.40 + half_eye));

        let half_lip = self.lip_gap / 2.0;
        lm.set_point(mesh::MOUTH_LEFT, Point::new(0.40, 0.70));
        lm.set_point(mesh::MOUTH_RIGHT, Point::new(0.60, 0.70));
        lm.set_point(mesh::LIP_UPPER, Point::new(0.50, 0.70 - half_lip));
        lm.set_point(mesh::LIP_LOWER, Point::new(0.50, 0.70 + half_lip));

        lm.set_point(mesh::CHEEK_LEFT, Point::new(0.30, 0.55));
        lm.set_point(mesh::CHEEK_RIGHT, Point::new(0.70, 0.55));
        lm.set_point(mesh::NOSE_TIP, Point::new(0.50 + self.nose_offset, 0.55));

        if self.jitter > 0.0 {
            let mut rng = StdRng::seed_from_u64(self.seed);
            lm = lm
                .points()
                .iter()
                .map(|p| {
                    Point::new(
                        p.x + rng.gen_range(-self.jitter..=self.jitter),
                        p.y + rng.gen_range(-self.jitter..=self.jitter),
                    )
                })
                .collect();
        }
        lm
    }
}

/// Landmarks with uniformly random coordinates in the unit square
pub fn random_landmarks(rng: &mut StdRng, count: usize) -> LandmarkSet {
    (0..count)
        .map(|_| Point::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)))
        .collect()
}
