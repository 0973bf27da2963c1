//! Facial landmark input
//!
//! A [`LandmarkSet`] is produced once per processed frame by an external
//! face-mesh detector. Coordinates are image-relative fractions in `0..1`.
//! Sets are plain values: nothing is tracked across frames.

use serde::{Deserialize, Serialize};

/// Number of points a full face mesh provides
pub const MIN_LANDMARKS: usize = 468;

/// Image-relative 2D landmark point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Stand-in for a point the detector did not provide
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    /// Euclidean distance on normalized coordinates
    #[inline]
    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Ordered face mesh for a single frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point>) -> Self {
        LandmarkSet { points }
    }

    /// Point at `index`, or [`Point::ORIGIN`] when the set is too short.
    ///
    /// Short sets never fail: missing points contribute a zero offset in both axes.
    #[inline]
    pub fn point(&self, index: usize) -> Point {
        self.points.get(index).copied().unwrap_or(Point::ORIGIN)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the set carries a full mesh
    pub fn is_complete(&self) -> bool {
        self.points.len() >= MIN_LANDMARKS
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Overwrite a single point, growing the set with origin points if needed
    pub fn set_point(&mut self, index: usize, point: Point) {
        if index >= self.points.len() {
            self.points.resize(index + 1, Point::ORIGIN);
        }
        self.points[index] = point;
    }
}

impl FromIterator<Point> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        LandmarkSet::new(iter.into_iter().collect())
    }
}

/// Raw detector result for one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorResult {
    #[serde(default)]
    pub multi_face_landmarks: Option<Vec<LandmarkSet>>,
}

impl DetectorResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(face: LandmarkSet) -> Self {
        DetectorResult {
            multi_face_landmarks: Some(vec![face]),
        }
    }

    /// First detected face. A missing or empty list means no face.
    pub fn primary(&self) -> Option<&LandmarkSet> {
        self.multi_face_landmarks.as_ref()?.first()
    }

    pub fn into_primary(self) -> Option<LandmarkSet> {
        self.multi_face_landmarks?.into_iter().next()
    }
}
