use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// A detected saddle point with its score and the two edge directions
/// meeting at it.
///
/// Direction convention (applied by the detector):
/// - `v1.x + v1.y >= 0`;
/// - `(v1, v2)` is right-handed: `v2 · (v1.y, -v1.x) <= 0`.
///
/// This leaves four instead of eight sign/permutation ambiguities between
/// neighbouring corners on the same board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CornerCandidate {
    /// Sub-pixel position; pixel `(x, y)` has its centre at `(x, y)`.
    pub position: Point2<f32>,

    /// Corner score in `[0, 1]`, higher is stronger.
    pub score: f32,

    /// First edge direction (unit vector).
    pub v1: Vector2<f32>,

    /// Second edge direction (unit vector).
    pub v2: Vector2<f32>,
}

impl CornerCandidate {
    pub fn new(position: Point2<f32>, score: f32, v1: Vector2<f32>, v2: Vector2<f32>) -> Self {
        Self {
            position,
            score,
            v1,
            v2,
        }
    }

    /// Flip `v1`/`v2` signs into the canonical convention.
    pub fn canonicalize_directions(&mut self) {
        if self.v1.x + self.v1.y < 0.0 {
            self.v1 = -self.v1;
        }
        let n1 = Vector2::new(self.v1.y, -self.v1.x);
        if n1.dot(&self.v2) > 0.0 {
            self.v2 = -self.v2;
        }
    }
}
