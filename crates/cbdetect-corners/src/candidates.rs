use cbdetect_core::CornerCandidate;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point2;
use std::fmt;

/// Corner candidates of one image with a spatial index over their positions.
///
/// Candidates are ordered by descending score; indices into this order are
/// what chessboards store. The set is immutable once built.
pub struct CandidateSet {
    candidates: Vec<CornerCandidate>,
    tree: KdTree<f32, 2>,
}

impl CandidateSet {
    pub fn new(candidates: Vec<CornerCandidate>) -> Self {
        let coords: Vec<[f32; 2]> = candidates
            .iter()
            .map(|c| [c.position.x, c.position.y])
            .collect();
        let tree: KdTree<f32, 2> = (&coords).into();
        Self { candidates, tree }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&CornerCandidate> {
        self.candidates.get(idx)
    }

    pub fn candidates(&self) -> &[CornerCandidate] {
        &self.candidates
    }

    /// Position of candidate `idx`. Panics on an out-of-range index.
    #[inline]
    pub fn position(&self, idx: usize) -> Point2<f32> {
        self.candidates[idx].position
    }

    /// All candidates within `radius` of `p` as `(index, distance)`, nearest
    /// first.
    pub fn within(&self, p: Point2<f32>, radius: f32) -> Vec<(usize, f32)> {
        if self.is_empty() || radius <= 0.0 {
            return Vec::new();
        }
        self.tree
            .within::<SquaredEuclidean>(&[p.x, p.y], radius * radius)
            .into_iter()
            .map(|nn| (nn.item as usize, nn.distance.sqrt()))
            .collect()
    }

    /// The `k` candidates closest to `p` as `(index, distance)`, nearest first.
    pub fn nearest_n(&self, p: Point2<f32>, k: usize) -> Vec<(usize, f32)> {
        if self.is_empty() || k == 0 {
            return Vec::new();
        }
        self.tree
            .nearest_n::<SquaredEuclidean>(&[p.x, p.y], k)
            .into_iter()
            .map(|nn| (nn.item as usize, nn.distance.sqrt()))
            .collect()
    }

    pub fn into_candidates(self) -> Vec<CornerCandidate> {
        self.candidates
    }
}

impl Clone for CandidateSet {
    fn clone(&self) -> Self {
        Self::new(self.candidates.clone())
    }
}

impl fmt::Debug for CandidateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateSet")
            .field("candidates", &self.candidates)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    fn at(x: f32, y: f32) -> CornerCandidate {
        CornerCandidate::new(
            Point2::new(x, y),
            0.5,
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        )
    }

    #[test]
    fn radius_query_is_sorted_by_distance() {
        let set = CandidateSet::new(vec![at(0.0, 0.0), at(10.0, 0.0), at(3.0, 4.0), at(1.0, 0.0)]);
        let hits = set.within(Point2::new(0.0, 0.0), 5.5);
        let idx: Vec<usize> = hits.iter().map(|h| h.0).collect();
        assert_eq!(idx, vec![0, 3, 2]);
        assert!((hits[2].1 - 5.0).abs() < 1e-5);
    }

    #[test]
    fn nearest_n_caps_the_result() {
        let set = CandidateSet::new(vec![at(0.0, 0.0), at(10.0, 0.0), at(3.0, 4.0)]);
        let hits = set.nearest_n(Point2::new(9.0, 0.0), 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, 1);
        assert_eq!(hits[1].0, 2);
    }

    #[test]
    fn empty_set_answers_nothing() {
        let set = CandidateSet::new(Vec::new());
        assert!(set.is_empty());
        assert!(set.within(Point2::new(0.0, 0.0), 100.0).is_empty());
        assert!(set.nearest_n(Point2::new(0.0, 0.0), 3).is_empty());
        assert_eq!(set.clone().len(), 0);
    }
}
