//! 2x2 seed grids around a single corner.

use crate::geom::{along_and_across, relative_spread};
use crate::grid::Chessboard;
use crate::params::ChessboardParams;
use cbdetect_corners::CandidateSet;
use log::trace;
use nalgebra::Vector2;

/// Penalty on the perpendicular offset when ranking directional neighbours.
const ACROSS_PENALTY: f32 = 5.0;

/// Closest candidate ahead of `from` along the unit direction `dir`.
///
/// Among the `k` nearest candidates, those strictly ahead (positive
/// projection onto `dir`) and not listed in `exclude` are ranked by
/// `along + 5 · across`.
pub fn directional_neighbor(
    candidates: &CandidateSet,
    from: usize,
    dir: Vector2<f32>,
    exclude: &[usize],
    k: usize,
) -> Option<usize> {
    let origin = candidates.position(from);
    let mut best: Option<(f32, usize)> = None;
    // +1: the query point itself is among the nearest
    for (j, _) in candidates.nearest_n(origin, k + 1) {
        if j == from || exclude.contains(&j) {
            continue;
        }
        let (along, across) = along_and_across(candidates.position(j) - origin, dir);
        if along <= 0.0 {
            continue;
        }
        let cost = along + ACROSS_PENALTY * across;
        if best.is_none_or(|(c, _)| cost < c) {
            best = Some((cost, j));
        }
    }
    best.map(|(_, j)| j)
}

/// Build the seed `[[p, a], [b, d]]` for candidate `p`.
///
/// `a` lies along `+v1(p)`, `b` along `+v2(p)` and `d` along `+v2(p)` from
/// `a`. The four corners must form a near-parallelogram with consistent
/// spacing along each direction.
pub fn init_seed(
    candidates: &CandidateSet,
    p: usize,
    params: &ChessboardParams,
) -> Option<Chessboard> {
    let corner = candidates.get(p)?;
    let (v1, v2) = (corner.v1, corner.v2);
    let k = params.seed_neighbors;

    let a = directional_neighbor(candidates, p, v1, &[], k)?;
    let b = directional_neighbor(candidates, p, v2, &[a], k)?;
    let d = directional_neighbor(candidates, a, v2, &[p, b], k)?;

    let [pp, pa, pb, pd] = [p, a, b, d].map(|i| candidates.position(i));
    let e_pa = pa - pp;
    let e_bd = pd - pb;
    let e_pb = pb - pp;
    let e_ad = pd - pa;

    let lengths = [e_pa.norm(), e_bd.norm(), e_pb.norm(), e_ad.norm()];
    let mean_edge = lengths.iter().sum::<f32>() / 4.0;
    if mean_edge <= f32::EPSILON {
        return None;
    }

    let tol = params.seed_parallelogram_tolerance * mean_edge;
    if (e_pa - e_bd).norm() > tol || (e_pb - e_ad).norm() > tol {
        trace!("seed {p}: not a parallelogram");
        return None;
    }

    if relative_spread(&lengths[..2]) > params.seed_spacing_tolerance
        || relative_spread(&lengths[2..]) > params.seed_spacing_tolerance
    {
        trace!("seed {p}: inconsistent spacing {lengths:?}");
        return None;
    }

    Some(Chessboard::seed(p, a, b, d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbdetect_core::CornerCandidate;
    use nalgebra::Point2;

    fn lattice(cols: usize, rows: usize, step: f32) -> CandidateSet {
        let mut out = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                out.push(CornerCandidate::new(
                    Point2::new(10.0 + c as f32 * step, 10.0 + r as f32 * step),
                    1.0,
                    Vector2::new(1.0, 0.0),
                    Vector2::new(0.0, 1.0),
                ));
            }
        }
        CandidateSet::new(out)
    }

    #[test]
    fn neighbour_ahead_is_preferred_over_diagonal() {
        let cands = lattice(3, 3, 20.0);
        let right = directional_neighbor(&cands, 4, Vector2::new(1.0, 0.0), &[], 12);
        assert_eq!(right, Some(5));
        let left = directional_neighbor(&cands, 4, Vector2::new(-1.0, 0.0), &[], 12);
        assert_eq!(left, Some(3));
        let nothing = directional_neighbor(&cands, 2, Vector2::new(1.0, 0.0), &[], 12);
        assert_eq!(nothing, None);
    }

    #[test]
    fn seed_on_a_regular_lattice() {
        let cands = lattice(3, 3, 20.0);
        let seed = init_seed(&cands, 0, &ChessboardParams::default()).unwrap();
        assert_eq!(seed.cells(), &[Some(0), Some(1), Some(3), Some(4)]);
    }

    #[test]
    fn seed_rejects_a_skewed_quad() {
        let mut pts: Vec<CornerCandidate> = lattice(2, 2, 20.0).into_candidates();
        // stretch d far out along v1: opposite edges disagree
        pts[3].position = Point2::new(45.0, 30.0);
        let cands = CandidateSet::new(pts);
        assert!(init_seed(&cands, 0, &ChessboardParams::default()).is_none());
    }

    #[test]
    fn corner_at_the_far_edge_has_no_seed() {
        let cands = lattice(3, 3, 20.0);
        assert!(init_seed(&cands, 8, &ChessboardParams::default()).is_none());
    }
}
