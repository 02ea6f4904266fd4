//! Board energy `E = -n + λ·n·S`.
//!
//! `n` counts filled cells and `S` is the worst collinearity/spacing
//! defect over every three consecutive cells of any row or column:
//! `|x1 + x3 - 2·x2| / |x1 - x3|`. A perfect grid has `S = 0`, so energy
//! falls by one per corner; a single badly placed corner raises the
//! energy of the whole board. Lower is better.

use crate::grid::Chessboard;
use cbdetect_corners::CandidateSet;
use nalgebra::Point2;

/// Structure term `S` of a board. Triples containing an unfilled cell are
/// skipped; a triple whose outer corners coincide is infinitely bad.
pub fn structure_term(board: &Chessboard, candidates: &CandidateSet) -> f32 {
    let pos = |cell: Option<usize>| cell.map(|i| candidates.position(i));
    let mut worst = 0.0f32;

    for r in 0..board.rows() {
        for c in 2..board.cols() {
            let triple = [
                pos(board.get(r, c - 2)),
                pos(board.get(r, c - 1)),
                pos(board.get(r, c)),
            ];
            worst = worst.max(triple_defect(triple));
        }
    }
    for c in 0..board.cols() {
        for r in 2..board.rows() {
            let triple = [
                pos(board.get(r - 2, c)),
                pos(board.get(r - 1, c)),
                pos(board.get(r, c)),
            ];
            worst = worst.max(triple_defect(triple));
        }
    }
    worst
}

fn triple_defect(triple: [Option<Point2<f32>>; 3]) -> f32 {
    let [Some(x1), Some(x2), Some(x3)] = triple else {
        return 0.0;
    };
    let span = (x1 - x3).norm();
    if span <= f32::EPSILON {
        return f32::INFINITY;
    }
    let bend = (x1.coords + x3.coords - 2.0 * x2.coords).norm();
    bend / span
}

/// Energy of a board with structure weight λ. A degenerate board
/// (infinite `S`) has infinite energy for any λ.
pub fn board_energy(board: &Chessboard, candidates: &CandidateSet, structure_weight: f32) -> f32 {
    let n = board.filled_count() as f32;
    let s = structure_term(board, candidates);
    if s.is_infinite() {
        return f32::INFINITY;
    }
    -n + structure_weight * n * s
}

/// Recompute and store the energy of `board`.
pub(crate) fn update_energy(board: &mut Chessboard, candidates: &CandidateSet, structure_weight: f32) {
    board.energy = board_energy(board, candidates, structure_weight);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use cbdetect_core::CornerCandidate;
    use nalgebra::Vector2;

    fn set(points: &[(f32, f32)]) -> CandidateSet {
        CandidateSet::new(
            points
                .iter()
                .map(|&(x, y)| {
                    CornerCandidate::new(
                        Point2::new(x, y),
                        1.0,
                        Vector2::new(1.0, 0.0),
                        Vector2::new(0.0, 1.0),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn perfect_grid_energy_is_minus_count() {
        let cands = set(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (20.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (20.0, 10.0),
        ]);
        let board = Chessboard::from_cells(2, 3, (0..6).map(Some).collect()).unwrap();
        assert_abs_diff_eq!(structure_term(&board, &cands), 0.0);
        assert_abs_diff_eq!(board_energy(&board, &cands, 0.6), -6.0);
    }

    #[test]
    fn bent_row_is_penalised() {
        // middle corner pushed 2 px off the line: S = |(0, -4)| / 20
        let cands = set(&[(0.0, 0.0), (10.0, 2.0), (20.0, 0.0)]);
        let board = Chessboard::from_cells(1, 3, (0..3).map(Some).collect()).unwrap();
        assert_abs_diff_eq!(structure_term(&board, &cands), 0.2, epsilon = 1e-6);
        assert_abs_diff_eq!(board_energy(&board, &cands, 0.6), -3.0 + 0.6 * 3.0 * 0.2, epsilon = 1e-5);
    }

    #[test]
    fn triples_with_holes_are_skipped() {
        let cands = set(&[(0.0, 0.0), (10.0, 5.0), (20.0, 0.0), (30.0, 0.0)]);
        let board =
            Chessboard::from_cells(1, 5, vec![Some(0), None, Some(2), Some(3), None]).unwrap();
        assert_abs_diff_eq!(structure_term(&board, &cands), 0.0);
        assert_abs_diff_eq!(board_energy(&board, &cands, 0.6), -3.0);
    }

    #[test]
    fn coincident_triple_is_infinitely_bad_at_any_weight() {
        let cands = set(&[(0.0, 0.0), (10.0, 0.0), (0.0, 0.0)]);
        let board = Chessboard::from_cells(1, 3, (0..3).map(Some).collect()).unwrap();
        assert!(structure_term(&board, &cands).is_infinite());
        for weight in [0.0, 0.6] {
            assert_eq!(board_energy(&board, &cands, weight), f32::INFINITY);
        }
    }

    #[test]
    fn seed_has_no_structure_term() {
        let cands = set(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (13.0, 9.0)]);
        let board = Chessboard::seed(0, 1, 2, 3);
        assert_abs_diff_eq!(board_energy(&board, &cands, 0.6), -4.0);
    }
}
