use crate::grid::Chessboard;
use crate::grow::grow;
use crate::params::ChessboardParams;
use crate::seed::init_seed;
use cbdetect_corners::CandidateSet;
use log::{debug, info};
use std::cmp::Ordering;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Grows chessboards from every corner candidate and keeps the best
/// non-overlapping ones.
#[derive(Clone, Debug, Default)]
pub struct ChessboardGrower {
    pub params: ChessboardParams,
}

/// A grid surviving overlap resolution, with the seed it was grown from.
#[derive(Clone, Debug)]
struct Accepted {
    board: Chessboard,
    seed: usize,
}

impl ChessboardGrower {
    pub fn new(params: ChessboardParams) -> Self {
        Self { params }
    }

    /// Seed at candidate `seed`, grow, and keep the result if its energy is
    /// below the acceptance threshold.
    pub fn grow_from(&self, candidates: &CandidateSet, seed: usize) -> Option<Chessboard> {
        let board = init_seed(candidates, seed, &self.params)?;
        let board = grow(board, candidates, &self.params);
        if board.energy() < self.params.accept_energy {
            debug!(
                "seed {seed}: grew {}x{} board, energy {:.3}",
                board.rows(),
                board.cols(),
                board.energy()
            );
            Some(board)
        } else {
            None
        }
    }

    /// All accepted boards, best first (ascending energy, then more cells,
    /// then discovery order). Boards never share a candidate.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, candidates), fields(candidates = candidates.len()))
    )]
    pub fn detect(&self, candidates: &CandidateSet) -> Vec<Chessboard> {
        let n = candidates.len();

        #[cfg(feature = "rayon")]
        let grown: Vec<Option<Chessboard>> = (0..n)
            .into_par_iter()
            .map(|i| self.grow_from(candidates, i))
            .collect();

        #[cfg(not(feature = "rayon"))]
        let grown: Vec<Option<Chessboard>> = (0..n).map(|i| self.grow_from(candidates, i)).collect();

        let mut accepted: Vec<Accepted> = Vec::new();
        for (seed, board) in grown.into_iter().enumerate() {
            if let Some(board) = board {
                resolve_overlap(&mut accepted, Accepted { board, seed });
            }
        }

        accepted.sort_by(rank);
        let mut boards: Vec<Chessboard> = accepted.into_iter().map(|a| a.board).collect();
        if let Some(max) = self.params.max_grids {
            boards.truncate(max);
        }

        info!("{} chessboard(s) from {} candidates", boards.len(), n);
        boards
    }
}

/// `a` replaces `b`: lower energy, or equal energy and more cells.
fn beats(a: &Chessboard, b: &Chessboard) -> bool {
    match a.energy().partial_cmp(&b.energy()) {
        Some(Ordering::Less) => true,
        Some(Ordering::Equal) => a.filled_count() > b.filled_count(),
        _ => false,
    }
}

/// Insert `new` unless it loses against any board it overlaps; if it wins
/// against all of them, they are dropped.
fn resolve_overlap(accepted: &mut Vec<Accepted>, new: Accepted) {
    let overlapping: Vec<usize> = accepted
        .iter()
        .enumerate()
        .filter(|(_, a)| a.board.overlaps(&new.board))
        .map(|(i, _)| i)
        .collect();

    if !overlapping.iter().all(|&i| beats(&new.board, &accepted[i].board)) {
        return;
    }
    for &i in overlapping.iter().rev() {
        accepted.remove(i);
    }
    accepted.push(new);
}

fn rank(a: &Accepted, b: &Accepted) -> Ordering {
    a.board
        .energy()
        .total_cmp(&b.board.energy())
        .then(b.board.filled_count().cmp(&a.board.filled_count()))
        .then(a.seed.cmp(&b.seed))
}
