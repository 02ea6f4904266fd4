//! Growing a board by one row or column at a time.

use crate::energy::update_energy;
use crate::geom::wrap_angle;
use crate::grid::Chessboard;
use crate::params::ChessboardParams;
use cbdetect_corners::CandidateSet;
use log::trace;
use nalgebra::{Point2, Vector2};
use std::collections::HashSet;

/// Border of a board a new row or column can be attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Bottom => 1,
            Side::Left => 2,
            Side::Right => 3,
        }
    }
}

/// A predicted corner position with the step length it was extrapolated
/// with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    pub position: Point2<f32>,
    pub step: f32,
}

/// Extrapolate one step past `p3` from the three last corners of a line
/// (`p1` farthest from the border).
///
/// The step direction continues its angular trend (`a3 = 2·a2 - a1`) and the
/// step length its ratio trend (`s3 = s2 · s2/s1`, ratio clamped to
/// `[0.5, 2]`).
pub fn predict_from_three(p1: Point2<f32>, p2: Point2<f32>, p3: Point2<f32>) -> Option<Prediction> {
    let d1 = p2 - p1;
    let d2 = p3 - p2;
    let (s1, s2) = (d1.norm(), d2.norm());
    if s1 <= f32::EPSILON || s2 <= f32::EPSILON {
        return None;
    }
    let a1 = d1.y.atan2(d1.x);
    let a2 = d2.y.atan2(d2.x);
    let a3 = a2 + wrap_angle(a2 - a1);
    let s3 = s2 * (s2 / s1).clamp(0.5, 2.0);
    Some(Prediction {
        position: p3 + s3 * Vector2::new(a3.cos(), a3.sin()),
        step: s3,
    })
}

/// Linear extrapolation one step past `p2`.
pub fn predict_from_two(p1: Point2<f32>, p2: Point2<f32>) -> Option<Prediction> {
    let d = p2 - p1;
    let step = d.norm();
    if step <= f32::EPSILON {
        return None;
    }
    Some(Prediction {
        position: p2 + d,
        step,
    })
}

/// Line of cells running into `side`, ordered away from it: element 0 is
/// the cell on the border.
fn line_towards(board: &Chessboard, side: Side, k: usize) -> Vec<Option<usize>> {
    match side {
        Side::Top => (0..board.rows()).map(|r| board.get(r, k)).collect(),
        Side::Bottom => (0..board.rows()).rev().map(|r| board.get(r, k)).collect(),
        Side::Left => board.row(k).to_vec(),
        Side::Right => board.row(k).iter().rev().copied().collect(),
    }
}

/// One predicted corner per row (`Left`/`Right`) or column (`Top`/`Bottom`)
/// beyond `side`. `None` if any line lacks the corners to extrapolate from.
pub fn predict(
    board: &Chessboard,
    candidates: &CandidateSet,
    side: Side,
) -> Option<Vec<Prediction>> {
    let lines = match side {
        Side::Top | Side::Bottom => board.cols(),
        Side::Left | Side::Right => board.rows(),
    };
    (0..lines)
        .map(|k| {
            let line = line_towards(board, side, k);
            let pos = |i: usize| line.get(i).copied().flatten().map(|c| candidates.position(c));
            match line.len() {
                0 | 1 => None,
                2 => predict_from_two(pos(1)?, pos(0)?),
                _ => predict_from_three(pos(2)?, pos(1)?, pos(0)?),
            }
        })
        .collect()
}

/// Match every prediction to a distinct candidate not yet in `board`.
///
/// Each prediction may only take candidates within
/// `search_radius_rel · step`. Pairs are assigned globally closest first.
/// All-or-nothing: `None` unless every prediction is matched.
pub fn assign(
    predictions: &[Prediction],
    candidates: &CandidateSet,
    board: &Chessboard,
    search_radius_rel: f32,
) -> Option<Vec<usize>> {
    let used: HashSet<usize> = board.filled().collect();
    let mut pairs: Vec<(f32, usize, usize)> = Vec::new();
    for (i, pred) in predictions.iter().enumerate() {
        let radius = search_radius_rel * pred.step;
        for (j, dist) in candidates.within(pred.position, radius) {
            if !used.contains(&j) {
                pairs.push((dist, i, j));
            }
        }
    }
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut matched: Vec<Option<usize>> = vec![None; predictions.len()];
    let mut taken = HashSet::new();
    for (_, i, j) in pairs {
        if matched[i].is_none() && !taken.contains(&j) {
            matched[i] = Some(j);
            taken.insert(j);
        }
    }
    matched.into_iter().collect()
}

/// Grow `board` by one line on `side`, with its energy updated.
///
/// `None` when the board would exceed `max_grid_dim` or some predicted
/// corner has no match.
pub fn propose(
    board: &Chessboard,
    candidates: &CandidateSet,
    side: Side,
    params: &ChessboardParams,
) -> Option<Chessboard> {
    let too_big = match side {
        Side::Top | Side::Bottom => board.rows() + 1 > params.max_grid_dim,
        Side::Left | Side::Right => board.cols() + 1 > params.max_grid_dim,
    };
    if too_big {
        return None;
    }

    let predictions = predict(board, candidates, side)?;
    let matched = assign(&predictions, candidates, board, params.search_radius_rel)?;
    let line: Vec<Option<usize>> = matched.into_iter().map(Some).collect();

    let mut grown = match side {
        Side::Top => board.with_row_on_top(&line),
        Side::Bottom => board.with_row_at_bottom(&line),
        Side::Left => board.with_col_on_left(&line),
        Side::Right => board.with_col_on_right(&line),
    };
    update_energy(&mut grown, candidates, params.structure_weight);
    Some(grown)
}

/// Grow a seeded board until no side offers an energy improvement.
///
/// Each round evaluates every side that has not failed yet and keeps the
/// lowest-energy proposal if it beats the current energy. A side whose
/// proposal fails is not tried again: a later growth step only adds
/// predictions to it.
pub fn grow(mut board: Chessboard, candidates: &CandidateSet, params: &ChessboardParams) -> Chessboard {
    update_energy(&mut board, candidates, params.structure_weight);
    let mut exhausted = [false; 4];

    loop {
        let mut best: Option<Chessboard> = None;
        for side in Side::ALL {
            if exhausted[side.index()] {
                continue;
            }
            match propose(&board, candidates, side, params) {
                Some(next) => {
                    if best.as_ref().is_none_or(|b| next.energy() < b.energy()) {
                        best = Some(next);
                    }
                }
                None => {
                    trace!("side {side:?} exhausted at {}x{}", board.rows(), board.cols());
                    exhausted[side.index()] = true;
                }
            }
        }

        match best {
            Some(next) if next.energy() < board.energy() => board = next,
            _ => break,
        }
    }
    board
}
