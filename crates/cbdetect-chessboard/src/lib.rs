//! Chessboard grid recovery from saddle-point corner candidates.
//!
//! Algorithm:
//! 1. For every candidate, build a 2x2 seed from its nearest neighbours
//!    along its own two edge directions; reject seeds that are not close to
//!    a parallelogram.
//! 2. Grow each seed one row or column at a time. On every side, each
//!    border line predicts the next corner (angular and geometric
//!    extrapolation of its last steps) and the predictions are matched to
//!    unused candidates. A side only grows if every prediction is matched.
//! 3. Among the side proposals, the one with the lowest energy
//!    `E = -n + λ·n·S` is accepted while it improves the energy.
//! 4. Boards with `E` above an acceptance threshold are dropped; the rest
//!    compete for shared candidates, and the survivors are ranked by
//!    energy.

mod detector;
mod energy;
mod error;
mod geom;
mod grid;
mod grow;
mod params;
mod seed;

pub use detector::ChessboardGrower;
pub use energy::{board_energy, structure_term};
pub use error::GridError;
pub use grid::Chessboard;
pub use grow::{assign, grow, predict, predict_from_three, predict_from_two, propose, Prediction, Side};
pub use params::ChessboardParams;
pub use seed::{directional_neighbor, init_seed};
