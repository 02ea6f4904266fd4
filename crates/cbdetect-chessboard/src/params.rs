use serde::{Deserialize, Serialize};

/// Parameters of the chessboard grower.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChessboardParams {
    /// Weight λ of the structure term in `E = -n + λ·n·S`. Larger values
    /// tolerate less deviation from straight, evenly spaced lines.
    pub structure_weight: f32,

    /// Candidates examined around a corner when looking for its seed
    /// neighbours.
    pub seed_neighbors: usize,

    /// Maximal `std / mean` of the two seed edge lengths along one direction.
    pub seed_spacing_tolerance: f32,

    /// Maximal parallelogram mismatch of a seed relative to its mean edge
    /// length.
    pub seed_parallelogram_tolerance: f32,

    /// Search radius around a predicted corner, relative to the local step
    /// length.
    pub search_radius_rel: f32,

    /// Largest number of rows or columns a grid may grow to.
    pub max_grid_dim: usize,

    /// Grown grids with energy at or above this are discarded.
    pub accept_energy: f32,

    /// Keep at most this many grids after ranking.
    pub max_grids: Option<usize>,
}

impl Default for ChessboardParams {
    fn default() -> Self {
        Self {
            structure_weight: 0.6,
            seed_neighbors: 12,
            seed_spacing_tolerance: 0.3,
            seed_parallelogram_tolerance: 0.3,
            search_radius_rel: 0.35,
            max_grid_dim: 100,
            accept_energy: -10.0,
            max_grids: None,
        }
    }
}
