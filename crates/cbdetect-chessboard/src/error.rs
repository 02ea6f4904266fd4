use thiserror::Error;

/// Errors building a [`Chessboard`](crate::Chessboard) from explicit cells.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid must have at least one row and one column (got {rows}x{cols})")]
    Empty { rows: usize, cols: usize },

    #[error("{rows}x{cols} grid needs {expected} cells, got {got}")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
        got: usize,
    },

    #[error("candidate {index} appears more than once")]
    DuplicateCandidate { index: usize },
}
