use crate::error::GridError;
use std::collections::HashSet;

/// A chessboard hypothesis: a `rows x cols` matrix of candidate indices.
///
/// `None` marks an unfilled cell. Cells are stored row-major; row `0` is the
/// seed's first row and column `0` its first column, so the layout follows
/// the orientation in which the board was discovered.
#[derive(Clone, Debug, PartialEq)]
pub struct Chessboard {
    rows: usize,
    cols: usize,
    cells: Vec<Option<usize>>,
    pub(crate) energy: f32,
}

impl Chessboard {
    /// Build a board from row-major cells. The energy starts at zero; see
    /// [`board_energy`](crate::board_energy).
    pub fn from_cells(
        rows: usize,
        cols: usize,
        cells: Vec<Option<usize>>,
    ) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::Empty { rows, cols });
        }
        if cells.len() != rows * cols {
            return Err(GridError::ShapeMismatch {
                rows,
                cols,
                expected: rows * cols,
                got: cells.len(),
            });
        }
        let mut seen = HashSet::new();
        for idx in cells.iter().flatten() {
            if !seen.insert(*idx) {
                return Err(GridError::DuplicateCandidate { index: *idx });
            }
        }
        Ok(Self {
            rows,
            cols,
            cells,
            energy: 0.0,
        })
    }

    /// 2x2 seed laid out as `[[p, a], [b, d]]`.
    pub(crate) fn seed(p: usize, a: usize, b: usize, d: usize) -> Self {
        Self {
            rows: 2,
            cols: 2,
            cells: vec![Some(p), Some(a), Some(b), Some(d)],
            energy: 0.0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col]
        } else {
            None
        }
    }

    /// Row-major cells.
    pub fn cells(&self) -> &[Option<usize>] {
        &self.cells
    }

    pub fn row(&self, row: usize) -> &[Option<usize>] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn column(&self, col: usize) -> Vec<Option<usize>> {
        (0..self.rows).map(|r| self.cells[r * self.cols + col]).collect()
    }

    /// Candidate indices of filled cells, row-major.
    pub fn filled(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.iter().flatten().copied()
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.cells.contains(&Some(idx))
    }

    /// Whether the two boards share at least one candidate.
    pub fn overlaps(&self, other: &Chessboard) -> bool {
        let mine: HashSet<usize> = self.filled().collect();
        other.filled().any(|i| mine.contains(&i))
    }

    /// New board with `row` inserted above row 0.
    pub(crate) fn with_row_on_top(&self, row: &[Option<usize>]) -> Self {
        debug_assert_eq!(row.len(), self.cols);
        let mut cells = Vec::with_capacity(self.cells.len() + self.cols);
        cells.extend_from_slice(row);
        cells.extend_from_slice(&self.cells);
        self.reshaped(self.rows + 1, self.cols, cells)
    }

    /// New board with `row` appended below the last row.
    pub(crate) fn with_row_at_bottom(&self, row: &[Option<usize>]) -> Self {
        debug_assert_eq!(row.len(), self.cols);
        let mut cells = self.cells.clone();
        cells.extend_from_slice(row);
        self.reshaped(self.rows + 1, self.cols, cells)
    }

    /// New board with `col` inserted left of column 0.
    pub(crate) fn with_col_on_left(&self, col: &[Option<usize>]) -> Self {
        debug_assert_eq!(col.len(), self.rows);
        let mut cells = Vec::with_capacity(self.cells.len() + self.rows);
        for (r, &c) in col.iter().enumerate() {
            cells.push(c);
            cells.extend_from_slice(self.row(r));
        }
        self.reshaped(self.rows, self.cols + 1, cells)
    }

    /// New board with `col` appended right of the last column.
    pub(crate) fn with_col_on_right(&self, col: &[Option<usize>]) -> Self {
        debug_assert_eq!(col.len(), self.rows);
        let mut cells = Vec::with_capacity(self.cells.len() + self.rows);
        for (r, &c) in col.iter().enumerate() {
            cells.extend_from_slice(self.row(r));
            cells.push(c);
        }
        self.reshaped(self.rows, self.cols + 1, cells)
    }

    fn reshaped(&self, rows: usize, cols: usize, cells: Vec<Option<usize>>) -> Self {
        Self {
            rows,
            cols,
            cells,
            energy: self.energy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_2x2() -> Chessboard {
        Chessboard::seed(0, 1, 2, 3)
    }

    #[test]
    fn insertion_on_every_side() {
        let g = grid_2x2();

        let top = g.with_row_on_top(&[Some(10), Some(11)]);
        assert_eq!((top.rows(), top.cols()), (3, 2));
        assert_eq!(top.row(0), &[Some(10), Some(11)]);
        assert_eq!(top.get(1, 0), Some(0));

        let bottom = g.with_row_at_bottom(&[Some(10), None]);
        assert_eq!(bottom.row(2), &[Some(10), None]);
        assert_eq!(bottom.filled_count(), 5);

        let left = g.with_col_on_left(&[Some(10), Some(11)]);
        assert_eq!((left.rows(), left.cols()), (2, 3));
        assert_eq!(left.row(1), &[Some(11), Some(2), Some(3)]);

        let right = g.with_col_on_right(&[Some(10), Some(11)]);
        assert_eq!(right.column(2), vec![Some(10), Some(11)]);
        assert_eq!(right.get(0, 1), Some(1));
    }

    #[test]
    fn explicit_cells_are_validated() {
        assert_eq!(
            Chessboard::from_cells(2, 2, vec![Some(0)]),
            Err(GridError::ShapeMismatch {
                rows: 2,
                cols: 2,
                expected: 4,
                got: 1
            })
        );
        assert!(matches!(
            Chessboard::from_cells(0, 3, vec![]),
            Err(GridError::Empty { .. })
        ));
        assert_eq!(
            Chessboard::from_cells(1, 3, vec![Some(4), None, Some(4)]),
            Err(GridError::DuplicateCandidate { index: 4 })
        );
    }

    #[test]
    fn overlap_is_any_shared_candidate() {
        let a = grid_2x2();
        let b = Chessboard::seed(3, 7, 8, 9);
        let c = Chessboard::seed(4, 5, 6, 7);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.contains(2) && !a.contains(9));
        assert_eq!(a.get(5, 0), None);
    }
}
