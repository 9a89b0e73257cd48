use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Direction};
use crate::error::BoardError;

/// The Otomata grid. Cells are stored row-major and addressed as `(col, row)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardRepr", into = "BoardRepr")]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

// serde goes through this so a loaded board always has rows * cols cells
#[derive(Serialize, Deserialize)]
struct BoardRepr {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl TryFrom<BoardRepr> for Board {
    type Error = BoardError;

    fn try_from(repr: BoardRepr) -> Result<Self, Self::Error> {
        Board::from_cells(repr.rows, repr.cols, repr.cells)
    }
}

impl From<Board> for BoardRepr {
    fn from(board: Board) -> Self {
        BoardRepr {
            rows: board.rows,
            cols: board.cols,
            cells: board.cells,
        }
    }
}

impl Board {
    /// Empty board, every cell dead.
    ///
    /// Panics if either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows >= 1 && cols >= 1, "board must be at least 1x1, got {rows}x{cols}");
        Self {
            rows,
            cols,
            cells: vec![Cell::Dead; rows * cols],
        }
    }

    /// Board from pre-populated cells in row-major order (row 0 first).
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<Cell>) -> Result<Self, BoardError> {
        if rows == 0 || cols == 0 {
            return Err(BoardError::EmptyDimensions { rows, cols });
        }
        if cells.len() != rows * cols {
            return Err(BoardError::CellCount {
                rows,
                cols,
                found: cells.len(),
            });
        }
        if let Some(i) = cells.iter().position(Cell::is_empty_merge) {
            return Err(BoardError::EmptyMerge {
                col: i % cols,
                row: i / cols,
            });
        }
        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Iterates `(col, row, cell)` row by row.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (i % cols, i / cols, cell))
    }

    pub fn get(&self, col: usize, row: usize) -> Option<&Cell> {
        if col < self.cols && row < self.rows {
            Some(&self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, col: usize, row: usize, cell: Cell) {
        self[(col, row)] = cell;
    }

    /// Position one step from `(col, row)` in `dir`, or `None` past the edge.
    pub fn neighbor(&self, col: usize, row: usize, dir: Direction) -> Option<(usize, usize)> {
        let (dc, dr) = dir.offset();
        let c = col.checked_add_signed(dc)?;
        let r = row.checked_add_signed(dr)?;
        (c < self.cols && r < self.rows).then_some((c, r))
    }

    /// Every cell dies; size is kept.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Dead);
    }

    /// Reallocates to `rows x cols`, keeping the overlapping top-left region.
    /// Cells outside the overlap are dropped and don't come back on a later grow.
    pub fn change_size(&mut self, rows: usize, cols: usize) {
        let mut resized = Board::new(rows, cols);
        let keep_rows = rows.min(self.rows);
        let keep_cols = cols.min(self.cols);

        let dropped = self
            .iter()
            .filter(|(c, r, cell)| (*c >= keep_cols || *r >= keep_rows) && !cell.is_dead())
            .count();
        if dropped > 0 {
            tracing::debug!(dropped, from = ?(self.rows, self.cols), to = ?(rows, cols), "resize dropped live cells");
        }

        for row in 0..keep_rows {
            for col in 0..keep_cols {
                resized[(col, row)] = std::mem::take(&mut self[(col, row)]);
            }
        }
        *self = resized;
    }

    /// Live (non-dead) cell count, handy for logging.
    pub fn live_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_dead()).count()
    }

    #[inline]
    fn offset(&self, col: usize, row: usize) -> usize {
        // never clamp or wrap: a bad coordinate is a caller bug
        assert!(
            col < self.cols && row < self.rows,
            "cell ({col}, {row}) out of bounds for {}x{} board",
            self.cols,
            self.rows
        );
        row * self.cols + col
    }
}

impl Index<(usize, usize)> for Board {
    type Output = Cell;

    fn index(&self, (col, row): (usize, usize)) -> &Cell {
        &self.cells[self.offset(col, row)]
    }
}

impl IndexMut<(usize, usize)> for Board {
    fn index_mut(&mut self, (col, row): (usize, usize)) -> &mut Cell {
        let i = self.offset(col, row);
        &mut self.cells[i]
    }
}
