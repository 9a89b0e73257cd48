use serde::{Deserialize, Serialize};

use super::cell::{Cell, Direction};
use super::grid::Board;

/// Whether a cell triggers a note this tick, and along which axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActiveState {
    #[default]
    NotActive,
    /// plays the note of the cell's row
    RowActivated,
    /// plays the note of the cell's column
    ColumnActivated,
    // never produced by `Board::active_cells`, column checks overwrite row checks
    BothActivated,
}

/// `[cols x rows]` grid of activation states, addressed as `(col, row)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveGrid {
    rows: usize,
    cols: usize,
    states: Vec<ActiveState>,
}

impl ActiveGrid {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            states: vec![ActiveState::NotActive; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, col: usize, row: usize) -> ActiveState {
        assert!(
            col < self.cols && row < self.rows,
            "active cell ({col}, {row}) out of bounds for {}x{} board",
            self.cols,
            self.rows
        );
        self.states[row * self.cols + col]
    }

    /// `(col, row, state)` for every activated cell, row by row.
    pub fn activations(&self) -> impl Iterator<Item = (usize, usize, ActiveState)> + '_ {
        let cols = self.cols;
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| **s != ActiveState::NotActive)
            .map(move |(i, s)| (i % cols, i / cols, *s))
    }

    pub fn count(&self) -> usize {
        self.activations().count()
    }
}

impl Board {
    /// Cells that hit an edge or a sound wall this tick.
    ///
    /// A cell heading left/right with the board edge or a SoundWall next to it in
    /// that direction is row-activated; up/down the same way is column-activated.
    /// Checks run left, right, up, down and the last hit wins. Recomputed on every
    /// call from the current cells.
    pub fn active_cells(&self) -> ActiveGrid {
        let mut active = ActiveGrid::new(self.rows(), self.cols());

        for (col, row, cell) in self.iter() {
            let mut state = ActiveState::NotActive;
            if self.hits_sound_edge(cell, col, row, Direction::Left) {
                state = ActiveState::RowActivated;
            }
            if self.hits_sound_edge(cell, col, row, Direction::Right) {
                state = ActiveState::RowActivated;
            }
            if self.hits_sound_edge(cell, col, row, Direction::Up) {
                state = ActiveState::ColumnActivated;
            }
            if self.hits_sound_edge(cell, col, row, Direction::Down) {
                state = ActiveState::ColumnActivated;
            }
            active.states[row * self.cols() + col] = state;
        }

        active
    }

    fn hits_sound_edge(&self, cell: &Cell, col: usize, row: usize, dir: Direction) -> bool {
        cell.is_heading(dir)
            && self
                .neighbor(col, row, dir)
                .is_none_or(|p| self[p] == Cell::SoundWall)
    }
}
