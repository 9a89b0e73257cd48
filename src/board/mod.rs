mod active;
mod cell;
mod grid;
mod transition;

pub use active::{ActiveGrid, ActiveState};
pub use cell::{Cell, CellState, Direction, PALETTE_STATES};
pub use grid::Board;
