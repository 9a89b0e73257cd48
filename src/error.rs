//! Error types for board construction, board files, otomata urls and midi export.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("board must be at least 1x1, got {rows}x{cols}")]
    EmptyDimensions { rows: usize, cols: usize },

    #[error("{found} cells do not fill a {rows}x{cols} board")]
    CellCount { rows: usize, cols: usize, found: usize },

    #[error("merged cell at ({col}, {row}) holds no tokens")]
    EmptyMerge { col: usize, row: usize },
}

/// Errors reading a board file.
#[derive(Debug, Error)]
pub enum BoardFileError {
    #[error("file is empty")]
    Empty,

    #[error("invalid value for '{key}': {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("[cells] section found before rows/cols were set")]
    MissingDimensions,

    #[error("no [cells] section")]
    MissingCells,

    #[error("expected {expected} rows of cells, found {found}")]
    MissingRows { expected: usize, found: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength { row: usize, expected: usize, found: usize },

    #[error("invalid cell {value:?} at ({col}, {row})")]
    InvalidCell { col: usize, row: usize, value: String },

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("invalid json board: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum OtomataUrlError {
    #[error("url has no q= parameter")]
    MissingQuery,

    #[error("query {0:?} is not made of 2-character pairs")]
    OddLength(String),

    #[error("invalid column {0:?}")]
    InvalidColumn(char),

    #[error("invalid row/state character {0:?}")]
    InvalidRowState(char),
}

#[derive(Debug, Error)]
pub enum MidiFileError {
    #[error("I/O error writing midi file: {0}")]
    Io(#[from] std::io::Error),
}
