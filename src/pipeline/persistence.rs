// loading and saving board files; `.json` gets serde, anything else the key=value text format:
//
//   rows=9
//   cols=9
//   noteduration=500
//   ...
//   [cells]
//   5,5,1,5,...        one line per row, cell codes separated by commas
//   5,4_0_2,5,...      a merged cell is 4 followed by its directions

use std::fmt::Write as _;
use std::path::Path;

use crate::board::{Board, Cell, CellState, Direction};
use crate::error::BoardFileError;
use crate::pipeline::settings::BoardSettings;

const CELLS_HEADER: &str = "[cells]";

pub fn load_board_file(path: &Path) -> Result<BoardSettings, BoardFileError> {
    let data = std::fs::read_to_string(path)?;
    if is_json(path) {
        Ok(serde_json::from_str(&data)?)
    } else {
        from_text(&data)
    }
}

// Save the settings, making parent directories if they don't exist already
pub fn save_board_file(path: &Path, settings: &BoardSettings) -> Result<(), BoardFileError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let data = if is_json(path) {
        serde_json::to_string_pretty(settings)?
    } else {
        to_text(settings)
    };
    std::fs::write(path, data)?;
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

pub fn to_text(settings: &BoardSettings) -> String {
    let board = &settings.board;
    let mut out = String::new();
    // writing into a String can't fail
    let _ = writeln!(out, "boardType=otomata");
    let _ = writeln!(out, "rows={}", board.rows());
    let _ = writeln!(out, "cols={}", board.cols());
    let _ = writeln!(out, "noteduration={}", settings.note_duration_ms);
    let _ = writeln!(out, "instrument={}", settings.instrument);
    let _ = writeln!(out, "speed={}", settings.speed_ms);
    let _ = writeln!(out, "notes={}", settings.notes_string());
    let _ = writeln!(out, "usesamples={}", if settings.use_samples { 1 } else { 0 });
    let _ = writeln!(out, "sample={}", settings.sample);
    let _ = writeln!(out, "volume={}", settings.volume);
    let _ = writeln!(out, "{CELLS_HEADER}");

    for row in 0..board.rows() {
        let line: Vec<String> = (0..board.cols())
            .map(|col| encode_cell(&board[(col, row)]))
            .collect();
        let _ = writeln!(out, "{}", line.join(","));
    }
    out
}

pub fn from_text(text: &str) -> Result<BoardSettings, BoardFileError> {
    let lines: Vec<&str> = text
        .split(['\r', '\n'])
        .filter(|l| !l.trim().is_empty())
        .collect();
    if lines.is_empty() {
        return Err(BoardFileError::Empty);
    }

    // keys missing from older files keep their defaults (volume = 64)
    let mut settings = BoardSettings::default();
    let mut rows = 0usize;
    let mut cols = 0usize;
    let mut cells: Option<Vec<Cell>> = None;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        i += 1;

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim();
            match key.trim().to_lowercase().as_str() {
                "rows" => rows = parse_value("rows", value)?,
                "cols" => cols = parse_value("cols", value)?,
                "noteduration" => settings.note_duration_ms = parse_value("noteduration", value)?,
                "instrument" => settings.instrument = parse_value("instrument", value)?,
                "speed" => settings.speed_ms = parse_value("speed", value)?,
                "usesamples" => settings.use_samples = parse_value::<i64>("usesamples", value)? != 0,
                "volume" => settings.volume = parse_value("volume", value)?,
                "sample" => settings.sample = value.to_string(),
                "notes" => settings.set_notes(value),
                _ => {} // boardType and anything newer
            }
        } else if line.trim() == CELLS_HEADER {
            if rows == 0 || cols == 0 {
                return Err(BoardFileError::MissingDimensions);
            }
            let available = lines.len() - i;
            if available < rows {
                return Err(BoardFileError::MissingRows {
                    expected: rows,
                    found: available,
                });
            }
            let mut grid = Vec::with_capacity(rows * cols);
            for (row, line) in lines[i..i + rows].iter().enumerate() {
                let parts: Vec<&str> = line.split(',').collect();
                if parts.len() != cols {
                    return Err(BoardFileError::RowLength {
                        row,
                        expected: cols,
                        found: parts.len(),
                    });
                }
                for (col, part) in parts.into_iter().enumerate() {
                    let cell = decode_cell(part).ok_or_else(|| BoardFileError::InvalidCell {
                        col,
                        row,
                        value: part.to_string(),
                    })?;
                    grid.push(cell);
                }
            }
            i += rows;
            cells = Some(grid);
        }
    }

    let cells = cells.ok_or(BoardFileError::MissingCells)?;
    settings.board = Board::from_cells(rows, cols, cells)?;
    Ok(settings)
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, BoardFileError> {
    value.parse().map_err(|_| BoardFileError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Cell code as stored in files: the state's integer, or `4_d1_d2...` for merges.
pub fn encode_cell(cell: &Cell) -> String {
    match cell {
        Cell::Merged(dirs) => {
            let mut s = CellState::Merged.code().to_string();
            for d in dirs {
                let _ = write!(s, "_{}", d.index());
            }
            s
        }
        other => other.state().code().to_string(),
    }
}

pub fn decode_cell(text: &str) -> Option<Cell> {
    let mut parts = text.trim().split('_');
    let state = CellState::from_code(parts.next()?.trim().parse().ok()?)?;
    let members: Vec<&str> = parts.collect();

    match (state, members.is_empty()) {
        (CellState::Merged, false) => members
            .into_iter()
            .map(|m| m.trim().parse().ok().and_then(Direction::from_index))
            .collect::<Option<Vec<_>>>()
            .map(Cell::Merged),
        (_, true) => Cell::from_state(state),
        // only merges carry members
        (_, false) => None,
    }
}
