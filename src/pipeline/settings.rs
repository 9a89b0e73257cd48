// a board plus everything needed to play it, what board files store

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::notes::parse_note_list;
use crate::sequencer::Voice;
use crate::shared::{
    DEFAULT_COLS, DEFAULT_NOTES, DEFAULT_NOTE_DURATION_MS, DEFAULT_ROWS, DEFAULT_SPEED_MS,
    DEFAULT_VOLUME,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSettings {
    pub board: Board,
    pub notes: Vec<String>, // one per row/column index, wraps around
    pub note_duration_ms: u32,
    pub speed_ms: u32, // time between board states
    pub instrument: u8, // general midi program
    // sample playback lives outside this crate; kept so files round-trip
    pub use_samples: bool,
    pub sample: String,
    #[serde(default = "default_volume")]
    pub volume: u8,
}

fn default_volume() -> u8 {
    DEFAULT_VOLUME
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            board: Board::new(DEFAULT_ROWS, DEFAULT_COLS),
            notes: parse_note_list(DEFAULT_NOTES),
            note_duration_ms: DEFAULT_NOTE_DURATION_MS,
            speed_ms: DEFAULT_SPEED_MS,
            instrument: 0,
            use_samples: false,
            sample: String::new(),
            volume: DEFAULT_VOLUME,
        }
    }
}

impl BoardSettings {
    pub fn with_board(board: Board) -> Self {
        Self {
            board,
            ..Self::default()
        }
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.notes = parse_note_list(notes);
    }

    /// Notes as written in files, e.g. "D3, A3, A#3".
    pub fn notes_string(&self) -> String {
        self.notes.join(", ")
    }

    pub fn voice(&self) -> Voice {
        Voice {
            notes: self.notes.clone(),
            duration_ms: self.note_duration_ms,
            volume: self.volume,
        }
    }
}
