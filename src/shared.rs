// Types shared between the driver layer (middle.rs), the output thread and the cli.
//
// The flow each tick:
//   - the driver calls `middle.tick(elapsed, now)`; once `speed_ms` has built up the
//     board advances one state and its active cells become notes
//   - notes go out as `OutputCommand`s to whatever sink is attached, and into the
//     recorder if one is running
//   - on its own 25ms cadence the driver calls `middle.sweep(now)` so note-offs
//     land on time no matter how slow the board is stepping
//   - anything that wants to draw the board asks for `middle.snapshot()`, an owned
//     copy it can carry to another thread

use std::time::Duration;

use crate::board::{ActiveState, Board, Cell};

pub const MIDI_CHANNEL: u8 = 15;

/// Release velocity for live note-offs. Midi files use 64.
pub const LIVE_RELEASE_VELOCITY: u8 = 127;

/// How often expired notes are checked; well under any sensible tick interval.
pub const SWEEP_INTERVAL: Duration = Duration::from_millis(25);

pub const DEFAULT_ROWS: usize = 9;
pub const DEFAULT_COLS: usize = 9;
pub const DEFAULT_NOTES: &str = "D3, A3, A#3, C4, D4, E4, F4, A5, C5";
pub const DEFAULT_NOTE_DURATION_MS: u32 = 500;
pub const DEFAULT_SPEED_MS: u32 = 250;
pub const DEFAULT_VOLUME: u8 = 64;

/// Things a driver (cli, host callback, ui) can ask the middle layer to do.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlEvent {
    TogglePlay,
    Step, // advance exactly one state, playing or not
    Clear,
    Resize { rows: usize, cols: usize },
    SetCell { col: usize, row: usize, cell: Cell },
    SetSpeed(u32), // ms per state
    SetNoteDuration(u32),
    SetVolume(u8),
    SetNotes(String), // comma separated, e.g. "D3, A3, Bb3"
    StartRecording,
    StopRecording,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

/// A row or column that just sounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Highlight {
    pub axis: Axis,
    pub index: usize,
}

impl Highlight {
    pub fn from_active(col: usize, row: usize, state: ActiveState) -> Option<Self> {
        match state {
            ActiveState::ColumnActivated => Some(Highlight { axis: Axis::Column, index: col }),
            ActiveState::RowActivated => Some(Highlight { axis: Axis::Row, index: row }),
            ActiveState::NotActive | ActiveState::BothActivated => None,
        }
    }
}

/// Point-in-time copy of what a renderer needs. Owns everything, so it can be
/// sent to another thread while the board keeps stepping.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardSnapshot {
    pub board: Board,
    pub highlights: Vec<Highlight>,
    pub playing: bool,
    pub recording: bool,
    pub steps: u64,
}
