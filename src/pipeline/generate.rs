// offline generation: run a copy of the board as fast as possible and collect
// the notes it would have played, timestamped as if it ran in real time.

use std::time::{Duration, Instant};

use crate::notes::Note;
use crate::pipeline::settings::BoardSettings;
use crate::sequencer::notes_for_active_cells;

/// Give up once this many steps in a row produced nothing.
pub const MAX_SILENT_STEPS: u64 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerateLimit {
    Steps(u64),
    Notes(usize),
    Duration(u64), // ms of board time
}

#[derive(Clone, Debug)]
pub struct Generated {
    pub notes: Vec<Note>,
    pub steps: u64,
    pub elapsed_ms: u64,
    pub stalled: bool,
}

impl GenerateLimit {
    fn reached(self, steps: u64, notes: usize, elapsed_ms: u64) -> bool {
        match self {
            GenerateLimit::Steps(n) => steps >= n,
            GenerateLimit::Notes(n) => notes >= n,
            GenerateLimit::Duration(ms) => elapsed_ms >= ms,
        }
    }
}

/// The caller's board is left untouched.
pub fn generate_notes(settings: &BoardSettings, limit: GenerateLimit, start: Instant) -> Generated {
    let mut board = settings.board.clone();
    let voice = settings.voice();
    // a zero speed would never advance the clock
    let speed_ms = settings.speed_ms.max(1) as u64;

    let mut out = Generated {
        notes: Vec::new(),
        steps: 0,
        elapsed_ms: 0,
        stalled: false,
    };
    let mut silent = 0u64;

    while !limit.reached(out.steps, out.notes.len(), out.elapsed_ms) {
        board.next_state();
        let now = start + Duration::from_millis(out.elapsed_ms);
        let notes = notes_for_active_cells(&board.active_cells(), &voice, now);

        out.steps += 1;
        out.elapsed_ms += speed_ms;

        if notes.is_empty() {
            silent += 1;
            if silent >= MAX_SILENT_STEPS {
                tracing::warn!(steps = out.steps, "no notes for {MAX_SILENT_STEPS} steps, stopping");
                out.stalled = true;
                break;
            }
        } else {
            silent = 0;
            out.notes.extend(notes);
        }
    }

    tracing::debug!(
        steps = out.steps,
        notes = out.notes.len(),
        elapsed_ms = out.elapsed_ms,
        "generation finished"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Cell, Direction};

    // a single token bouncing along row 0 of a 1x4 strip
    fn bouncing() -> BoardSettings {
        let mut board = Board::new(1, 4);
        board[(0, 0)] = Cell::Token(Direction::Right);
        let mut s = BoardSettings::with_board(board);
        s.speed_ms = 100;
        s
    }

    #[test]
    fn step_limit() {
        let g = generate_notes(&bouncing(), GenerateLimit::Steps(7), Instant::now());
        assert_eq!(g.steps, 7);
        assert_eq!(g.elapsed_ms, 700);
        assert!(!g.stalled);
        // hits the right edge on step 3, the left edge on step 6
        assert_eq!(g.notes.len(), 2);
    }

    #[test]
    fn duration_limit_counts_board_time() {
        let g = generate_notes(&bouncing(), GenerateLimit::Duration(1000), Instant::now());
        assert_eq!(g.steps, 10);
    }

    #[test]
    fn note_limit_stops_at_or_past_target() {
        let g = generate_notes(&bouncing(), GenerateLimit::Notes(3), Instant::now());
        assert!(g.notes.len() >= 3);
        let again = generate_notes(&bouncing(), GenerateLimit::Steps(g.steps - 1), Instant::now());
        assert!(again.notes.len() < 3);
    }

    #[test]
    fn notes_are_timestamped_by_step() {
        let start = Instant::now();
        let g = generate_notes(&bouncing(), GenerateLimit::Steps(3), start);
        let last = g.notes.last().unwrap();
        assert!(last.time_down <= start + Duration::from_millis(200));
        assert!(g.notes.iter().all(|n| n.time_down >= start));
    }

    #[test]
    fn silent_board_stalls() {
        let s = BoardSettings::with_board(Board::new(3, 3));
        let g = generate_notes(&s, GenerateLimit::Notes(1), Instant::now());
        assert!(g.stalled);
        assert_eq!(g.steps, MAX_SILENT_STEPS);
        assert!(g.notes.is_empty());
    }

    #[test]
    fn source_board_is_untouched() {
        let s = bouncing();
        let before = s.board.clone();
        generate_notes(&s, GenerateLimit::Steps(5), Instant::now());
        assert_eq!(s.board, before);
    }
}
