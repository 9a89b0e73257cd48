use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::board::{ActiveGrid, ActiveState};
use crate::notes::{map_index_to_pitch, Note};

/// Per-note parameters taken from the board settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Voice {
    pub notes: Vec<String>,
    pub duration_ms: u32,
    pub volume: u8,
}

/// One note per activated cell, row by row: column-activated cells use their
/// column index, row-activated cells their row index. Activations that share an
/// index still each get their own note.
pub fn notes_for_active_cells(active: &ActiveGrid, voice: &Voice, now: Instant) -> Vec<Note> {
    active
        .activations()
        .filter_map(|(col, row, state)| match state {
            ActiveState::ColumnActivated => Some(col),
            ActiveState::RowActivated => Some(row),
            _ => None,
        })
        .map(|index| {
            let pitch = map_index_to_pitch(index, &voice.notes);
            Note::new(now, pitch, voice.duration_ms, voice.volume)
        })
        .collect()
}

/// Keeps the notes that are currently down until their duration runs out.
///
/// Cloning shares the same set, so a sweeper on another thread can hold a clone.
#[derive(Clone, Debug, Default)]
pub struct NoteSequencer {
    down: Arc<Mutex<Vec<Note>>>,
}

impl NoteSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, notes: &[Note]) {
        if notes.is_empty() {
            return;
        }
        self.down.lock().extend_from_slice(notes);
    }

    /// Removes and returns every note whose duration has passed at `now`.
    pub fn sweep(&self, now: Instant) -> Vec<Note> {
        let mut down = self.down.lock();
        let mut expired = Vec::new();
        down.retain(|n| {
            if n.is_expired(now) {
                expired.push(*n);
                false
            } else {
                true
            }
        });
        if !expired.is_empty() {
            tracing::trace!(released = expired.len(), still_down = down.len(), "note sweep");
        }
        expired
    }

    pub fn down_count(&self) -> usize {
        self.down.lock().len()
    }

    /// Drops every held note, returning them so the caller can send note-offs.
    pub fn release_all(&self) -> Vec<Note> {
        std::mem::take(&mut *self.down.lock())
    }
}
