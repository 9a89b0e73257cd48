use std::time::Instant;

use crate::notes::Note;

/// Notes captured while recording, exported later as a midi file.
#[derive(Clone, Debug)]
pub struct Recorder {
    start: Instant,
    notes: Vec<Note>,
}

impl Recorder {
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            notes: Vec::new(),
        }
    }

    pub fn record(&mut self, notes: &[Note]) {
        self.notes.extend_from_slice(notes);
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn into_notes(self) -> Vec<Note> {
        self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
