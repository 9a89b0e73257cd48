use std::time::{Duration, Instant};

/// Note names by midi index. Octaves run A..G#, so "C4" sits three semitones
/// above "A4". Index 0 is "A-1".
pub const NOTE_NAMES: [&str; 132] = [
    "A-1", "A#-1", "B-1", "C-1", "C#-1", "D-1", "D#-1", "E-1", "F-1", "F#-1", "G-1", "G#-1",
    "A0", "A#0", "B0", "C0", "C#0", "D0", "D#0", "E0", "F0", "F#0", "G0", "G#0",
    "A1", "A#1", "B1", "C1", "C#1", "D1", "D#1", "E1", "F1", "F#1", "G1", "G#1",
    "A2", "A#2", "B2", "C2", "C#2", "D2", "D#2", "E2", "F2", "F#2", "G2", "G#2",
    "A3", "A#3", "B3", "C3", "C#3", "D3", "D#3", "E3", "F3", "F#3", "G3", "G#3",
    "A4", "A#4", "B4", "C4", "C#4", "D4", "D#4", "E4", "F4", "F#4", "G4", "G#4",
    "A5", "A#5", "B5", "C5", "C#5", "D5", "D#5", "E5", "F5", "F#5", "G5", "G#5",
    "A6", "A#6", "B6", "C6", "C#6", "D6", "D#6", "E6", "F6", "F#6", "G6", "G#6",
    "A7", "A#7", "B7", "C7", "C#7", "D7", "D#7", "E7", "F7", "F#7", "G7", "G#7",
    "A8", "A#8", "B8", "C8", "C#8", "D8", "D#8", "E8", "F8", "F#8", "G8", "G#8",
    "A9", "A#9", "B9", "C9", "C#9", "D9", "D#9", "E9", "F9", "F#9", "G9", "G#9",
];

/// Highest key a midi message can carry. The table runs on to G#9 (131).
pub const MAX_MIDI_KEY: u8 = 127;

/// Midi index of an exact note name, after the flat-B alias ("BB" -> "A#").
pub fn pitch_of(name: &str) -> Option<u8> {
    let name = name.replace("BB", "A#");
    NOTE_NAMES.iter().position(|n| *n == name).map(|i| i as u8)
}

pub fn note_name(midi_index: u8) -> Option<&'static str> {
    NOTE_NAMES.get(midi_index as usize).copied()
}

/// Pitch for a row/column index. Wraps around when there are fewer notes than
/// indices; an unknown name or an empty list gives `None` (no audible note).
pub fn map_index_to_pitch<S: AsRef<str>>(index: usize, notes_per_cell: &[S]) -> Option<u8> {
    if notes_per_cell.is_empty() {
        return None;
    }
    pitch_of(notes_per_cell[index % notes_per_cell.len()].as_ref())
}

/// Splits a user note list like "d3, A3, bb3" into cleaned, upper-cased names.
pub fn parse_note_list(notes: &str) -> Vec<String> {
    notes
        .split(',')
        .map(|n| n.trim().to_uppercase())
        .filter(|n| !n.is_empty())
        .collect()
}

/// A note triggered by the board. `midi_index` is `None` when the configured
/// name didn't resolve; such notes are tracked but never sounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note {
    pub time_down: Instant,
    pub midi_index: Option<u8>,
    pub duration_ms: u32,
    pub volume: u8,
}

impl Note {
    pub fn new(time_down: Instant, midi_index: Option<u8>, duration_ms: u32, volume: u8) -> Self {
        Self {
            time_down,
            midi_index,
            duration_ms,
            volume: volume.min(127),
        }
    }

    /// The pitch as a playable midi key: `None` when the name didn't resolve or
    /// the table index lies past 127 (A9..G#9).
    pub fn midi_key(&self) -> Option<u8> {
        self.midi_index.filter(|&k| k <= MAX_MIDI_KEY)
    }

    /// True for a resolved pitch that no midi message can carry.
    pub fn is_out_of_midi_range(&self) -> bool {
        self.midi_index.is_some_and(|k| k > MAX_MIDI_KEY)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms as u64)
    }

    // strictly past the duration, like a held key released on the next check
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.time_down) > self.duration()
    }
}
