// standard midi file export of recorded / generated notes.
// format 0, one track, 240 ticks per beat at the default 120 bpm.

use std::io::Write;
use std::path::Path;

use crate::error::MidiFileError;
use crate::notes::Note;
use crate::shared::MIDI_CHANNEL;

pub const TICKS_PER_BEAT: u16 = 240;
pub const BEATS_PER_MINUTE: u64 = 120;

const NOTE_ON: u8 = 0x90;
const NOTE_OFF: u8 = 0x80;
const PROGRAM_CHANGE: u8 = 0xC0;
const RELEASE_VELOCITY: u8 = 64;

/// Ticks for a span of milliseconds (0.48 ticks per ms at 120 bpm).
pub fn ms_to_ticks(ms: u64) -> u64 {
    ms * TICKS_PER_BEAT as u64 * BEATS_PER_MINUTE / 60_000
}

pub fn write_midi_file(path: &Path, instrument: u8, notes: &[Note]) -> Result<(), MidiFileError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = encode(instrument, notes);
    let mut f = std::fs::File::create(path)?;
    f.write_all(&bytes)?;
    tracing::info!(path = %path.display(), notes = notes.len(), "wrote midi file");
    Ok(())
}

pub fn encode(instrument: u8, notes: &[Note]) -> Vec<u8> {
    let track = build_track(instrument, notes);

    let mut out = Vec::with_capacity(22 + track.len());
    out.extend_from_slice(b"MThd");
    out.extend_from_slice(&6u32.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // format 0
    out.extend_from_slice(&1u16.to_be_bytes()); // 1 track
    out.extend_from_slice(&TICKS_PER_BEAT.to_be_bytes());

    out.extend_from_slice(b"MTrk");
    out.extend_from_slice(&(track.len() as u32).to_be_bytes());
    out.extend_from_slice(&track);
    out
}

struct Event {
    tick: u64,
    status: u8,
    key: u8,
    velocity: u8,
}

fn build_track(instrument: u8, notes: &[Note]) -> Vec<u8> {
    let ch = MIDI_CHANNEL & 0x0F;
    let mut t = Vec::new();

    t.push(0x00);
    t.push(PROGRAM_CHANGE | ch);
    t.push(instrument & 0x7F);

    // notes without a playable key were never heard, leave them out
    let skipped = notes.iter().filter(|n| n.is_out_of_midi_range()).count();
    if skipped > 0 {
        tracing::debug!(skipped, "notes above midi key 127 left out of the file");
    }
    let sounding: Vec<(&Note, u8)> = notes
        .iter()
        .filter_map(|n| n.midi_key().map(|key| (n, key)))
        .collect();

    if let Some(start) = sounding.iter().map(|(n, _)| n.time_down).min() {
        let mut events = Vec::with_capacity(sounding.len() * 2);
        for (note, key) in sounding {
            let on = ms_to_ticks(note.time_down.duration_since(start).as_millis() as u64);
            let off = ms_to_ticks(
                note.time_down.duration_since(start).as_millis() as u64 + note.duration_ms as u64,
            );
            events.push(Event { tick: on, status: NOTE_ON | ch, key, velocity: note.volume });
            events.push(Event { tick: off, status: NOTE_OFF | ch, key, velocity: RELEASE_VELOCITY });
        }
        events.sort_by_key(|e| e.tick);

        let mut last = 0;
        for e in events {
            write_vlq(&mut t, (e.tick - last) as u32);
            last = e.tick;
            t.extend_from_slice(&[e.status, e.key, e.velocity]);
        }
    }

    // end of track
    t.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);
    t
}

/// Write a midi variable-length quantity.
pub fn write_vlq(buf: &mut Vec<u8>, mut value: u32) {
    let mut bytes = [0u8; 5];
    let mut i = bytes.len() - 1;
    bytes[i] = (value & 0x7F) as u8;
    value >>= 7;
    while value > 0 {
        i -= 1;
        bytes[i] = ((value & 0x7F) | 0x80) as u8;
        value >>= 7;
    }
    buf.extend_from_slice(&bytes[i..]);
}
