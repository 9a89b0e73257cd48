// driver-facing layer: owns the board settings, turns elapsed time into board
// steps and board steps into output commands.

use std::time::{Duration, Instant};

use crate::notes::Note;
use crate::output_api::OutputCommand;
use crate::pipeline::settings::BoardSettings;
use crate::recorder::Recorder;
use crate::sequencer::{notes_for_active_cells, NoteSequencer};
use crate::shared::{BoardSnapshot, ControlEvent, Highlight, LIVE_RELEASE_VELOCITY};

pub struct Middle {
    settings: BoardSettings,
    sequencer: NoteSequencer,
    recorder: Option<Recorder>,
    recording: bool, // recorder is kept after stopping until taken
    pending: Duration, // time built up towards the next step
    playing: bool,
    steps: u64,
    highlights: Vec<Highlight>,
}

impl Middle {
    pub fn new(settings: BoardSettings) -> Self {
        Self {
            settings,
            sequencer: NoteSequencer::new(),
            recorder: None,
            recording: false,
            pending: Duration::ZERO,
            playing: false,
            steps: 0,
            highlights: Vec::new(),
        }
    }

    pub fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Shared handle on the held notes, for a sweeper living on another thread.
    pub fn sequencer(&self) -> &NoteSequencer {
        &self.sequencer
    }

    /// Commands a freshly attached sink needs before any notes.
    pub fn init_commands(&self) -> Vec<OutputCommand> {
        vec![OutputCommand::ProgramChange {
            instrument: self.settings.instrument,
        }]
    }

    pub fn handle_event(&mut self, event: ControlEvent) -> Vec<OutputCommand> {
        tracing::debug!(?event, "control event");
        match event {
            ControlEvent::TogglePlay => {
                self.playing = !self.playing;
                self.pending = Duration::ZERO;
                // held notes run out on the sweep cadence
            }
            ControlEvent::Step => return self.step(Instant::now()),
            ControlEvent::Clear => {
                self.settings.board.clear();
                self.highlights.clear();
            }
            ControlEvent::Resize { rows, cols } => {
                if rows == 0 || cols == 0 {
                    tracing::warn!(rows, cols, "ignoring resize to an empty board");
                } else {
                    self.settings.board.change_size(rows, cols);
                    self.highlights.clear();
                }
            }
            ControlEvent::SetCell { col, row, cell } => {
                if self.settings.board.get(col, row).is_none() {
                    tracing::warn!(col, row, "cell outside the board");
                } else if cell.is_empty_merge() {
                    tracing::warn!(col, row, "ignoring a merged cell without tokens");
                } else {
                    self.settings.board.set(col, row, cell);
                }
            }
            ControlEvent::SetSpeed(ms) => self.settings.speed_ms = ms,
            ControlEvent::SetNoteDuration(ms) => self.settings.note_duration_ms = ms,
            ControlEvent::SetVolume(v) => self.settings.volume = v.min(127),
            ControlEvent::SetNotes(notes) => self.settings.set_notes(&notes),
            ControlEvent::StartRecording => {
                if !self.recording {
                    self.recorder = Some(Recorder::new(Instant::now()));
                    self.recording = true;
                }
            }
            ControlEvent::StopRecording => {
                if let (true, Some(rec)) = (self.recording, &self.recorder) {
                    tracing::info!(notes = rec.len(), "recording stopped");
                }
                self.recording = false;
            }
        }
        Vec::new()
    }

    /// Call as often as you like; the board steps once per `speed_ms` of
    /// accumulated play time, possibly several times for a long `elapsed`.
    pub fn tick(&mut self, elapsed: Duration, now: Instant) -> Vec<OutputCommand> {
        if !self.playing {
            return Vec::new();
        }
        let speed = self.step_interval();
        self.pending += elapsed;

        let mut cmds = Vec::new();
        while self.pending >= speed {
            self.pending -= speed;
            cmds.extend(self.step(now));
        }
        cmds
    }

    fn step_interval(&self) -> Duration {
        Duration::from_millis(self.settings.speed_ms.max(1) as u64)
    }

    /// Advance one board state and play whatever it activates.
    pub fn step(&mut self, now: Instant) -> Vec<OutputCommand> {
        self.settings.board.next_state();
        self.steps += 1;

        let active = self.settings.board.active_cells();
        self.highlights = active
            .activations()
            .filter_map(|(col, row, state)| Highlight::from_active(col, row, state))
            .collect();
        let notes = notes_for_active_cells(&active, &self.settings.voice(), now);

        self.sequencer.press(&notes);
        if self.recording {
            if let Some(rec) = self.recorder.as_mut() {
                rec.record(&notes);
            }
        }
        tracing::debug!(step = self.steps, notes = notes.len(), "board step");

        notes
            .iter()
            .filter_map(|n| {
                playable_key(n).map(|midi_index| OutputCommand::NoteOn {
                    midi_index,
                    volume: n.volume,
                })
            })
            .collect()
    }

    /// Note-offs for everything that has run its duration at `now`.
    pub fn sweep(&mut self, now: Instant) -> Vec<OutputCommand> {
        note_offs(&self.sequencer.sweep(now))
    }

    /// Note-offs for every held note, for shutting down.
    pub fn release_all(&mut self) -> Vec<OutputCommand> {
        note_offs(&self.sequencer.release_all())
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            board: self.settings.board.clone(),
            highlights: self.highlights.clone(),
            playing: self.playing,
            recording: self.recording,
            steps: self.steps,
        }
    }

    /// Ends the recording, if any, and hands it over.
    pub fn take_recording(&mut self) -> Option<Recorder> {
        self.recording = false;
        self.recorder.take()
    }
}

fn note_offs(notes: &[Note]) -> Vec<OutputCommand> {
    notes
        .iter()
        .filter_map(playable_key)
        .map(|midi_index| OutputCommand::NoteOff {
            midi_index,
            velocity: LIVE_RELEASE_VELOCITY,
        })
        .collect()
}

// pitches past key 127 stay silent, like unresolved names
fn playable_key(note: &Note) -> Option<u8> {
    if note.is_out_of_midi_range() {
        tracing::debug!(midi_index = ?note.midi_index, "note above midi key 127 not sent");
    }
    note.midi_key()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Cell, Direction};
    use crate::notes::pitch_of;
    use crate::shared::Axis;
    use pretty_assertions::assert_eq;

    const MS: Duration = Duration::from_millis(1);

    // on a 2-row board the token sounds column 1 every step, bottom edge then top
    fn middle() -> Middle {
        let mut board = Board::new(2, 3);
        board[(1, 0)] = Cell::Token(Direction::Down);
        let mut settings = BoardSettings::with_board(board);
        settings.speed_ms = 100;
        settings.note_duration_ms = 60;
        settings.set_notes("C4, D4, E4");
        let mut m = Middle::new(settings);
        m.handle_event(ControlEvent::TogglePlay);
        m
    }

    #[test]
    fn steps_follow_accumulated_time() {
        let mut m = middle();
        let t0 = Instant::now();
        assert!(m.tick(MS * 60, t0).is_empty());
        assert_eq!(m.snapshot().steps, 0);
        m.tick(MS * 60, t0);
        assert_eq!(m.snapshot().steps, 1);
        m.tick(MS * 250, t0);
        assert_eq!(m.snapshot().steps, 3);
    }

    #[test]
    fn paused_board_does_not_step() {
        let mut m = middle();
        m.handle_event(ControlEvent::TogglePlay);
        assert!(m.tick(MS * 1000, Instant::now()).is_empty());
        assert_eq!(m.snapshot().steps, 0);
        assert!(!m.snapshot().playing);
    }

    #[test]
    fn step_emits_note_on_and_highlight() {
        let mut m = middle();
        let cmds = m.step(Instant::now());
        let d4 = pitch_of("D4").unwrap();
        assert_eq!(cmds, vec![OutputCommand::NoteOn { midi_index: d4, volume: 64 }]);
        assert_eq!(
            m.snapshot().highlights,
            vec![Highlight { axis: Axis::Column, index: 1 }]
        );
    }

    #[test]
    fn sweep_is_independent_of_steps() {
        let mut m = middle();
        let t0 = Instant::now();
        m.step(t0);
        assert!(m.sweep(t0 + MS * 60).is_empty());
        let offs = m.sweep(t0 + MS * 61);
        assert_eq!(
            offs,
            vec![OutputCommand::NoteOff { midi_index: pitch_of("D4").unwrap(), velocity: 127 }]
        );
        assert_eq!(m.sequencer().down_count(), 0);
    }

    #[test]
    fn unknown_notes_are_silent_but_recorded() {
        let mut m = middle();
        m.handle_event(ControlEvent::SetNotes("nope".into()));
        m.handle_event(ControlEvent::StartRecording);
        let t0 = Instant::now();
        assert!(m.step(t0).is_empty());
        assert!(m.sweep(t0 + MS * 100).is_empty());
        let rec = m.take_recording().unwrap();
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.notes()[0].midi_index, None);
        assert!(!m.is_recording());
    }

    #[test]
    fn notes_past_midi_range_are_silent_but_recorded() {
        let mut m = middle();
        m.handle_event(ControlEvent::SetNotes("G#9, G#9, G#9".into()));
        m.handle_event(ControlEvent::StartRecording);
        let t0 = Instant::now();
        assert!(m.step(t0).is_empty());
        assert_eq!(m.sequencer().down_count(), 1);
        assert!(m.sweep(t0 + MS * 100).is_empty());
        let rec = m.take_recording().unwrap();
        assert_eq!(rec.notes()[0].midi_index, pitch_of("G#9"));
    }

    #[test]
    fn recording_captures_only_while_running() {
        let mut m = middle();
        let t0 = Instant::now();
        m.step(t0); // before recording
        m.handle_event(ControlEvent::StartRecording);
        m.step(t0 + MS * 100);
        m.step(t0 + MS * 200);
        m.handle_event(ControlEvent::StopRecording);
        m.step(t0 + MS * 300);
        assert!(!m.snapshot().recording);
        let rec = m.take_recording().unwrap();
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.notes()[0].time_down, t0 + MS * 100);
        assert!(m.take_recording().is_none());
    }

    #[test]
    fn snapshot_is_detached_from_the_board() {
        let mut m = middle();
        let snap = m.snapshot();
        m.step(Instant::now());
        assert_eq!(snap.board[(1, 0)], Cell::Token(Direction::Down));
        assert_eq!(m.snapshot().board[(1, 1)], Cell::Token(Direction::Down));

        let handle = std::thread::spawn(move || snap.board.live_cells());
        assert_eq!(handle.join().unwrap(), 1);
    }

    #[test]
    fn editing_events() {
        let mut m = middle();
        m.handle_event(ControlEvent::SetCell { col: 0, row: 0, cell: Cell::Wall });
        m.handle_event(ControlEvent::SetCell { col: 9, row: 9, cell: Cell::Wall });
        m.handle_event(ControlEvent::SetCell { col: 2, row: 1, cell: Cell::Merged(vec![]) });
        assert_eq!(m.settings().board[(2, 1)], Cell::Dead);
        m.handle_event(ControlEvent::Resize { rows: 4, cols: 4 });
        m.handle_event(ControlEvent::Resize { rows: 0, cols: 4 });
        m.handle_event(ControlEvent::SetVolume(200));
        m.handle_event(ControlEvent::SetSpeed(50));
        let s = m.settings();
        assert_eq!((s.board.rows(), s.board.cols()), (4, 4));
        assert_eq!(s.board[(0, 0)], Cell::Wall);
        assert_eq!(s.volume, 127);
        assert_eq!(s.speed_ms, 50);

        m.handle_event(ControlEvent::Clear);
        assert_eq!(m.settings().board.live_cells(), 0);
    }

    #[test]
    fn release_all_turns_everything_off() {
        let mut m = middle();
        m.step(Instant::now());
        assert_eq!(m.release_all().len(), 1);
        assert_eq!(m.init_commands(), vec![OutputCommand::ProgramChange { instrument: 0 }]);
    }
}
