use crate::notes::note_name;
use crate::output_api::{NoteSink, OutputCommand};
use crate::shared::MIDI_CHANNEL;

/// Stands in for a midi device: reports every command through tracing.
#[derive(Debug, Default)]
pub struct LogSink {
    sounding: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sounding(&self) -> usize {
        self.sounding
    }
}

impl NoteSink for LogSink {
    fn handle(&mut self, cmd: &OutputCommand) {
        match *cmd {
            OutputCommand::NoteOn { midi_index, volume } => {
                self.sounding += 1;
                tracing::info!(
                    channel = MIDI_CHANNEL,
                    note = note_name(midi_index).unwrap_or("?"),
                    volume,
                    "note on"
                );
            }
            OutputCommand::NoteOff { midi_index, velocity } => {
                self.sounding = self.sounding.saturating_sub(1);
                tracing::debug!(
                    channel = MIDI_CHANNEL,
                    note = note_name(midi_index).unwrap_or("?"),
                    velocity,
                    "note off"
                );
            }
            OutputCommand::ProgramChange { instrument } => {
                tracing::info!(channel = MIDI_CHANNEL, instrument, "program change");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_sounding_notes() {
        let mut sink = LogSink::new();
        sink.handle(&OutputCommand::NoteOn { midi_index: 63, volume: 64 });
        sink.handle(&OutputCommand::NoteOn { midi_index: 65, volume: 64 });
        sink.handle(&OutputCommand::NoteOff { midi_index: 63, velocity: 127 });
        assert_eq!(sink.sounding(), 1);
        sink.handle(&OutputCommand::NoteOff { midi_index: 65, velocity: 127 });
        sink.handle(&OutputCommand::NoteOff { midi_index: 65, velocity: 127 });
        assert_eq!(sink.sounding(), 0);
    }
}
