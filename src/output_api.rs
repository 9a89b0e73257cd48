/// What the core hands to an output sink. Sinks own everything downstream
/// (midi device, sample player, a log).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputCommand {
    NoteOn { midi_index: u8, volume: u8 },
    NoteOff { midi_index: u8, velocity: u8 },
    ProgramChange { instrument: u8 },
}

/// Receives output commands on the output thread.
pub trait NoteSink: Send {
    fn handle(&mut self, cmd: &OutputCommand);
}
