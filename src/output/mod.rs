// output thread: commands go over a bounded channel so the driver never waits
// on whatever sits behind the sink (a midi port, a sample player, a log).

use std::thread::JoinHandle;

use anyhow::Context;
use crossbeam_channel::Sender;

use crate::output_api::{NoteSink, OutputCommand};

mod log_sink;

pub use log_sink::LogSink;

const QUEUE_DEPTH: usize = 1024;

pub struct OutputHandle {
    tx: Option<Sender<OutputCommand>>,
    thread: Option<JoinHandle<()>>,
}

impl OutputHandle {
    /// Drops the command if the queue is full rather than stalling the board.
    pub fn send(&self, cmd: OutputCommand) {
        if let Some(tx) = &self.tx {
            if tx.try_send(cmd).is_err() {
                tracing::warn!(?cmd, "output queue full, dropping command");
            }
        }
    }

    pub fn send_all(&self, cmds: impl IntoIterator<Item = OutputCommand>) {
        for cmd in cmds {
            self.send(cmd);
        }
    }
}

impl Drop for OutputHandle {
    fn drop(&mut self) {
        // closing the channel ends the thread's loop
        self.tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("output thread panicked");
            }
        }
    }
}

pub fn start_output(mut sink: Box<dyn NoteSink>) -> anyhow::Result<OutputHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<OutputCommand>(QUEUE_DEPTH);

    let thread = std::thread::Builder::new()
        .name("otomidi-output".into())
        .spawn(move || {
            for cmd in rx.iter() {
                sink.handle(&cmd);
            }
            tracing::debug!("output thread finished");
        })
        .context("failed to spawn output thread")?;

    Ok(OutputHandle {
        tx: Some(tx),
        thread: Some(thread),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct Collect(Arc<Mutex<Vec<OutputCommand>>>);

    impl NoteSink for Collect {
        fn handle(&mut self, cmd: &OutputCommand) {
            self.0.lock().push(*cmd);
        }
    }

    #[test]
    fn commands_arrive_in_order_before_drop_returns() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let out = start_output(Box::new(Collect(seen.clone()))).unwrap();
        let cmds = vec![
            OutputCommand::ProgramChange { instrument: 4 },
            OutputCommand::NoteOn { midi_index: 60, volume: 64 },
            OutputCommand::NoteOff { midi_index: 60, velocity: 127 },
        ];
        out.send_all(cmds.clone());
        drop(out); // joins
        assert_eq!(*seen.lock(), cmds);
    }
}
