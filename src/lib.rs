//! Otomata boards as a note source: a small cellular automaton whose tokens
//! sound a note whenever they hit the edge of the board or a sound wall.
//!
//! [`board`] holds the automaton, [`sequencer`] and [`notes`] turn its
//! activity into notes, [`middle`] drives it in real time, and [`pipeline`]
//! covers files: board files, otomata links and midi export.

pub mod board;
pub mod error;
pub mod middle;
pub mod notes;
pub mod output;
pub mod output_api;
pub mod pipeline;
pub mod recorder;
pub mod sequencer;
pub mod shared;
