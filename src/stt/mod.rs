//! Speech-to-text backends.
//!
//! The engine itself is an external collaborator: anything implementing
//! [`Transcriber`] can be wired into a session. The production backend shells
//! out to a configurable command; tests use the mock.

pub mod command;
pub mod transcriber;

pub use command::CommandTranscriber;
pub use transcriber::{MockTranscriber, Transcriber};
