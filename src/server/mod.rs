//! Connection dispatch and per-connection protocol handlers.

pub mod oneshot;
pub mod streaming;
pub mod ws;

pub use oneshot::OneshotSession;
pub use streaming::{StreamingSession, StreamingSessionConfig};
pub use ws::{router, AppState};
