//! Per-session streaming core: segment buffer, transcript accumulator,
//! transcription scheduler, and the session lifecycle states.

pub mod buffer;
pub mod scheduler;
pub mod transcript;

pub use buffer::{Segment, SegmentBuffer, SegmentBufferConfig};
pub use scheduler::SchedulerHandle;
pub use transcript::TranscriptAccumulator;

/// Lifecycle state of one streaming session.
///
/// `Idle` — connected, no active stream. `Active` — receiving audio,
/// scheduler running. `Closing` — stop requested, draining. `Closed` —
/// the underlying connection terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Closing,
    Closed,
}

impl SessionState {
    /// Whether the transition to `next` is part of the lifecycle.
    ///
    /// `Closed` is terminal and reachable from anywhere; `Closing` drains
    /// back to `Idle` so a new `start` can begin a fresh session on the same
    /// connection.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (_, Closed) => self != Closed,
            (Idle, Active) => true,
            (Active, Closing) => true,
            (Closing, Idle) => true,
            // A fresh `start` while already active restarts the session.
            (Active, Active) => true,
            _ => false,
        }
    }

    pub fn is_active(self) -> bool {
        self == SessionState::Active
    }

    pub fn is_closed(self) -> bool {
        self == SessionState::Closed
    }
}
