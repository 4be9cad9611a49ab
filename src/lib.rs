//! streamscribe - Streaming speech-to-text WebSocket service
//!
//! Segments an unbounded audio byte stream into bounded utterances and
//! schedules single-flight transcriptions against a pluggable ASR backend,
//! emitting incremental and final transcript updates while the stream is
//! still open.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod protocol;
pub mod server;
pub mod session;
pub mod stt;

// Core trait (segment bytes → text)
pub use stt::transcriber::Transcriber;

// Session core
pub use session::buffer::{Segment, SegmentBuffer, SegmentBufferConfig};
pub use session::transcript::TranscriptAccumulator;
pub use session::SessionState;

// Protocol handlers
pub use server::streaming::{StreamingSession, StreamingSessionConfig};

// Error handling
pub use error::{Result, StreamscribeError};

// Config
pub use config::{Config, ServerMode};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        // In a git repo build, GIT_HASH is set → expect "0.1.0+<hash>"
        // Without git, expect the plain version
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
