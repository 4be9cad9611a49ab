//! Default configuration constants for streamscribe.
//!
//! Shared across the config types and the session core so the tunables live
//! in exactly one place.

use std::time::Duration;

/// Minimum number of buffered bytes before any transcription is attempted.
///
/// Below this the segment is too short to contain a usable utterance and the
/// engine call would be wasted. 30 KiB of compressed browser audio is roughly
/// one second of speech.
pub const MIN_SEGMENT_BYTES: usize = 30 * 1024;

/// Silence threshold: elapsed time since the last received byte that marks
/// an utterance boundary.
///
/// One second of no inbound frames is treated as the speaker pausing; the
/// pending segment becomes final.
pub const SILENCE_THRESHOLD: Duration = Duration::from_secs(1);

/// Maximum time between forced interim transcriptions while speech is
/// continuous.
///
/// Keeps preview latency bounded during long uninterrupted utterances: every
/// two seconds the accumulated prefix is re-transcribed without clearing the
/// buffer.
pub const MAX_INTERVAL: Duration = Duration::from_secs(2);

/// Polling interval of the transcription scheduler loop.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Minimum size of the stop-time flush segment.
///
/// Whatever remains in the buffer at session end is transcribed only if it
/// exceeds this; smaller tails are near-empty noise.
pub const FINAL_FLUSH_MIN_BYTES: usize = 10 * 1024;

/// Default listen address for the WebSocket server.
pub const LISTEN_ADDR: &str = "0.0.0.0:8765";

/// Default language hint forwarded to the transcription backend.
pub const DEFAULT_LANGUAGE: &str = "zh";

/// Default external ASR command.
///
/// `{file}` is replaced with the path of the temp file holding the segment
/// bytes; the command must print the transcript on stdout.
pub const DEFAULT_STT_COMMAND: &str = "whisper-cli --no-prints --file {file}";

/// Greeting sent in the `connected` message for streaming mode.
pub const STREAMING_GREETING: &str = "connected to streaming STT service";

/// Greeting sent in the `connected` message for one-shot mode.
pub const ONESHOT_GREETING: &str = "connected to STT service";
