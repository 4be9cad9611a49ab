//! JSON wire protocol between clients and the server.
//!
//! Text frames carry these messages; binary frames carry raw audio bytes and
//! never appear here.

use crate::error::StreamscribeError;
use serde::{Deserialize, Serialize};

/// Control commands sent by clients.
///
/// Anything that fails to parse is logged and ignored; the connection stays
/// open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum ClientCommand {
    /// Begin a new streaming session
    Start,
    /// End the session, flush the buffer, return the full transcript
    Stop,
    /// Liveness probe; does not disturb session state
    Ping,
}

impl ClientCommand {
    /// Serialize command to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize command from JSON string.
    pub fn from_json(s: &str) -> crate::error::Result<Self> {
        serde_json::from_str(s).map_err(|e| StreamscribeError::MalformedControlMessage {
            message: e.to_string(),
        })
    }
}

/// Messages sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Greeting sent immediately on connection open
    Connected { message: String, mode: String },
    /// Acknowledges `start`
    SessionStarted,
    /// Cumulative transcript after an interim or finalized tick
    Partial { text: String, is_final: bool },
    /// Cumulative transcript after the stop-time flush
    Final { text: String, is_final: bool },
    /// Sent after `final`; the session is back to idle
    SessionEnded,
    /// Reply to `ping`
    Pong,
    /// One-shot mode: transcription started
    Processing { message: String },
    /// One-shot mode: transcription result
    Result { text: String },
    /// One-shot mode: transcription failed
    Error { message: String },
}

impl ServerMessage {
    /// Cumulative mid-stream update. The wire always carries
    /// `is_final: false` here; finality of individual segments is internal.
    pub fn partial<T: Into<String>>(text: T) -> Self {
        Self::Partial {
            text: text.into(),
            is_final: false,
        }
    }

    /// Terminal cumulative transcript emitted by the stop-time flush.
    pub fn final_transcript<T: Into<String>>(text: T) -> Self {
        Self::Final {
            text: text.into(),
            is_final: true,
        }
    }

    pub fn error<T: Into<String>>(message: T) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Serialize message to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize message from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
