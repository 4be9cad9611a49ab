//! One-shot session handler: single audio blob in, single text out.
//!
//! No segmentation, no scheduler — each binary frame is transcribed whole
//! and answered with `result` or `error`. Kept as a second server mode for
//! clients that upload complete recordings.

use crate::protocol::{ClientCommand, ServerMessage};
use crate::stt::Transcriber;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// One connection's one-shot session.
pub struct OneshotSession {
    transcriber: Arc<dyn Transcriber>,
    language: String,
    outbound: mpsc::Sender<ServerMessage>,
}

impl OneshotSession {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        language: String,
        outbound: mpsc::Sender<ServerMessage>,
    ) -> Self {
        Self {
            transcriber,
            language,
            outbound,
        }
    }

    /// Transcribes a complete audio blob and replies with the result.
    pub async fn on_binary(&mut self, bytes: Vec<u8>) {
        debug!(bytes = bytes.len(), "received audio blob");
        self.send(ServerMessage::Processing {
            message: "transcribing".to_string(),
        })
        .await;

        let transcriber = Arc::clone(&self.transcriber);
        let language = self.language.clone();
        let result =
            tokio::task::spawn_blocking(move || transcriber.transcribe(&bytes, &language)).await;

        let reply = match result {
            Ok(Ok(text)) if !text.trim().is_empty() => ServerMessage::Result {
                text: text.trim().to_string(),
            },
            Ok(Ok(_)) => ServerMessage::error("transcription produced no text"),
            Ok(Err(e)) => {
                warn!(error = %e, "one-shot transcription failed");
                ServerMessage::error("transcription failed")
            }
            Err(e) => {
                warn!(error = %e, "one-shot transcription task panicked");
                ServerMessage::error("transcription failed")
            }
        };
        self.send(reply).await;
    }

    pub async fn on_text(&mut self, text: &str) {
        match ClientCommand::from_json(text) {
            Ok(ClientCommand::Ping) => self.send(ServerMessage::Pong).await,
            // Streaming session control has no meaning here.
            Ok(command) => debug!(?command, "ignoring streaming command in oneshot mode"),
            Err(e) => warn!(error = %e, "ignoring malformed control message"),
        }
    }

    async fn send(&self, message: ServerMessage) {
        if self.outbound.send(message).await.is_err() {
            debug!("connection gone, dropping outbound message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::MockTranscriber;

    fn session(mock: MockTranscriber) -> (OneshotSession, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(8);
        (OneshotSession::new(Arc::new(mock), "zh".to_string(), tx), rx)
    }

    #[tokio::test]
    async fn test_blob_yields_processing_then_result() {
        let (mut s, mut rx) = session(MockTranscriber::new("mock").with_response("整段文本"));

        s.on_binary(vec![0u8; 4096]).await;

        assert!(matches!(
            rx.recv().await.unwrap(),
            ServerMessage::Processing { .. }
        ));
        assert_eq!(
            rx.recv().await.unwrap(),
            ServerMessage::Result {
                text: "整段文本".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_failure_yields_error() {
        let (mut s, mut rx) = session(MockTranscriber::new("mock").with_failure());

        s.on_binary(vec![0u8; 4096]).await;

        let _ = rx.recv().await; // processing
        assert!(matches!(
            rx.recv().await.unwrap(),
            ServerMessage::Error { .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_text_yields_error() {
        let (mut s, mut rx) = session(MockTranscriber::new("mock").with_response("  "));

        s.on_binary(vec![0u8; 4096]).await;

        let _ = rx.recv().await; // processing
        assert!(matches!(
            rx.recv().await.unwrap(),
            ServerMessage::Error { .. }
        ));
    }

    #[tokio::test]
    async fn test_ping_pong() {
        let (mut s, mut rx) = session(MockTranscriber::new("mock"));

        s.on_text(r#"{"command": "ping"}"#).await;
        assert_eq!(rx.recv().await.unwrap(), ServerMessage::Pong);
    }

    #[tokio::test]
    async fn test_streaming_commands_ignored() {
        let (mut s, mut rx) = session(MockTranscriber::new("mock"));

        s.on_text(r#"{"command": "start"}"#).await;
        s.on_text(r#"{"command": "stop"}"#).await;
        s.on_text("garbage").await;
        assert!(rx.try_recv().is_err());
    }
}
