//! Streaming session protocol handler.
//!
//! Owns one connection's session lifecycle and translates inbound frames
//! into buffer/scheduler operations. Socket-free: outbound messages go
//! through an mpsc sender, so the transport layer only pumps bytes and the
//! whole state machine is testable without a network.
//!
//! The receive path never blocks on transcription — audio frames keep
//! landing in the buffer while the scheduler loop runs inference.

use crate::config::Config;
use crate::defaults;
use crate::protocol::{ClientCommand, ServerMessage};
use crate::session::{
    scheduler, SchedulerHandle, SegmentBuffer, SegmentBufferConfig, SessionState,
    TranscriptAccumulator,
};
use crate::stt::Transcriber;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

/// Tunables for one streaming session.
#[derive(Debug, Clone)]
pub struct StreamingSessionConfig {
    pub segmenter: SegmentBufferConfig,
    pub poll_interval: Duration,
    /// Stop-time flush segments at or below this size are discarded as
    /// near-empty noise.
    pub final_flush_min_bytes: usize,
    pub language: String,
}

impl Default for StreamingSessionConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmentBufferConfig::default(),
            poll_interval: defaults::POLL_INTERVAL,
            final_flush_min_bytes: defaults::FINAL_FLUSH_MIN_BYTES,
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl StreamingSessionConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            segmenter: SegmentBufferConfig {
                min_segment_bytes: config.segmenter.min_segment_bytes,
                silence_threshold: config.segmenter.silence_threshold(),
                max_interval: config.segmenter.max_interval(),
            },
            poll_interval: config.scheduler.poll_interval(),
            final_flush_min_bytes: config.segmenter.final_flush_min_bytes,
            language: config.stt.language.clone(),
        }
    }
}

/// One connection's streaming session.
pub struct StreamingSession {
    config: StreamingSessionConfig,
    transcriber: Arc<dyn Transcriber>,
    outbound: mpsc::Sender<ServerMessage>,
    state: SessionState,
    buffer: Arc<Mutex<SegmentBuffer>>,
    transcript: Arc<Mutex<TranscriptAccumulator>>,
    scheduler: Option<SchedulerHandle>,
}

impl StreamingSession {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        config: StreamingSessionConfig,
        outbound: mpsc::Sender<ServerMessage>,
    ) -> Self {
        let buffer = Arc::new(Mutex::new(SegmentBuffer::with_config(
            config.segmenter.clone(),
        )));
        Self {
            config,
            transcriber,
            outbound,
            state: SessionState::Idle,
            buffer,
            transcript: Arc::new(Mutex::new(TranscriptAccumulator::new())),
            scheduler: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Handles a binary frame: raw audio bytes.
    ///
    /// The first frame of an implicit session (no `start` received)
    /// activates the session before buffering.
    pub async fn on_binary(&mut self, bytes: &[u8]) {
        if self.state.is_closed() {
            return;
        }
        if !self.state.is_active() {
            debug!("first audio frame, starting implicit session");
            self.activate().await;
        }
        self.buffer.lock().await.add_data(bytes);
    }

    /// Handles a text frame: a JSON control message.
    ///
    /// Invalid JSON and unknown commands are logged and ignored; the
    /// connection stays open.
    pub async fn on_text(&mut self, text: &str) {
        match ClientCommand::from_json(text) {
            Ok(command) => self.on_command(command).await,
            Err(e) => warn!(error = %e, "ignoring malformed control message"),
        }
    }

    pub async fn on_command(&mut self, command: ClientCommand) {
        if self.state.is_closed() {
            return;
        }
        match command {
            ClientCommand::Start => {
                self.activate().await;
                self.send(ServerMessage::SessionStarted).await;
                info!("session started");
            }
            ClientCommand::Stop => self.stop().await,
            ClientCommand::Ping => self.send(ServerMessage::Pong).await,
        }
    }

    /// Handles the connection closing: cancels the scheduler and releases
    /// the session. No further output is attempted.
    pub async fn on_disconnect(&mut self) {
        if let Some(handle) = self.scheduler.take() {
            handle.shutdown().await;
        }
        self.state = SessionState::Closed;
        info!("session closed");
    }

    /// Resets buffer and transcript and (re)spawns the scheduler loop.
    async fn activate(&mut self) {
        debug_assert!(self.state.can_transition_to(SessionState::Active));
        if let Some(handle) = self.scheduler.take() {
            handle.shutdown().await;
        }
        *self.buffer.lock().await = SegmentBuffer::with_config(self.config.segmenter.clone());
        *self.transcript.lock().await = TranscriptAccumulator::new();

        self.scheduler = Some(scheduler::spawn(
            Arc::clone(&self.buffer),
            Arc::clone(&self.transcript),
            Arc::clone(&self.transcriber),
            self.config.language.clone(),
            self.config.poll_interval,
            self.outbound.clone(),
        ));
        self.state = SessionState::Active;
    }

    /// Stop transition: cancel the scheduler, flush the tail, emit the full
    /// transcript, return to idle.
    async fn stop(&mut self) {
        if self.state.is_active() {
            self.state = SessionState::Closing;
        }

        // Await the cancellation so a lingering transcription cannot emit
        // after session_ended.
        if let Some(handle) = self.scheduler.take() {
            handle.shutdown().await;
        }

        let remaining = self.buffer.lock().await.drain_remaining();
        if let Some(bytes) = remaining {
            if bytes.len() > self.config.final_flush_min_bytes {
                self.flush_tail(bytes).await;
            } else {
                debug!(bytes = bytes.len(), "discarding tail below flush minimum");
            }
        }

        let full_text = self.transcript.lock().await.full_text();
        info!(chars = full_text.chars().count(), "session stopping");
        self.send(ServerMessage::final_transcript(full_text)).await;
        self.send(ServerMessage::SessionEnded).await;
        self.state = SessionState::Idle;
    }

    /// Transcribes the stop-time flush segment synchronously and commits it.
    async fn flush_tail(&mut self, bytes: Vec<u8>) {
        let transcriber = Arc::clone(&self.transcriber);
        let language = self.config.language.clone();
        let size = bytes.len();

        let result =
            tokio::task::spawn_blocking(move || transcriber.transcribe(&bytes, &language)).await;

        match result {
            Ok(Ok(text)) => {
                let text = text.trim();
                if !text.is_empty() {
                    self.transcript.lock().await.push(text);
                }
            }
            Ok(Err(e)) => warn!(error = %e, bytes = size, "final flush transcription failed"),
            Err(e) => warn!(error = %e, "final flush task panicked"),
        }
    }

    /// Sends an outbound message. A closed channel means the connection is
    /// gone; the write becomes a no-op.
    async fn send(&self, message: ServerMessage) {
        if self.outbound.send(message).await.is_err() {
            debug!("connection gone, dropping outbound message");
        }
    }
}
