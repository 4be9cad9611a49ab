//! Transcription scheduler: the background polling loop of one session.
//!
//! Wakes on a fixed interval, asks the segment buffer whether a boundary has
//! been reached, and runs at most one transcription at a time. The buffer
//! lock is held only for the trigger check and extraction, so the receive
//! loop keeps appending audio while inference runs on the blocking pool.
//!
//! Shutdown is cooperative: the signal is observed at the top of each wake,
//! and an in-flight transcription always runs to completion before the loop
//! exits — forcibly aborting a model call is not assumed to be supported.

use crate::protocol::ServerMessage;
use crate::session::buffer::SegmentBuffer;
use crate::session::transcript::TranscriptAccumulator;
use crate::stt::Transcriber;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Handle to a running scheduler loop.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Requests shutdown and waits for the loop to finish.
    ///
    /// An in-flight transcription completes (and its result is still merged)
    /// before this returns, so nothing can be emitted once the caller moves
    /// on to the final flush.
    pub async fn shutdown(self) {
        self.shutdown.send(true).ok();
        self.task.await.ok();
    }
}

/// Spawns the polling loop for one session.
///
/// Emitted messages go through `outbound`; a closed receiver stops the loop
/// (the peer is gone, further writes are pointless).
pub fn spawn(
    buffer: Arc<Mutex<SegmentBuffer>>,
    transcript: Arc<Mutex<TranscriptAccumulator>>,
    transcriber: Arc<dyn Transcriber>,
    language: String,
    poll_interval: Duration,
    outbound: mpsc::Sender<ServerMessage>,
) -> SchedulerHandle {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(run_loop(
        buffer,
        transcript,
        transcriber,
        language,
        poll_interval,
        outbound,
        shutdown_rx,
    ));
    SchedulerHandle {
        shutdown: shutdown_tx,
        task,
    }
}

async fn run_loop(
    buffer: Arc<Mutex<SegmentBuffer>>,
    transcript: Arc<Mutex<TranscriptAccumulator>>,
    transcriber: Arc<dyn Transcriber>,
    language: String,
    poll_interval: Duration,
    outbound: mpsc::Sender<ServerMessage>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        // Hold the buffer lock only for the boundary decision and the
        // extraction; appends proceed while inference runs.
        let segment = {
            let mut buf = buffer.lock().await;
            if !buf.is_ready() {
                continue;
            }
            match buf.extract() {
                Some(segment) => segment,
                None => continue,
            }
        };

        let is_final = segment.is_final;
        debug!(bytes = segment.bytes.len(), is_final, "transcribing segment");

        // Awaited inline: at most one transcription in flight, and ticks
        // that elapse meanwhile are coalesced by the interval.
        let result = {
            let transcriber = Arc::clone(&transcriber);
            let language = language.clone();
            let bytes = segment.bytes;
            tokio::task::spawn_blocking(move || transcriber.transcribe(&bytes, &language)).await
        };

        match result {
            Ok(Ok(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                let message = {
                    let mut transcript = transcript.lock().await;
                    if is_final {
                        transcript.push(text);
                        ServerMessage::partial(transcript.full_text())
                    } else {
                        ServerMessage::partial(transcript.preview(text))
                    }
                };
                if outbound.send(message).await.is_err() {
                    break;
                }
            }
            // Transient failures are absorbed; a later tick retries once
            // more data or another trigger arrives. The stop-time flush is
            // the authoritative checkpoint.
            Ok(Err(e)) => warn!(error = %e, "transcription failed, skipping tick"),
            Err(e) => warn!(error = %e, "transcription task panicked"),
        }
    }
}
