//! End-to-end streaming session tests over the public API.
//!
//! These drive a `StreamingSession` with a real scheduler loop and a mock
//! transcriber, asserting the full message sequence a client would see.

use std::time::Duration;

use streamscribe::protocol::{ClientCommand, ServerMessage};
use streamscribe::server::{OneshotSession, StreamingSession, StreamingSessionConfig};
use streamscribe::stt::MockTranscriber;
use streamscribe::{SegmentBufferConfig, SessionState};
use tokio::sync::mpsc;

/// Tight timings so silence-driven segments commit within a few poll ticks.
///
/// The poll interval is longer than the silence threshold, so the first tick
/// after an utterance pauses always sees a committed segment rather than an
/// interim probe.
fn fast_config() -> StreamingSessionConfig {
    StreamingSessionConfig {
        segmenter: SegmentBufferConfig {
            min_segment_bytes: 1024,
            silence_threshold: Duration::from_millis(30),
            max_interval: Duration::from_secs(10),
        },
        poll_interval: Duration::from_millis(100),
        final_flush_min_bytes: 512,
        language: "zh".to_string(),
    }
}

fn session_with(
    mock: MockTranscriber,
    config: StreamingSessionConfig,
) -> (StreamingSession, mpsc::Receiver<ServerMessage>) {
    let (tx, rx) = mpsc::channel(32);
    (
        StreamingSession::new(std::sync::Arc::new(mock), config, tx),
        rx,
    )
}

async fn recv(rx: &mut mpsc::Receiver<ServerMessage>) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for server message")
        .expect("outbound channel closed")
}

#[tokio::test]
async fn test_utterance_then_silence_produces_cumulative_update() {
    let mock = MockTranscriber::new("mock").with_response("测试");
    let (mut session, mut rx) = session_with(mock, fast_config());

    session.on_command(ClientCommand::Start).await;
    assert_eq!(recv(&mut rx).await, ServerMessage::SessionStarted);

    session.on_binary(&[0u8; 2 * 1024]).await;
    // Silence elapses before the next poll tick, so the segment commits.
    assert_eq!(recv(&mut rx).await, ServerMessage::partial("测试"));

    session.on_command(ClientCommand::Stop).await;
    assert_eq!(recv(&mut rx).await, ServerMessage::final_transcript("测试"));
    assert_eq!(recv(&mut rx).await, ServerMessage::SessionEnded);
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_two_utterances_concatenate_without_separator() {
    let mock = MockTranscriber::new("mock").with_script(["你好", "世界"]);
    let (mut session, mut rx) = session_with(mock, fast_config());

    session.on_command(ClientCommand::Start).await;
    assert_eq!(recv(&mut rx).await, ServerMessage::SessionStarted);

    session.on_binary(&[0u8; 2 * 1024]).await;
    assert_eq!(recv(&mut rx).await, ServerMessage::partial("你好"));

    session.on_binary(&[0u8; 2 * 1024]).await;
    assert_eq!(recv(&mut rx).await, ServerMessage::partial("你好世界"));

    session.on_command(ClientCommand::Stop).await;
    assert_eq!(
        recv(&mut rx).await,
        ServerMessage::final_transcript("你好世界")
    );
    assert_eq!(recv(&mut rx).await, ServerMessage::SessionEnded);
}

#[tokio::test]
async fn test_implicit_session_never_acknowledges_start() {
    let mock = MockTranscriber::new("mock").with_response("隐式");
    let (mut session, mut rx) = session_with(mock, fast_config());

    // Audio before any start command activates the session silently.
    session.on_binary(&[0u8; 2 * 1024]).await;
    assert_eq!(session.state(), SessionState::Active);

    // The first message the client sees is a transcript update, not an ack.
    assert_eq!(recv(&mut rx).await, ServerMessage::partial("隐式"));

    session.on_command(ClientCommand::Stop).await;
    assert_eq!(recv(&mut rx).await, ServerMessage::final_transcript("隐式"));
    assert_eq!(recv(&mut rx).await, ServerMessage::SessionEnded);
}

#[tokio::test]
async fn test_stop_mid_utterance_flushes_short_tail() {
    let mock = MockTranscriber::new("mock").with_response("收尾");
    let (mut session, mut rx) = session_with(mock, fast_config());

    session.on_command(ClientCommand::Start).await;
    assert_eq!(recv(&mut rx).await, ServerMessage::SessionStarted);

    // 800 bytes: below the 1024 trigger minimum, above the 512 flush
    // minimum, and stop arrives before any poll tick can fire.
    session.on_binary(&[0u8; 800]).await;
    session.on_command(ClientCommand::Stop).await;

    assert_eq!(recv(&mut rx).await, ServerMessage::final_transcript("收尾"));
    assert_eq!(recv(&mut rx).await, ServerMessage::SessionEnded);
}

#[tokio::test]
async fn test_oneshot_blob_gets_processing_then_result() {
    let mock = MockTranscriber::new("mock").with_response("一次性结果");
    let (tx, mut rx) = mpsc::channel(8);
    let mut session = OneshotSession::new(std::sync::Arc::new(mock), "zh".to_string(), tx);

    session.on_binary(vec![0u8; 4 * 1024]).await;

    match recv(&mut rx).await {
        ServerMessage::Processing { .. } => {}
        other => panic!("expected processing message, got {other:?}"),
    }
    assert_eq!(
        recv(&mut rx).await,
        ServerMessage::Result {
            text: "一次性结果".to_string()
        }
    );
}
