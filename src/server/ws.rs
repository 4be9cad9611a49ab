//! WebSocket transport: accepts connections and pumps frames into a
//! per-connection session handler.
//!
//! Each connection gets its own session, scheduler, and writer task; the
//! only thing shared across connections is the transcriber capability,
//! which is safe to call concurrently.

use crate::config::{Config, ServerMode};
use crate::defaults;
use crate::protocol::ServerMessage;
use crate::server::oneshot::OneshotSession;
use crate::server::streaming::{StreamingSession, StreamingSessionConfig};
use crate::stt::Transcriber;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Shared server state: one transcriber capability, one config.
#[derive(Clone)]
pub struct AppState {
    pub transcriber: Arc<dyn Transcriber>,
    pub config: Arc<Config>,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(state)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection_loop(socket, state))
}

async fn connection_loop(socket: WebSocket, state: AppState) {
    let mode = state.config.server.mode;
    info!(%mode, "client connected");

    let (sink, stream) = socket.split();
    let (outbound_tx, outbound_rx) = mpsc::channel::<ServerMessage>(32);
    let writer = tokio::spawn(write_loop(sink, outbound_rx));

    let greeting = match mode {
        ServerMode::Streaming => ServerMessage::Connected {
            message: defaults::STREAMING_GREETING.to_string(),
            mode: mode.to_string(),
        },
        ServerMode::Oneshot => ServerMessage::Connected {
            message: defaults::ONESHOT_GREETING.to_string(),
            mode: mode.to_string(),
        },
    };
    if outbound_tx.send(greeting).await.is_err() {
        return;
    }

    match mode {
        ServerMode::Streaming => {
            let session = StreamingSession::new(
                Arc::clone(&state.transcriber),
                StreamingSessionConfig::from_config(&state.config),
                outbound_tx.clone(),
            );
            streaming_loop(stream, session).await;
        }
        ServerMode::Oneshot => {
            let session = OneshotSession::new(
                Arc::clone(&state.transcriber),
                state.config.stt.language.clone(),
                outbound_tx.clone(),
            );
            oneshot_loop(stream, session).await;
        }
    }

    // All senders are gone at this point; let the writer drain and exit.
    drop(outbound_tx);
    writer.await.ok();
    info!("client disconnected");
}

async fn streaming_loop(mut stream: SplitStream<WebSocket>, mut session: StreamingSession) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Binary(bytes)) => session.on_binary(&bytes).await,
            Ok(Message::Text(text)) => session.on_text(&text).await,
            Ok(Message::Close(frame)) => {
                debug!(?frame, "websocket closed by client");
                break;
            }
            // Transport-level ping/pong is answered upstream.
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Err(e) => {
                warn!(error = %e, "websocket error");
                break;
            }
        }
    }
    session.on_disconnect().await;
}

async fn oneshot_loop(mut stream: SplitStream<WebSocket>, mut session: OneshotSession) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Binary(bytes)) => session.on_binary(bytes).await,
            Ok(Message::Text(text)) => session.on_text(&text).await,
            Ok(Message::Close(frame)) => {
                debug!(?frame, "websocket closed by client");
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Err(e) => {
                warn!(error = %e, "websocket error");
                break;
            }
        }
    }
}

async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<ServerMessage>,
) {
    while let Some(message) = outbound.recv().await {
        let json = match message.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize outbound message");
                continue;
            }
        };
        if sink.send(Message::Text(json)).await.is_err() {
            // Connection gone; outbound writes become no-ops from here on.
            break;
        }
    }
}
