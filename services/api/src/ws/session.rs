//! Manages the WebSocket connection lifecycle for a browser client.

use super::protocol::{ClientMessage, SLIDE_GENERATED, ServerMessage, WELCOME_MESSAGE};
use crate::{rooms::ClientSender, state::AppState};
use anyhow::Result;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use hcv_tutor_core::slide::{SlideKind, now_millis, resolve_slide};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual WebSocket connection.
///
/// Outbound messages go through an unbounded channel drained by a dedicated
/// writer task, which lets the room registry publish without awaiting the
/// socket. The connection leaves its room when the socket closes.
#[instrument(name = "ws_connection", skip_all, fields(connection_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    tracing::Span::current().record("connection_id", &connection_id.to_string());
    info!("Client connected.");

    let (mut socket_tx, mut socket_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = send_msg(&mut socket_tx, &msg).await {
                warn!(error = ?e, "Failed to write to client; closing writer.");
                break;
            }
        }
    });

    while let Some(msg_result) = socket_rx.next().await {
        match msg_result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(msg) => handle_client_message(&state, connection_id, &tx, msg).await,
                Err(e) => {
                    warn!(error = %e, "Ignoring malformed client message.");
                    let _ = tx.send(ServerMessage::Error {
                        message: format!("Invalid message: {e}"),
                    });
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client sent close frame.");
                break;
            }
            Ok(Message::Binary(_)) => warn!("Ignoring binary message."),
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Err(e) => {
                warn!(error = ?e, "Error receiving from client WebSocket.");
                break;
            }
        }
    }

    if let Some(room) = state.rooms.leave(connection_id).await {
        info!(%room, "Client left room.");
    }
    drop(tx);
    let _ = writer.await;
    info!("Client disconnected.");
}

async fn handle_client_message(
    state: &Arc<AppState>,
    connection_id: Uuid,
    tx: &ClientSender,
    msg: ClientMessage,
) {
    let reply = match msg {
        ClientMessage::JoinRoom { room_name } => {
            let previous = state
                .rooms
                .join(connection_id, room_name.clone(), tx.clone())
                .await;
            info!(room = %room_name, ?previous, "Client joined room.");
            ServerMessage::agent_message("welcome", WELCOME_MESSAGE)
        }
        ClientMessage::RequestSlide {
            lesson,
            slide_type,
            topic,
        } => {
            info!(%lesson, %slide_type, ?topic, "Slide requested.");
            let lesson = state.catalog.get_or_fallback(&lesson);
            let kind = slide_type.parse().unwrap_or(SlideKind::Content);
            let slide = resolve_slide(kind, &lesson, topic.unwrap_or(0), None, now_millis());
            ServerMessage::slide_update(SLIDE_GENERATED, slide)
        }
        ClientMessage::StartLesson { lesson } => {
            info!(%lesson, "Lesson started by client.");
            let title = state.catalog.get_or_fallback(&lesson).title;
            ServerMessage::lesson_message(
                "lesson-started",
                &lesson,
                format!(
                    "Great! Let's begin the {title} lesson. I'll be showing you visual slides as we go through each topic."
                ),
            )
        }
        ClientMessage::NextTopic { lesson } => {
            info!(%lesson, "Next topic requested by client.");
            let title = state.catalog.get_or_fallback(&lesson).title;
            ServerMessage::lesson_message(
                "topic-progress",
                &lesson,
                format!("Moving to the next topic in {title}. Let me explain this in detail..."),
            )
        }
    };
    let _ = tx.send(reply);
}

/// A helper function to serialize and send a `ServerMessage` to the client.
pub(crate) async fn send_msg(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<()> {
    let serialized = serde_json::to_string(msg)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}
