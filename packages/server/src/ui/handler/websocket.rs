//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use atelier_shared::protocol::ClientEnvelope;

use crate::{
    domain::{ConnectionId, ExerciseId},
    ui::state::AppState,
    usecase::{JoinRequest, RelayPayload},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// When the channel is closed (the connection was unregistered from the MessagePusher),
/// a Close frame is sent and the task ends.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive events
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = state.open_connection_usecase.execute(tx).await;

    let state_clone = state.clone();

    // Spawn a task to receive frames from this connection
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    state_clone
                        .keepalive_usecase
                        .record_activity(&connection_id)
                        .await;
                    dispatch(&state_clone, connection_id, text.as_str()).await;
                }
                Message::Binary(_) => {
                    state_clone
                        .keepalive_usecase
                        .record_activity(&connection_id)
                        .await;
                    tracing::warn!("Ignoring binary frame from '{}'", connection_id);
                }
                Message::Ping(_) | Message::Pong(_) => {
                    // Protocol-level ping/pong is answered by axum
                    state_clone
                        .keepalive_usecase
                        .record_activity(&connection_id)
                        .await;
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
            }
        }
    });

    // Spawn a task to push events to this connection
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .close_connection_usecase
        .execute(&connection_id)
        .await;
}

/// 受信したテキストフレームを解釈して対応するユースケースを呼び出す
///
/// 不正なフレームはログに記録して破棄し、接続は維持する。
async fn dispatch(state: &AppState, connection_id: ConnectionId, text: &str) {
    let envelope = match serde_json::from_str::<ClientEnvelope>(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Dropping malformed envelope from '{}': {}", connection_id, e);
            return;
        }
    };
    tracing::debug!("Received '{}' from '{}'", envelope.kind(), connection_id);

    match envelope {
        ClientEnvelope::Join(identity) => {
            // Convert wire identity -> JoinRequest (Domain Model)
            let request = match JoinRequest::try_from(identity) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!("Rejecting join from '{}': {}", connection_id, e);
                    return;
                }
            };
            if let Err(e) = state.join_room_usecase.execute(connection_id, request).await {
                tracing::warn!("Failed to join '{}': {}", connection_id, e);
            }
        }
        ClientEnvelope::Leave(identity) => {
            let exercise_id = ExerciseId::new(identity.exercise_id);
            if let Err(e) = state
                .leave_room_usecase
                .execute(connection_id, exercise_id)
                .await
            {
                tracing::warn!("Ignoring leave from '{}': {}", connection_id, e);
            }
        }
        ClientEnvelope::UpdateSolution(submission) => {
            relay(
                state,
                connection_id,
                submission.identity.exercise_id,
                RelayPayload::Solution(submission.solution),
            )
            .await;
        }
        ClientEnvelope::Comment(submission) => {
            relay(
                state,
                connection_id,
                submission.identity.exercise_id,
                RelayPayload::Comment(submission.comment),
            )
            .await;
        }
        ClientEnvelope::Ping(_) => {
            state.keepalive_usecase.execute(&connection_id).await;
        }
    }
}

async fn relay(
    state: &AppState,
    connection_id: ConnectionId,
    exercise_id: u64,
    payload: RelayPayload,
) {
    if let Err(e) = state
        .relay_message_usecase
        .execute(connection_id, ExerciseId::new(exercise_id), payload)
        .await
    {
        tracing::warn!("Ignoring message from '{}': {}", connection_id, e);
    }
}
