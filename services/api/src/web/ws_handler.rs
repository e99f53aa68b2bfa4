//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a criteria upload WebSocket.
//! Each connection mounts its own submission state machine.

use crate::web::{
    protocol::ServerMessage,
    state::{AppState, AuthedClient},
    upload_task::{relay_snapshots, UploadSession},
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    Extension,
};
use futures::{SinkExt, StreamExt};
use interview_prep_core::{SubmissionController, SubmissionSnapshot};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn criteria_ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    Extension(client): Extension<AuthedClient>,
) -> Response {
    let limit = app_state.config.max_upload_bytes;
    ws.max_message_size(limit)
        .on_upgrade(move |socket| handle_socket(socket, app_state, client))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, client: AuthedClient) {
    let user = client
        .context
        .lock()
        .await
        .session
        .identity()
        .map(|u| u.email.clone())
        .unwrap_or_default();
    info!("New criteria upload connection for {}", user);

    let (mut sender, mut receiver) = socket.split();
    let cancellation_token = CancellationToken::new();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel::<SubmissionSnapshot>();

    // --- 1. Writer: the only task that touches the socket sink ---
    let writer = {
        let token = cancellation_token.clone();
        tokio::spawn(async move {
            loop {
                let message = tokio::select! {
                    _ = token.cancelled() => break,
                    next = outbound_rx.recv() => match next {
                        Some(message) => message,
                        None => break,
                    },
                };
                let json = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize server message: {}", e);
                        continue;
                    }
                };
                if sender.send(Message::Text(json.into())).await.is_err() {
                    error!("Failed to send message to client. Ending writer.");
                    break;
                }
            }
        })
    };

    // --- 2. Relay: submission snapshots become server messages ---
    let relay = tokio::spawn(relay_snapshots(
        snapshot_rx,
        outbound_tx.clone(),
        cancellation_token.clone(),
    ));

    let controller = Arc::new(SubmissionController::new(
        app_state.extractor.clone(),
        app_state.config.ramp_schedule(),
    ));
    let _ = outbound_tx.send(ServerMessage::Status {
        snapshot: controller.snapshot().await,
    });

    let mut session = UploadSession::new(
        controller,
        outbound_tx,
        snapshot_tx,
        app_state.config.max_upload_bytes,
    );

    // --- 3. Main Message Loop ---
    loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => session.on_text(text.as_str()).await,
            Some(Ok(Message::Binary(data))) => session.on_binary(&data),
            Some(Ok(Message::Close(_))) => {
                info!("Client sent close message.");
                break;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                error!("WebSocket receive error: {}", e);
                break;
            }
            None => {
                info!("Client disconnected.");
                break;
            }
        }
    }

    // --- 4. Cleanup ---
    session.shutdown();
    cancellation_token.cancel();
    let _ = tokio::join!(writer, relay);
    info!("Criteria upload connection closed for {}", user);
}
