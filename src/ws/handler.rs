use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{HeaderMap, Uri},
    response::Response,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};

use crate::models::messages::{ClientMessage, ErrorMessage, PongMessage, ServerMessage};
use crate::models::CollabError;
use crate::services::auth_service::get_auth_token_from_parts;
use crate::state::AppState;
use crate::ws::rooms::outbox_channel;
use crate::ws::session::Session;

const BINARY_NOT_SUPPORTED: &str = "Binary frames are not supported.";

/// WebSocket handler. The credential is checked before the upgrade so an
/// unauthenticated client never gets a session.
pub async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    ws: WebSocketUpgrade,
) -> Result<Response, CollabError> {
    let token = get_auth_token_from_parts(&headers, uri.query()).map_err(|e| {
        debug!("Rejecting WebSocket connection: {}", e);
        CollabError::Authentication("Token missing.".to_string())
    })?;
    let user_id = state.authenticator.authenticate(&token)?;

    info!("New WebSocket connection attempt by {}", user_id);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, user_id, state)))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, user_id: String, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Everything addressed to this connection, from its own handlers or from peers, goes through the outbox
    let (outbox, mut inbox) = outbox_channel();
    let mut session = Session::new(user_id, outbox);
    let conn_id = session.conn_id;
    info!("WebSocket connection established for {} with connection_id: {}", session.user_id, conn_id);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = inbox.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize message for connection {}: {}", conn_id, e);
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Frames are handled one at a time, so replies leave in request order
    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => handle_frame(&state, &mut session, &text).await,
                Some(Ok(Message::Binary(_))) => {
                    session.send(error_frame(BINARY_NOT_SUPPORTED));
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket error on connection {}: {}", conn_id, e);
                    break;
                }
            },
            _ = &mut send_task => break,
        }
    }

    send_task.abort();
    state.presence.handle_disconnect(&mut session).await;
    info!("WebSocket connection {} terminated", conn_id);
}

async fn handle_frame(state: &AppState, session: &mut Session, text: &str) {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to parse message from {}: {}", session.user_id, e);
            session.send(error_frame(format!("Malformed message: {}", e)));
            return;
        }
    };

    match msg {
        ClientMessage::JoinDocument(doc_id) => {
            let ack = state.presence.handle_join(session, &doc_id).await;
            session.send(ServerMessage::JoinAck(ack));
        }
        ClientMessage::LeaveDocument => state.presence.handle_leave(session).await,
        ClientMessage::TextChange(delta) => {
            state.relay.relay_edit(session, delta).await;
        }
        ClientMessage::SendCursor(cursor) => {
            state.relay.relay_cursor(session, cursor.range).await;
        }
        ClientMessage::DocumentSaved(metadata) => {
            state.relay.relay_saved(session, metadata).await;
        }
        ClientMessage::Ping => handle_ping(session),
    }
}

/// Reply with pong
fn handle_ping(session: &Session) {
    debug!("Ping received from {}", session.user_id);
    let pong = ServerMessage::Pong(PongMessage { date: Utc::now().to_rfc3339() });
    if !session.send(pong) {
        error!("Failed to send Pong message to {}", session.user_id);
    }
}

fn error_frame(message: impl Into<String>) -> ServerMessage {
    ServerMessage::Error(ErrorMessage { message: message.into() })
}
