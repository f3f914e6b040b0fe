use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::messages::{
    CursorBroadcastMessage, Payload, SavedMessage, ServerMessage, TextChangeMessage,
};
use crate::ws::presence::SharedRooms;
use crate::ws::session::Session;

/// Keys the server fills in on `document-saved`; client values are discarded
const RESERVED_SAVE_KEYS: [&str; 3] = ["userId", "name", "timestamp"];

/// Room-scoped fan-out of edits, cursors and save notices.
///
/// Payloads are forwarded untouched and in arrival order. There is no
/// sequencing across senders, so concurrent conflicting edits may diverge.
pub struct Relay {
    rooms: SharedRooms,
}

impl Relay {
    pub fn new(rooms: SharedRooms) -> Self {
        Self { rooms }
    }

    pub async fn relay_edit(&self, session: &Session, delta: Payload) -> usize {
        let msg = ServerMessage::TextChange(TextChangeMessage {
            user_id: session.user_id.clone(),
            name: session.display_name().to_string(),
            delta,
        });
        self.fan_out(session, msg).await
    }

    pub async fn relay_cursor(&self, session: &Session, range: Payload) -> usize {
        let msg = ServerMessage::ReceiveCursor(CursorBroadcastMessage {
            user_id: session.user_id.clone(),
            range,
            name: session.display_name().to_string(),
        });
        self.fan_out(session, msg).await
    }

    pub async fn relay_saved(&self, session: &Session, mut metadata: Map<String, Value>) -> usize {
        for key in RESERVED_SAVE_KEYS {
            metadata.remove(key);
        }
        let msg = ServerMessage::DocumentSaved(SavedMessage {
            user_id: session.user_id.clone(),
            name: session.display_name().to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            metadata,
        });
        self.fan_out(session, msg).await
    }

    async fn fan_out(&self, session: &Session, msg: ServerMessage) -> usize {
        // Events from a connection outside any room are dropped without a reply
        let Some(doc_id) = &session.current_room else {
            debug!("Dropping event from {}: not in a room", session.user_id);
            return 0;
        };
        self.rooms.lock().await.send_to_others(doc_id, session.conn_id, &msg)
    }
}
