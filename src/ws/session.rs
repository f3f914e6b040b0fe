use uuid::Uuid;

use crate::models::messages::ServerMessage;
use crate::ws::rooms::Outbox;

/// State of one authenticated realtime connection
#[derive(Debug)]
pub struct Session {
    pub conn_id: Uuid,
    pub user_id: String,
    /// Resolved on first join, then kept for the connection's lifetime
    pub name: Option<String>,
    /// The one room this connection is in, if any
    pub current_room: Option<String>,
    outbox: Outbox,
}

impl Session {
    pub fn new(user_id: impl Into<String>, outbox: Outbox) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            user_id: user_id.into(),
            name: None,
            current_room: None,
            outbox,
        }
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.user_id)
    }

    /// Queue a frame for this connection only. False once the writer is gone
    /// or the outbox is full.
    pub fn send(&self, msg: ServerMessage) -> bool {
        self.outbox.try_send(msg).is_ok()
    }
}
