use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::Permission;

/// Opaque client payload (deltas, cursor ranges). Relayed as received, never inspected.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct Payload(Value);

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload(value)
    }
}

/// An identity present in a room
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CursorMessage {
    pub range: Payload,
}

/// Frames sent by clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinDocument(String),
    LeaveDocument,
    TextChange(Payload),
    SendCursor(CursorMessage),
    DocumentSaved(Map<String, Value>),
    Ping,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JoinAck {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_users: Option<Vec<Member>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<Permission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JoinAck {
    pub fn joined(doc_id: &str, active_users: Vec<Member>, permission: Permission) -> Self {
        Self {
            success: true,
            doc_id: Some(doc_id.to_string()),
            active_users: Some(active_users),
            permission: Some(permission),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            doc_id: None,
            active_users: None,
            permission: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserJoinedMessage {
    pub user_id: String,
    pub name: String,
    pub doc_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserLeftMessage {
    pub user_id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextChangeMessage {
    pub user_id: String,
    pub name: String,
    pub delta: Payload,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CursorBroadcastMessage {
    pub user_id: String,
    pub range: Payload,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedMessage {
    pub user_id: String,
    pub name: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PongMessage {
    pub date: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorMessage {
    pub message: String,
}

/// Frames sent by the server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    JoinAck(JoinAck),
    UserJoined(UserJoinedMessage),
    UserLeft(UserLeftMessage),
    TextChange(TextChangeMessage),
    ReceiveCursor(CursorBroadcastMessage),
    DocumentSaved(SavedMessage),
    Pong(PongMessage),
    Error(ErrorMessage),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_frames_use_event_names() {
        let join: ClientMessage =
            serde_json::from_value(json!({"type": "join-document", "data": "d1"})).unwrap();
        assert_eq!(join, ClientMessage::JoinDocument("d1".to_string()));

        let leave: ClientMessage =
            serde_json::from_value(json!({"type": "leave-document"})).unwrap();
        assert_eq!(leave, ClientMessage::LeaveDocument);

        let cursor: ClientMessage = serde_json::from_value(
            json!({"type": "send-cursor", "data": {"range": {"index": 3, "length": 0}}}),
        )
        .unwrap();
        assert_eq!(
            cursor,
            ClientMessage::SendCursor(CursorMessage {
                range: json!({"index": 3, "length": 0}).into()
            })
        );
    }

    #[test]
    fn failed_ack_omits_room_fields() {
        let value = serde_json::to_value(ServerMessage::JoinAck(JoinAck::failed("nope"))).unwrap();
        assert_eq!(
            value,
            json!({"type": "join-ack", "data": {"success": false, "message": "nope"}})
        );
    }

    #[test]
    fn saved_message_flattens_metadata() {
        let mut metadata = Map::new();
        metadata.insert("title".to_string(), json!("Notes"));
        let msg = ServerMessage::DocumentSaved(SavedMessage {
            user_id: "u1".to_string(),
            name: "Ada".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            metadata,
        });
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["data"]["title"], json!("Notes"));
        assert_eq!(value["data"]["userId"], json!("u1"));
    }
}
