use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::db::store::DocStore;
use crate::models::messages::{JoinAck, Member, ServerMessage, UserJoinedMessage, UserLeftMessage};
use crate::models::{CollabError, Document};
use crate::ws::namecache::NameCache;
use crate::ws::rooms::RoomRegistry;
use crate::ws::session::Session;

pub const DOC_ID_REQUIRED: &str = "Document ID required.";
pub const DOC_NOT_FOUND: &str = "No doc found for given docId.";
pub const JOIN_SERVER_ERROR: &str = "Server error joining document.";

/// Registry handle shared by the presence controller and the relay
pub type SharedRooms = Arc<Mutex<RoomRegistry>>;

/// Moves sessions between rooms and tells the rest of the room about it.
///
/// The registry lock is only held in sections without an `.await`, so each
/// registry step runs to completion before another session's event is applied.
pub struct Presence {
    rooms: SharedRooms,
    store: Arc<dyn DocStore>,
    names: Arc<NameCache>,
}

impl Presence {
    pub fn new(rooms: SharedRooms, store: Arc<dyn DocStore>, names: Arc<NameCache>) -> Self {
        Self { rooms, store, names }
    }

    pub async fn handle_join(&self, session: &mut Session, doc_id: &str) -> JoinAck {
        let doc_id = doc_id.trim();
        if doc_id.is_empty() {
            return JoinAck::failed(DOC_ID_REQUIRED);
        }

        let name = match &session.name {
            Some(name) => name.clone(),
            None => {
                let name = self.names.resolve(&session.user_id).await;
                session.name = Some(name.clone());
                name
            }
        };

        // One room per connection: leave the previous one before anything else
        if session.current_room.is_some() {
            self.handle_leave(session).await;
        }

        let doc = match self.load_document(doc_id).await {
            Ok(doc) => doc,
            Err(CollabError::Transient(e)) => {
                error!("Error joining document {}: {}", doc_id, e);
                return JoinAck::failed(JOIN_SERVER_ERROR);
            }
            Err(e) => {
                debug!("User {} cannot join {}: {}", session.user_id, doc_id, e);
                return JoinAck::failed(DOC_NOT_FOUND);
            }
        };

        // Registry state is read fresh after the store lookup
        let room_key = doc.id.to_string();
        let member = Member { id: session.user_id.clone(), name: name.clone() };
        let outcome = {
            let mut rooms = self.rooms.lock().await;
            let outcome = rooms.join(&room_key, session.conn_id, member, session.outbox().clone());
            if outcome.newly_present {
                let joined = ServerMessage::UserJoined(UserJoinedMessage {
                    user_id: session.user_id.clone(),
                    name,
                    doc_id: room_key.clone(),
                });
                rooms.send_to_others(&room_key, session.conn_id, &joined);
            }
            outcome
        };
        session.current_room = Some(room_key.clone());

        info!("User {} joined document {}", session.user_id, room_key);
        JoinAck::joined(&room_key, outcome.members, doc.permission_of(&session.user_id))
    }

    pub async fn handle_leave(&self, session: &mut Session) {
        let Some(doc_id) = session.current_room.take() else {
            return;
        };
        self.evict(&doc_id, session.conn_id).await;
        info!("User {} left document {}", session.user_id, doc_id);
    }

    /// Runs once when the connection's read loop ends, whatever the cause
    pub async fn handle_disconnect(&self, session: &mut Session) {
        if let Some(doc_id) = &session.current_room {
            info!("User {} disconnected from room {}", session.user_id, doc_id);
        }
        self.handle_leave(session).await;
    }

    pub async fn members(&self, doc_id: &str) -> Vec<Member> {
        self.rooms.lock().await.members(doc_id)
    }

    async fn evict(&self, doc_id: &str, conn_id: Uuid) {
        let mut rooms = self.rooms.lock().await;
        if let Some(member) = rooms.leave(doc_id, conn_id) {
            let left = ServerMessage::UserLeft(UserLeftMessage {
                user_id: member.id,
                name: member.name,
            });
            rooms.send_to_others(doc_id, conn_id, &left);
        }
    }

    async fn load_document(&self, doc_id: &str) -> Result<Document, CollabError> {
        let id = Uuid::parse_str(doc_id)
            .map_err(|_| CollabError::InvalidDocumentId(doc_id.to_string()))?;
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CollabError::DocumentNotFound(doc_id.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::memory::{MemoryDocStore, StaticDirectory};
    use crate::models::Permission;
    use crate::ws::namecache::NameCachePolicy;
    use crate::ws::rooms::outbox_channel;
    use tokio::sync::mpsc::Receiver;

    pub(crate) struct Fixture {
        pub rooms: SharedRooms,
        pub store: Arc<MemoryDocStore>,
        pub presence: Presence,
    }

    pub(crate) fn fixture() -> Fixture {
        let rooms: SharedRooms = Arc::new(Mutex::new(RoomRegistry::new()));
        let store = Arc::new(MemoryDocStore::new());
        let directory = Arc::new(StaticDirectory::with_names([
            ("u1", "Ada"),
            ("u2", "Grace"),
            ("u3", "Linus"),
        ]));
        let names = Arc::new(NameCache::new(directory, NameCachePolicy::Never, 100));
        let presence = Presence::new(rooms.clone(), store.clone(), names);
        Fixture { rooms, store, presence }
    }

    pub(crate) fn session(uid: &str) -> (Session, Receiver<ServerMessage>) {
        let (tx, rx) = outbox_channel();
        (Session::new(uid, tx), rx)
    }

    pub(crate) async fn new_doc(store: &MemoryDocStore, owner: &str) -> String {
        let doc = Document::new(owner);
        store.insert(&doc).await.unwrap();
        doc.id.to_string()
    }

    pub(crate) fn drain(rx: &mut Receiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn ids(members: &[Member]) -> Vec<&str> {
        members.iter().map(|m| m.id.as_str()).collect()
    }

    #[tokio::test]
    async fn join_scenario_notifies_peers_and_lists_members() {
        let f = fixture();
        let d1 = new_doc(&f.store, "u1").await;
        let (mut s1, mut rx1) = session("u1");
        let (mut s2, mut rx2) = session("u2");
        let (mut s3, _rx3) = session("u3");

        let ack1 = f.presence.handle_join(&mut s1, &d1).await;
        assert!(ack1.success);
        assert_eq!(ids(&ack1.active_users.unwrap()), vec!["u1"]);
        assert_eq!(ack1.permission, Some(Permission::Owner));

        let ack2 = f.presence.handle_join(&mut s2, &d1).await;
        assert_eq!(ids(&ack2.active_users.unwrap()), vec!["u1", "u2"]);
        assert_eq!(ack2.permission, Some(Permission::None));
        assert_eq!(
            drain(&mut rx1),
            vec![ServerMessage::UserJoined(UserJoinedMessage {
                user_id: "u2".to_string(),
                name: "Grace".to_string(),
                doc_id: d1.clone(),
            })]
        );
        // The joiner is not told about itself
        assert!(drain(&mut rx2).is_empty());

        f.presence.handle_disconnect(&mut s2).await;
        assert_eq!(
            drain(&mut rx1),
            vec![ServerMessage::UserLeft(UserLeftMessage {
                user_id: "u2".to_string(),
                name: "Grace".to_string(),
            })]
        );

        let ack3 = f.presence.handle_join(&mut s3, &d1).await;
        assert_eq!(ids(&ack3.active_users.unwrap()), vec!["u1", "u3"]);
    }

    #[tokio::test]
    async fn rejoining_moves_the_session() {
        let f = fixture();
        let d1 = new_doc(&f.store, "u1").await;
        let d2 = new_doc(&f.store, "u1").await;
        let (mut s1, _rx1) = session("u1");
        let (mut s2, mut rx2) = session("u2");

        f.presence.handle_join(&mut s2, &d1).await;
        f.presence.handle_join(&mut s1, &d1).await;
        drain(&mut rx2);

        let ack = f.presence.handle_join(&mut s1, &d2).await;
        assert!(ack.success);
        assert_eq!(s1.current_room.as_deref(), Some(d2.as_str()));
        assert_eq!(ids(&f.presence.members(&d1).await), vec!["u2"]);
        assert_eq!(ids(&f.presence.members(&d2).await), vec!["u1"]);
        assert!(matches!(drain(&mut rx2).as_slice(), [ServerMessage::UserLeft(m)] if m.user_id == "u1"));
    }

    #[tokio::test]
    async fn failed_join_leaves_session_unjoined() {
        let f = fixture();
        let d1 = new_doc(&f.store, "u1").await;
        let (mut s1, _rx1) = session("u1");
        f.presence.handle_join(&mut s1, &d1).await;

        let missing = Uuid::new_v4().to_string();
        for bad in [missing.as_str(), "not-a-uuid"] {
            let ack = f.presence.handle_join(&mut s1, bad).await;
            assert!(!ack.success);
            assert_eq!(ack.message.as_deref(), Some(DOC_NOT_FOUND));
        }
        assert_eq!(s1.current_room, None);
        assert!(f.presence.members(&d1).await.is_empty());
        assert_eq!(f.rooms.lock().await.room_count(), 0);

        let ack = f.presence.handle_join(&mut s1, "  ").await;
        assert_eq!(ack.message.as_deref(), Some(DOC_ID_REQUIRED));
    }

    #[tokio::test]
    async fn duplicate_joins_keep_one_entry() {
        let f = fixture();
        let d1 = new_doc(&f.store, "u1").await;
        let (mut s1, _rx1) = session("u1");
        let (mut s1b, _rx1b) = session("u1");

        f.presence.handle_join(&mut s1, &d1).await;
        f.presence.handle_join(&mut s1, &d1).await;
        let ack = f.presence.handle_join(&mut s1b, &d1).await;
        assert_eq!(ids(&ack.active_users.unwrap()), vec!["u1"]);
    }

    #[tokio::test]
    async fn disconnect_removes_identity_with_a_second_connection_open() {
        let f = fixture();
        let d1 = new_doc(&f.store, "u1").await;
        let (mut s1, mut rx1) = session("u1");
        let (mut a, _rx_a) = session("u2");
        let (mut b, mut rx_b) = session("u2");
        f.presence.handle_join(&mut s1, &d1).await;
        f.presence.handle_join(&mut a, &d1).await;
        f.presence.handle_join(&mut b, &d1).await;
        drain(&mut rx1);
        drain(&mut rx_b);

        f.presence.handle_disconnect(&mut a).await;

        assert_eq!(ids(&f.presence.members(&d1).await), vec!["u1"]);
        let left = ServerMessage::UserLeft(UserLeftMessage {
            user_id: "u2".to_string(),
            name: "Grace".to_string(),
        });
        assert_eq!(drain(&mut rx1), vec![left.clone()]);
        assert_eq!(drain(&mut rx_b), vec![left]);

        // The other connection leaving later does not announce u2 twice
        f.presence.handle_disconnect(&mut b).await;
        assert!(drain(&mut rx1).is_empty());
    }

    #[tokio::test]
    async fn leave_is_idempotent() {
        let f = fixture();
        let d1 = new_doc(&f.store, "u1").await;
        let (mut s1, _rx1) = session("u1");
        let (mut s2, mut rx2) = session("u2");
        f.presence.handle_join(&mut s2, &d1).await;

        f.presence.handle_leave(&mut s1).await;
        f.presence.handle_join(&mut s1, &d1).await;
        drain(&mut rx2);

        f.presence.handle_leave(&mut s1).await;
        f.presence.handle_leave(&mut s1).await;
        assert_eq!(drain(&mut rx2).len(), 1);
        assert_eq!(ids(&f.presence.members(&d1).await), vec!["u2"]);
    }

    #[tokio::test]
    async fn display_name_is_resolved_once_per_session() {
        let f = fixture();
        let d1 = new_doc(&f.store, "u1").await;
        let (mut s1, _rx1) = session("u1");
        assert_eq!(s1.display_name(), "u1");
        f.presence.handle_join(&mut s1, &d1).await;
        assert_eq!(s1.name.as_deref(), Some("Ada"));
    }
}
