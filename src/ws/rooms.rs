use std::collections::HashMap;

use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tracing::warn;
use uuid::Uuid;

use crate::models::messages::{Member, ServerMessage};

/// Frames a connection may have queued before further frames to it are dropped
pub const OUTBOX_CAPACITY: usize = 256;

/// Sending half of a connection's writer queue
pub type Outbox = Sender<ServerMessage>;

pub fn outbox_channel() -> (Outbox, Receiver<ServerMessage>) {
    mpsc::channel(OUTBOX_CAPACITY)
}

struct Peer {
    user_id: String,
    outbox: Outbox,
}

#[derive(Default)]
struct Room {
    /// Unique by id, in first-join order
    members: Vec<Member>,
    peers: HashMap<Uuid, Peer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Everyone present after the join, including the joiner
    pub members: Vec<Member>,
    /// False when the identity was already a member
    pub newly_present: bool,
}

/// Document id → present identities and their connections.
///
/// Membership is per identity, delivery is per connection. When any
/// connection of an identity leaves, the identity leaves the member set;
/// its other connections keep receiving room traffic until they leave too.
/// Empty rooms are dropped.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, doc_id: &str, conn_id: Uuid, member: Member, outbox: Outbox) -> JoinOutcome {
        let room = self.rooms.entry(doc_id.to_string()).or_default();

        let newly_present = !room.members.iter().any(|m| m.id == member.id);
        if newly_present {
            room.members.push(member.clone());
        }
        room.peers.insert(conn_id, Peer { user_id: member.id, outbox });

        JoinOutcome {
            members: room.members.clone(),
            newly_present,
        }
    }

    /// Remove one connection and its identity from the member set. Returns the
    /// member if the identity was still listed. Unknown rooms and connections
    /// are a no-op.
    pub fn leave(&mut self, doc_id: &str, conn_id: Uuid) -> Option<Member> {
        let room = self.rooms.get_mut(doc_id)?;
        let peer = room.peers.remove(&conn_id)?;

        let departed = room
            .members
            .iter()
            .position(|m| m.id == peer.user_id)
            .map(|i| room.members.remove(i));

        if room.peers.is_empty() {
            self.rooms.remove(doc_id);
        }
        departed
    }

    pub fn members(&self, doc_id: &str) -> Vec<Member> {
        self.rooms
            .get(doc_id)
            .map(|room| room.members.clone())
            .unwrap_or_default()
    }

    /// Queue `msg` for every connection in the room except `sender`.
    /// Returns the number of connections it was queued for.
    pub fn send_to_others(&self, doc_id: &str, sender: Uuid, msg: &ServerMessage) -> usize {
        let Some(room) = self.rooms.get(doc_id) else {
            return 0;
        };
        let mut queued = 0;
        for (conn_id, peer) in &room.peers {
            if *conn_id == sender {
                continue;
            }
            match peer.outbox.try_send(msg.clone()) {
                Ok(()) => queued += 1,
                Err(TrySendError::Full(_)) => {
                    warn!("Outbox of connection {} in {} is full, dropping frame", conn_id, doc_id);
                }
                // A closed outbox belongs to a connection that is already going away
                Err(TrySendError::Closed(_)) => {}
            }
        }
        queued
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn connection_count(&self) -> usize {
        self.rooms.values().map(|room| room.peers.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::messages::PongMessage;
    use tokio::sync::mpsc::{channel, Receiver};

    fn member(id: &str) -> Member {
        Member { id: id.to_string(), name: id.to_uppercase() }
    }

    fn outbox() -> (Outbox, Receiver<ServerMessage>) {
        outbox_channel()
    }

    fn ping() -> ServerMessage {
        ServerMessage::Pong(PongMessage { date: "now".to_string() })
    }

    #[test]
    fn duplicate_joins_do_not_duplicate_members() {
        let mut rooms = RoomRegistry::new();
        let (tx, _rx) = outbox();
        let conn = Uuid::new_v4();

        let first = rooms.join("d1", conn, member("u1"), tx.clone());
        let second = rooms.join("d1", conn, member("u1"), tx.clone());
        let other_conn = rooms.join("d1", Uuid::new_v4(), member("u1"), tx);

        assert!(first.newly_present);
        assert!(!second.newly_present);
        assert!(!other_conn.newly_present);
        assert_eq!(rooms.members("d1"), vec![member("u1")]);
    }

    #[test]
    fn leave_is_idempotent() {
        let mut rooms = RoomRegistry::new();
        let (tx, _rx) = outbox();
        let conn = Uuid::new_v4();
        rooms.join("d1", conn, member("u1"), tx);

        assert_eq!(rooms.leave("d1", conn), Some(member("u1")));
        assert_eq!(rooms.leave("d1", conn), None);
        assert_eq!(rooms.leave("nowhere", Uuid::new_v4()), None);
        assert_eq!(rooms.room_count(), 0);
    }

    #[test]
    fn leaving_removes_identity_even_with_another_connection() {
        let mut rooms = RoomRegistry::new();
        let (tx_a, _rx_a) = outbox();
        let (tx_b, mut rx_b) = outbox();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        rooms.join("d1", a, member("u1"), tx_a);
        rooms.join("d1", b, member("u1"), tx_b);

        assert_eq!(rooms.leave("d1", a), Some(member("u1")));
        assert!(rooms.members("d1").is_empty());

        // The remaining connection still gets room traffic
        assert_eq!(rooms.connection_count(), 1);
        assert_eq!(rooms.send_to_others("d1", a, &ping()), 1);
        assert_eq!(rx_b.try_recv().unwrap(), ping());

        assert_eq!(rooms.leave("d1", b), None);
        assert_eq!(rooms.room_count(), 0);
    }

    #[test]
    fn members_keep_join_order() {
        let mut rooms = RoomRegistry::new();
        let (tx, _rx) = outbox();
        let conns: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for (conn, id) in conns.iter().zip(["u1", "u2", "u3"]) {
            rooms.join("d1", *conn, member(id), tx.clone());
        }
        rooms.leave("d1", conns[1]);
        assert_eq!(rooms.members("d1"), vec![member("u1"), member("u3")]);
        assert_eq!(rooms.connection_count(), 2);
    }

    #[test]
    fn fan_out_skips_sender_and_other_rooms() {
        let mut rooms = RoomRegistry::new();
        let (tx1, mut rx1) = outbox();
        let (tx2, mut rx2) = outbox();
        let (tx3, mut rx3) = outbox();
        let (c1, c2, c3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        rooms.join("d1", c1, member("u1"), tx1);
        rooms.join("d1", c2, member("u2"), tx2);
        rooms.join("d2", c3, member("u3"), tx3);

        assert_eq!(rooms.send_to_others("d1", c1, &ping()), 1);
        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().unwrap(), ping());
        assert!(rx3.try_recv().is_err());
    }

    #[test]
    fn closed_outboxes_are_not_counted() {
        let mut rooms = RoomRegistry::new();
        let (tx1, _rx1) = outbox();
        let (tx2, rx2) = outbox();
        let (c1, c2) = (Uuid::new_v4(), Uuid::new_v4());
        rooms.join("d1", c1, member("u1"), tx1);
        rooms.join("d1", c2, member("u2"), tx2);
        drop(rx2);

        assert_eq!(rooms.send_to_others("d1", c1, &ping()), 0);
    }

    #[test]
    fn full_outboxes_drop_frames() {
        let mut rooms = RoomRegistry::new();
        let (tx1, _rx1) = outbox();
        let (tx2, mut rx2) = channel(1);
        let (c1, c2) = (Uuid::new_v4(), Uuid::new_v4());
        rooms.join("d1", c1, member("u1"), tx1);
        rooms.join("d1", c2, member("u2"), tx2);

        assert_eq!(rooms.send_to_others("d1", c1, &ping()), 1);
        assert_eq!(rooms.send_to_others("d1", c1, &ping()), 0);
        assert_eq!(rx2.try_recv().unwrap(), ping());
        assert!(rx2.try_recv().is_err());
    }
}
