//! Room Membership Registry
//!
//! Tracks which WebSocket connection belongs to which room and fans events out
//! to a room's members. A connection is in at most one room at a time. Every
//! operation takes the same lock, so a publish never observes a half-applied
//! join or leave.

use crate::ws::protocol::ServerMessage;
use std::collections::{HashMap, HashSet};
use tokio::sync::{Mutex, mpsc};
use tracing::debug;
use uuid::Uuid;

pub type ConnectionId = Uuid;

/// Outbound channel of one connection; drained by that connection's writer task.
pub type ClientSender = mpsc::UnboundedSender<ServerMessage>;

struct Membership {
    room: String,
    sender: ClientSender,
}

#[derive(Default)]
pub struct RoomRegistry {
    members: Mutex<HashMap<ConnectionId, Membership>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `id` in `room`, returning the room it was in before, if any.
    pub async fn join(&self, id: ConnectionId, room: String, sender: ClientSender) -> Option<String> {
        let mut members = self.members.lock().await;
        members
            .insert(id, Membership { room, sender })
            .map(|previous| previous.room)
    }

    /// Removes `id` from its room, returning that room.
    pub async fn leave(&self, id: ConnectionId) -> Option<String> {
        self.members.lock().await.remove(&id).map(|m| m.room)
    }

    pub async fn room_of(&self, id: ConnectionId) -> Option<String> {
        self.members.lock().await.get(&id).map(|m| m.room.clone())
    }

    /// Snapshot of the connections currently in `room`.
    pub async fn members_of(&self, room: &str) -> HashSet<ConnectionId> {
        self.members
            .lock()
            .await
            .iter()
            .filter(|(_, m)| m.room == room)
            .map(|(id, _)| *id)
            .collect()
    }

    pub async fn connection_count(&self) -> usize {
        self.members.lock().await.len()
    }

    /// Queues `message` for every current member of `room` and returns how
    /// many accepted it. Never waits on delivery; an empty room is a no-op.
    pub async fn publish(&self, room: &str, message: ServerMessage) -> usize {
        let members = self.members.lock().await;
        let mut delivered = 0;
        for (id, membership) in members.iter().filter(|(_, m)| m.room == room) {
            if membership.sender.send(message.clone()).is_ok() {
                delivered += 1;
            } else {
                debug!(connection_id = %id, "Skipping closed connection");
            }
        }
        delivered
    }
}
