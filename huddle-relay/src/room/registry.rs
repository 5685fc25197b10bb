use std::sync::Arc;

use axum::extract::ws::{Message, Utf8Bytes};
use dashmap::DashMap;
use huddle_core::SignalMessage;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Relay-internal identifier for one WebSocket connection.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub(crate) struct ConnId(Uuid);

impl ConnId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

pub(crate) struct Occupant {
    pub(crate) id: ConnId,
    pub(crate) username: String,
    pub(crate) tx: mpsc::UnboundedSender<Message>,
}

/// One room holds at most two occupants, in arrival order. The arrival
/// index is the player id handed back in the `start` acknowledgment.
struct Room {
    occupants: Vec<Occupant>,
}

impl Room {
    fn new() -> Self {
        Self {
            occupants: Vec::with_capacity(2),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    #[error("room {0} already has two occupants")]
    RoomFull(String),
}

/// The relay's entire state: a map from room id to its occupants. Payloads
/// other than `join` are never inspected, only forwarded.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<String, Room>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
        }
    }

    /// Registers a connection in a room and returns its player index. The
    /// earlier occupant, if any, is told someone arrived.
    pub(crate) fn join(&self, room_id: &str, occupant: Occupant) -> Result<u8, JoinError> {
        let mut room = self
            .rooms
            .entry(room_id.to_owned())
            .or_insert_with(Room::new);

        if room.occupants.len() >= 2 {
            return Err(JoinError::RoomFull(room_id.to_owned()));
        }

        let player_id = room.occupants.len() as u8;
        let joined = SignalMessage::UserJoined {
            username: occupant.username.clone(),
        };
        for other in &room.occupants {
            notify(other, &joined);
        }
        room.occupants.push(occupant);
        Ok(player_id)
    }

    /// Forwards a raw frame, untouched, to the other occupant of the room.
    pub(crate) fn forward(&self, room_id: &str, from: ConnId, frame: Utf8Bytes) {
        let Some(room) = self.rooms.get(room_id) else {
            warn!(room_id, "frame for an unknown room");
            return;
        };
        for other in room.occupants.iter().filter(|o| o.id != from) {
            if other.tx.send(Message::Text(frame.clone())).is_err() {
                warn!(room_id, "dropping frame for a disconnecting occupant");
            }
        }
    }

    /// Removes a connection, tells the remaining occupant, and drops the
    /// room once it is empty.
    pub(crate) fn leave(&self, room_id: &str, id: ConnId) {
        let mut empty = false;
        if let Some(mut room) = self.rooms.get_mut(room_id) {
            let Some(position) = room.occupants.iter().position(|o| o.id == id) else {
                return;
            };
            let occupant = room.occupants.remove(position);
            info!(room_id, username = %occupant.username, "occupant left");

            let left = SignalMessage::UserLeft {
                username: occupant.username,
            };
            for other in &room.occupants {
                notify(other, &left);
            }
            empty = room.occupants.is_empty();
        }

        if empty {
            self.rooms
                .remove_if(room_id, |_, room| room.occupants.is_empty());
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn notify(occupant: &Occupant, message: &SignalMessage) {
    if let Some(frame) = encode(message) {
        let _ = occupant.tx.send(frame);
    }
}

/// Serializes a relay-originated message into a text frame.
pub(crate) fn encode(message: &SignalMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            error!("failed to serialize relay message: {e}");
            None
        }
    }
}
