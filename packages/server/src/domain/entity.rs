//! Entities: the room aggregate and what it owns.

use std::collections::HashMap;

use super::{
    error::RoomError,
    value_object::{ConnectionId, DisplayName, RoomKey, RoomKind, Timestamp},
};

/// Opaque client-supplied JSON fields, passed through untouched.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// A drawing object as submitted by a client, before the server stamps it.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawDraft {
    /// Object kind such as `path` or `rect`.
    pub kind: String,
    pub geometry: Payload,
}

/// A finished drawing object. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawObject {
    pub id: u64,
    pub kind: String,
    pub geometry: Payload,
    pub author: DisplayName,
    pub created_at: Timestamp,
}

/// A relayed chat message. Not retained by the room.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub author: DisplayName,
    pub payload: Payload,
    pub sent_at: Timestamp,
}

/// What the room listing shows: the room without its objects.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSummary {
    pub key: RoomKey,
    pub created_at: Timestamp,
    pub users: Vec<DisplayName>,
    pub object_count: usize,
}

/// Authoritative state of one room.
///
/// Callers are expected to serialize access (the registry keeps each room
/// behind its own lock).
#[derive(Debug, Clone)]
pub struct Room {
    pub key: RoomKey,
    pub created_at: Timestamp,
    presence: HashMap<ConnectionId, DisplayName>,
    objects: Vec<DrawObject>,
    last_sequence: u64,
}

impl Room {
    pub fn new(key: RoomKey, created_at: Timestamp) -> Self {
        Self {
            key,
            created_at,
            presence: HashMap::new(),
            objects: Vec::new(),
            last_sequence: 0,
        }
    }

    pub fn kind(&self) -> RoomKind {
        self.key.kind
    }

    /// Insert or overwrite the presence entry. Returns the previous name.
    pub fn add_presence(
        &mut self,
        connection_id: ConnectionId,
        name: DisplayName,
    ) -> Option<DisplayName> {
        self.presence.insert(connection_id, name)
    }

    pub fn remove_presence(&mut self, connection_id: &ConnectionId) -> Option<DisplayName> {
        self.presence.remove(connection_id)
    }

    pub fn is_present(&self, connection_id: &ConnectionId) -> bool {
        self.presence.contains_key(connection_id)
    }

    /// Names of every joined connection, sorted.
    ///
    /// Two connections may share a display name; each still appears once.
    pub fn snapshot_presence(&self) -> Vec<DisplayName> {
        let mut names: Vec<DisplayName> = self.presence.values().cloned().collect();
        names.sort();
        names
    }

    pub fn presence_count(&self) -> usize {
        self.presence.len()
    }

    /// Next id from the room's monotonic counter, shared by objects and chat
    /// messages.
    pub fn next_sequence(&mut self) -> u64 {
        self.last_sequence += 1;
        self.last_sequence
    }

    pub fn append_object(
        &mut self,
        draft: DrawDraft,
        author: DisplayName,
        now: Timestamp,
    ) -> Result<DrawObject, RoomError> {
        if !self.kind().retains_objects() {
            return Err(RoomError::ObjectsNotRetained(self.kind()));
        }

        let object = DrawObject {
            id: self.next_sequence(),
            kind: draft.kind,
            geometry: draft.geometry,
            author,
            created_at: now,
        };
        self.objects.push(object.clone());
        Ok(object)
    }

    /// Drop every object. Returns how many were removed.
    pub fn clear_objects(&mut self) -> usize {
        let removed = self.objects.len();
        self.objects = Vec::new();
        removed
    }

    pub fn snapshot_objects(&self) -> Vec<DrawObject> {
        self.objects.clone()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            key: self.key.clone(),
            created_at: self.created_at,
            users: self.snapshot_presence(),
            object_count: self.object_count(),
        }
    }
}
