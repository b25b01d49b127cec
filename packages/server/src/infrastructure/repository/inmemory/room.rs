//! InMemory Room Repository 実装
//!
//! The registry keeps each room behind its own `Mutex`, so mutations of one
//! room are serialized while different rooms proceed independently. The
//! outer `RwLock` only guards the key → room map and is held for lookups and
//! first-time inserts, never across a room mutation.
//!
//! Rooms are never evicted: memory grows with the number of distinct keys.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    ConnectionId, DisplayName, DrawDraft, DrawObject, RepositoryError, Room, RoomKey,
    RoomRepository, RoomSummary, Timestamp,
};

type SharedRoom = Arc<Mutex<Room>>;

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: RwLock<HashMap<RoomKey, SharedRoom>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn get_or_create(&self, key: &RoomKey, now: Timestamp) -> SharedRoom {
        if let Some(room) = self.rooms.read().await.get(key) {
            return room.clone();
        }

        // Re-check under the write lock: another task may have won the race.
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(key.clone())
            .or_insert_with(|| {
                tracing::info!("Room '{}' created", key);
                Arc::new(Mutex::new(Room::new(key.clone(), now)))
            })
            .clone()
    }

    async fn find(&self, key: &RoomKey) -> Result<SharedRoom, RepositoryError> {
        self.rooms
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| RepositoryError::RoomNotFound(key.clone()))
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn ensure_room(&self, key: &RoomKey, now: Timestamp) {
        self.get_or_create(key, now).await;
    }

    async fn get_room(&self, key: &RoomKey) -> Option<Room> {
        let room = self.find(key).await.ok()?;
        let room = room.lock().await;
        Some(room.clone())
    }

    async fn list_rooms(&self) -> Vec<RoomSummary> {
        let mut handles: Vec<(RoomKey, SharedRoom)> = self
            .rooms
            .read()
            .await
            .iter()
            .map(|(key, room)| (key.clone(), room.clone()))
            .collect();
        handles.sort_by(|a, b| a.0.cmp(&b.0));

        let mut summaries = Vec::with_capacity(handles.len());
        for (_, room) in handles {
            summaries.push(room.lock().await.summary());
        }
        summaries
    }

    async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    async fn add_presence(
        &self,
        key: &RoomKey,
        connection_id: ConnectionId,
        name: DisplayName,
    ) -> Result<Option<DisplayName>, RepositoryError> {
        let room = self.find(key).await?;
        let mut room = room.lock().await;
        Ok(room.add_presence(connection_id, name))
    }

    async fn remove_presence(
        &self,
        key: &RoomKey,
        connection_id: &ConnectionId,
    ) -> Result<Option<DisplayName>, RepositoryError> {
        let room = self.find(key).await?;
        let mut room = room.lock().await;
        Ok(room.remove_presence(connection_id))
    }

    async fn snapshot_presence(&self, key: &RoomKey) -> Result<Vec<DisplayName>, RepositoryError> {
        let room = self.find(key).await?;
        let room = room.lock().await;
        Ok(room.snapshot_presence())
    }

    async fn append_object(
        &self,
        key: &RoomKey,
        draft: DrawDraft,
        author: DisplayName,
        now: Timestamp,
    ) -> Result<DrawObject, RepositoryError> {
        let room = self.find(key).await?;
        let mut room = room.lock().await;
        Ok(room.append_object(draft, author, now)?)
    }

    async fn clear_objects(&self, key: &RoomKey) -> Result<usize, RepositoryError> {
        let room = self.find(key).await?;
        let mut room = room.lock().await;
        Ok(room.clear_objects())
    }

    async fn snapshot_objects(&self, key: &RoomKey) -> Result<Vec<DrawObject>, RepositoryError> {
        let room = self.find(key).await?;
        let room = room.lock().await;
        Ok(room.snapshot_objects())
    }

    async fn next_sequence(&self, key: &RoomKey) -> Result<u64, RepositoryError> {
        let room = self.find(key).await?;
        let mut room = room.lock().await;
        Ok(room.next_sequence())
    }
}
