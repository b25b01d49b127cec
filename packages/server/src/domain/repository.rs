//! Room Repository trait 定義
//!
//! The room registry as the domain sees it. Every operation addresses a room
//! by [`RoomKey`]; implementations own the rooms and serialize access to each
//! one internally, so callers never hold a room lock themselves.

use async_trait::async_trait;

use super::{
    ConnectionId, DisplayName, DrawDraft, DrawObject, RepositoryError, Room, RoomKey, RoomSummary,
    Timestamp,
};

/// Registry of live rooms.
///
/// A room is created lazily by [`RoomRepository::ensure_room`] and lives for
/// the rest of the process. Operations other than `ensure_room` fail with
/// [`RepositoryError::RoomNotFound`] for keys that were never created.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Get or create the room. Concurrent first calls for one key construct
    /// exactly one room; later calls leave it untouched.
    async fn ensure_room(&self, key: &RoomKey, now: Timestamp);

    /// Snapshot of an existing room.
    async fn get_room(&self, key: &RoomKey) -> Option<Room>;

    /// Summaries of every room, ordered by key. Objects are counted, not
    /// copied.
    async fn list_rooms(&self) -> Vec<RoomSummary>;

    async fn room_count(&self) -> usize;

    /// Insert or overwrite a presence entry. Returns the previous name.
    async fn add_presence(
        &self,
        key: &RoomKey,
        connection_id: ConnectionId,
        name: DisplayName,
    ) -> Result<Option<DisplayName>, RepositoryError>;

    /// Remove a presence entry. Returns the removed name, `None` if the
    /// connection had not joined (or was already removed).
    async fn remove_presence(
        &self,
        key: &RoomKey,
        connection_id: &ConnectionId,
    ) -> Result<Option<DisplayName>, RepositoryError>;

    async fn snapshot_presence(&self, key: &RoomKey) -> Result<Vec<DisplayName>, RepositoryError>;

    /// Stamp and append a drawing object.
    async fn append_object(
        &self,
        key: &RoomKey,
        draft: DrawDraft,
        author: DisplayName,
        now: Timestamp,
    ) -> Result<DrawObject, RepositoryError>;

    /// Reset the object sequence. Returns how many objects were dropped.
    async fn clear_objects(&self, key: &RoomKey) -> Result<usize, RepositoryError>;

    async fn snapshot_objects(&self, key: &RoomKey) -> Result<Vec<DrawObject>, RepositoryError>;

    /// Next value of the room's id counter.
    async fn next_sequence(&self, key: &RoomKey) -> Result<u64, RepositoryError>;
}
