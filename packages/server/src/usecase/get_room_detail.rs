//! UseCase: ルーム詳細取得

use std::sync::Arc;

use crate::domain::{BroadcastBus, Room, RoomKey, RoomRepository};

/// A full room snapshot, objects included, plus this instance's socket count.
#[derive(Debug, Clone)]
pub struct RoomDetail {
    pub room: Room,
    pub connections: usize,
}

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
    bus: Arc<dyn BroadcastBus>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, bus: Arc<dyn BroadcastBus>) -> Self {
        Self { repository, bus }
    }

    /// Looking a room up never creates it.
    pub async fn execute(&self, key: &RoomKey) -> Option<RoomDetail> {
        let room = self.repository.get_room(key).await?;
        let connections = self.bus.connection_count(key).await;
        Some(RoomDetail { room, connections })
    }
}
