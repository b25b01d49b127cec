//! UseCase: ルーム一覧取得

use std::sync::Arc;

use crate::domain::{BroadcastBus, RoomRepository, RoomSummary};

/// A room summary plus how many sockets this instance holds for it.
#[derive(Debug, Clone)]
pub struct RoomOverview {
    pub summary: RoomSummary,
    pub connections: usize,
}

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
    bus: Arc<dyn BroadcastBus>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, bus: Arc<dyn BroadcastBus>) -> Self {
        Self { repository, bus }
    }

    /// 全ルームを種別・ID 順で返す
    pub async fn execute(&self) -> Vec<RoomOverview> {
        let summaries = self.repository.list_rooms().await;
        let mut overviews = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let connections = self.bus.connection_count(&summary.key).await;
            overviews.push(RoomOverview {
                summary,
                connections,
            });
        }
        overviews
    }
}
