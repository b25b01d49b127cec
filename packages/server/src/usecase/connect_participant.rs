//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - ルームの確保、ブロードキャストバスへの登録、state_sync の送信
//!
//! ### なぜこのテストが必要か
//! - 途中参加したクライアントが既存の描画オブジェクトを受け取れることを保証
//! - 接続しただけではプレゼンスに載らないことを確認（join で初めて載る）
//!
//! ### どのような状況を想定しているか
//! - 正常系：ホワイトボードへの接続（state_sync あり）
//! - 正常系：チャット・コードへの接続（state_sync なし）
//! - エッジケース：既にオブジェクトがあるルームへの途中参加

use std::sync::Arc;

use tsudoi_shared::time::Clock;

use crate::domain::{
    BroadcastBus, ConnectionId, PusherChannel, RoomKey, RoomRepository, ServerEvent, Timestamp,
};

use super::error::SessionError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// BroadcastBus（ルーム単位の配信の抽象化）
    bus: Arc<dyn BroadcastBus>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        bus: Arc<dyn BroadcastBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            bus,
            clock,
        }
    }

    /// 接続を受け付ける
    ///
    /// The connection is registered before the snapshot is taken, so an
    /// object appended in between is never lost, but it reaches the client
    /// twice: once as `object_added` (possibly ahead of `state_sync`) and
    /// again inside the `state_sync` snapshot. Clients deduplicate objects by
    /// `id`.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 送信した state_sync のオブジェクト数（state_sync なしなら 0）
    pub async fn execute(
        &self,
        key: &RoomKey,
        connection_id: ConnectionId,
        channel: PusherChannel,
    ) -> Result<usize, SessionError> {
        let now = Timestamp::new(self.clock.now_millis());

        // 1. ルームを確保（初回接続時に作成）
        self.repository.ensure_room(key, now).await;

        // 2. BroadcastBus に接続を登録
        self.bus.register(key, connection_id, channel).await;

        // 3. ホワイトボードなら現在のオブジェクトを送る
        if !key.kind.hydrates_on_connect() {
            return Ok(0);
        }
        let objects = self.repository.snapshot_objects(key).await?;
        let count = objects.len();
        self.bus
            .push_to(
                key,
                &connection_id,
                &ServerEvent::StateSync {
                    objects,
                    timestamp: now,
                },
            )
            .await?;
        tracing::debug!(
            "Sent state_sync with {} object(s) to '{}' in '{}'",
            count,
            connection_id,
            key
        );
        Ok(count)
    }
}
