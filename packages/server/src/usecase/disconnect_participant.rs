//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 参加者の切断処理（登録解除、プレゼンス削除、残りの参加者への通知）
//!
//! ### なぜこのテストが必要か
//! - 切断時に残りの参加者へ user_left と user_list が届くことを保証
//! - 切断処理が二度走っても通知が二重にならないことを確認
//! - join していない接続の切断では何も通知しないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：join 済み参加者の切断と通知
//! - エッジケース：最後の参加者の切断（通知対象なし）、二重の切断
//! - エッジケース：join 前の切断
//! - 異常系：通知の配信失敗

use std::sync::Arc;

use crate::domain::{BroadcastBus, ConnectionId, DisplayName, RoomKey, RoomRepository, ServerEvent};

use super::{error::SessionError, sequencer::RoomSequencer};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// BroadcastBus（ルーム単位の配信の抽象化）
    bus: Arc<dyn BroadcastBus>,
    sequencer: Arc<RoomSequencer>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        bus: Arc<dyn BroadcastBus>,
        sequencer: Arc<RoomSequencer>,
    ) -> Self {
        Self {
            repository,
            bus,
            sequencer,
        }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Some(DisplayName))` - join 済みだった参加者の表示名（通知済み）
    /// * `Ok(None)` - join していなかった、または既に切断処理済み（通知なし）
    pub async fn execute(
        &self,
        key: &RoomKey,
        connection_id: &ConnectionId,
    ) -> Result<Option<DisplayName>, SessionError> {
        // 1. BroadcastBus から登録解除（以降この接続には何も届かない）
        self.bus.deregister(key, connection_id).await;

        // 2. プレゼンスを削除
        let _gate = self.sequencer.lock(key).await;
        let Some(username) = self.repository.remove_presence(key, connection_id).await? else {
            tracing::debug!("'{}' left '{}' without joining", connection_id, key);
            return Ok(None);
        };
        tracing::info!("'{}' ({}) left '{}'", username, connection_id, key);

        // 3. 残りの参加者に通知（プレゼンスは削除済みなので、失敗は記録するだけ）
        if let Err(e) = self.announce(key, &username).await {
            tracing::error!("Leave of '{}' from '{}' was not announced: {}", username, key, e);
        }

        Ok(Some(username))
    }

    async fn announce(&self, key: &RoomKey, username: &DisplayName) -> Result<(), SessionError> {
        self.bus
            .publish(
                key,
                &ServerEvent::UserLeft {
                    username: username.clone(),
                },
                None,
            )
            .await?;
        let users = self.repository.snapshot_presence(key).await?;
        self.bus
            .publish(key, &ServerEvent::UserList { users }, None)
            .await?;
        Ok(())
    }
}
