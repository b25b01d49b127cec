//! UseCase: ルーム参加（join）処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 表示名の決定、ルームディレクトリの確認、プレゼンス登録と通知
//!
//! ### なぜこのテストが必要か
//! - 認証済みの名前が自己申告の名前より優先されることを保証
//! - 無効・未登録のルームにはプレゼンスが作られないことを確認
//! - user_joined は他の参加者へ、user_list は全員へ届くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：匿名接続での join、認証済み接続での join
//! - 異常系：名前なし、無効なルーム、ディレクトリ障害、通知の配信失敗
//! - エッジケース：同じ名前での再 join

use std::sync::Arc;

use crate::domain::{
    BroadcastBus, ConnectionId, DisplayName, ProtocolError, RoomDirectory, RoomKey,
    RoomRepository, ServerEvent,
};

use super::{error::SessionError, sequencer::RoomSequencer, session::Session};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    bus: Arc<dyn BroadcastBus>,
    /// RoomDirectory（ルームの有効性を知る外部サービスの抽象化）
    directory: Arc<dyn RoomDirectory>,
    sequencer: Arc<RoomSequencer>,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        bus: Arc<dyn BroadcastBus>,
        directory: Arc<dyn RoomDirectory>,
        sequencer: Arc<RoomSequencer>,
    ) -> Self {
        Self {
            repository,
            bus,
            directory,
            sequencer,
        }
    }

    /// join を実行
    ///
    /// # Arguments
    ///
    /// * `session` - 参加するセッション
    /// * `declared` - クライアントが申告した表示名
    ///
    /// # Returns
    ///
    /// * `Ok(DisplayName)` - 参加に使われた表示名
    /// * `Err(SessionError)` - 参加失敗（プレゼンスは変更されない）
    ///
    /// プレゼンス登録後の通知が失敗しても参加は成功として扱う
    pub async fn execute(
        &self,
        session: &mut Session,
        declared: Option<String>,
    ) -> Result<DisplayName, SessionError> {
        // 1. 表示名を決定（認証済みの名前が優先）
        let name = resolve_display_name(session.identity(), declared)?;
        let key = session.key().clone();

        // 2. ルームが参加可能か確認
        let status = self.directory.resolve(&key).await?;
        if !status.is_joinable() {
            tracing::warn!("Join rejected: room '{}' is {:?}", key, status);
            return Err(SessionError::RoomNotFound(key));
        }

        // 3. プレゼンス登録と通知（ルーム単位で順序を保つ）
        let _gate = self.sequencer.lock(&key).await;
        let connection_id = session.connection_id();
        let previous = self
            .repository
            .add_presence(&key, connection_id, name.clone())
            .await?;
        session.mark_joined(name.clone());
        tracing::info!("'{}' joined '{}' as '{}'", connection_id, key, name);

        // 参加は確定済みなので、通知の失敗は記録するだけ
        let rejoined = previous.as_ref() == Some(&name);
        if let Err(e) = self.announce(&key, &connection_id, &name, rejoined).await {
            tracing::error!("Join of '{}' to '{}' was not announced: {}", name, key, e);
        }

        Ok(name)
    }

    /// A repeated join under the same name only refreshes `user_list`.
    async fn announce(
        &self,
        key: &RoomKey,
        connection_id: &ConnectionId,
        name: &DisplayName,
        rejoined: bool,
    ) -> Result<(), SessionError> {
        if !rejoined {
            self.bus
                .publish(
                    key,
                    &ServerEvent::UserJoined {
                        username: name.clone(),
                    },
                    Some(connection_id),
                )
                .await?;
        }
        let users = self.repository.snapshot_presence(key).await?;
        self.bus
            .publish(key, &ServerEvent::UserList { users }, None)
            .await?;
        Ok(())
    }
}

fn resolve_display_name(
    identity: Option<&DisplayName>,
    declared: Option<String>,
) -> Result<DisplayName, ProtocolError> {
    if let Some(identity) = identity {
        return Ok(identity.clone());
    }
    let declared = declared.ok_or(ProtocolError::MissingUsername)?;
    DisplayName::new(declared).map_err(ProtocolError::InvalidUsername)
}
