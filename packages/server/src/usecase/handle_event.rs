//! UseCase: 受信イベントの処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - HandleEventUseCase::execute() メソッド
//! - ルーム種別ごとの語彙による振り分け、join 前のイベント拒否、送信者除外
//!
//! ### なぜこのテストが必要か
//! - 描画オブジェクトの追加・全消去がルーム状態に正しく反映されることを保証
//! - 自分の送ったイベントが自分に戻らないこと（エコーポリシーの既定値）を確認
//! - 不正なイベントがルーム状態を変更しないことを確認
//! - 追加と全消去が競合しても、配信順がルーム状態の変更順と一致することを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ホワイトボード・チャット・コードそれぞれのイベント
//! - 異常系：join 前のイベント、ルーム種別が受け付けないイベント、配信の失敗
//! - エッジケース：全消去の直後の追加、IncludeSender ポリシー、配信中の全消去

use std::sync::Arc;

use tokio::sync::OwnedMutexGuard;
use tsudoi_shared::time::Clock;

use crate::domain::{
    BroadcastBus, ChatMessage, ConnectionId, EchoPolicy, EventAction, ProtocolError, RoomEvent,
    RoomRepository, ServerEvent, Timestamp,
};

use super::{
    error::SessionError, join_room::JoinRoomUseCase, sequencer::RoomSequencer, session::Session,
};

/// 受信イベント処理のユースケース
///
/// One type for every room kind; the kind's vocabulary decides which events
/// are accepted.
pub struct HandleEventUseCase {
    repository: Arc<dyn RoomRepository>,
    bus: Arc<dyn BroadcastBus>,
    clock: Arc<dyn Clock>,
    join: Arc<JoinRoomUseCase>,
    sequencer: Arc<RoomSequencer>,
    echo_policy: EchoPolicy,
}

impl HandleEventUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        bus: Arc<dyn BroadcastBus>,
        clock: Arc<dyn Clock>,
        join: Arc<JoinRoomUseCase>,
        sequencer: Arc<RoomSequencer>,
        echo_policy: EchoPolicy,
    ) -> Self {
        Self {
            repository,
            bus,
            clock,
            join,
            sequencer,
            echo_policy,
        }
    }

    /// 受信イベントを 1 件処理する
    ///
    /// Every check runs before the room is touched, so a rejected event
    /// leaves no trace. Once an event has changed the room's objects, a
    /// failed broadcast is logged and the call still succeeds.
    pub async fn execute(
        &self,
        session: &mut Session,
        event: RoomEvent,
    ) -> Result<(), SessionError> {
        let event_type = event.event_type();
        let key = session.key().clone();

        // 1. ルーム種別の語彙で振り分け
        let action = key
            .kind
            .action_for(event_type)
            .ok_or(ProtocolError::Unsupported {
                event: event_type.as_str(),
                kind: key.kind,
            })?;

        if action == EventAction::Join {
            let username = match event {
                RoomEvent::Join { username } => username,
                other => return Err(mismatch(action, &other)),
            };
            self.join.execute(session, username).await?;
            return Ok(());
        }

        // 2. join 済みであることを確認
        let author = session
            .display_name()
            .cloned()
            .ok_or(ProtocolError::NotJoined {
                event: event_type.as_str(),
            })?;
        let sender = session.connection_id();
        let now = Timestamp::new(self.clock.now_millis());

        // 3. ルーム状態を更新し、配信するイベントを組み立てる
        // オブジェクト列を変更するイベントは配信が終わるまでゲートを保持する
        let mut gate: Option<OwnedMutexGuard<()>> = None;
        let (outbound, exclude) = match (action, event) {
            (EventAction::Stroke, RoomEvent::DrawStroke { mut stroke }) => {
                stroke.insert(
                    "user".to_string(),
                    serde_json::Value::String(author.as_str().to_string()),
                );
                (ServerEvent::LiveStroke { stroke }, self.drawing_exclusion(&sender))
            }
            (EventAction::AppendObject, RoomEvent::DrawComplete { draft }) => {
                gate = Some(self.sequencer.lock(&key).await);
                let object = self
                    .repository
                    .append_object(&key, draft, author, now)
                    .await?;
                tracing::debug!("Object {} added to '{}'", object.id, key);
                (ServerEvent::ObjectAdded { object }, self.drawing_exclusion(&sender))
            }
            (EventAction::ClearObjects, RoomEvent::ClearCanvas) => {
                gate = Some(self.sequencer.lock(&key).await);
                let cleared = self.repository.clear_objects(&key).await?;
                tracing::info!("'{}' cleared {} object(s) in '{}'", author, cleared, key);
                (ServerEvent::CanvasCleared, Some(sender))
            }
            (EventAction::Chat, RoomEvent::Chat { message }) => {
                let id = self.repository.next_sequence(&key).await?;
                let message = ChatMessage {
                    id,
                    author,
                    payload: message,
                    sent_at: now,
                };
                (ServerEvent::Chat { message }, Some(sender))
            }
            (EventAction::Relay, event) => (relayed(event)?, Some(sender)),
            (action, event) => return Err(mismatch(action, &event)),
        };

        // 4. ルームへ配信
        match self.bus.publish(&key, &outbound, exclude.as_ref()).await {
            Ok(delivered) => tracing::debug!(
                "'{}' from '{}' relayed to {} receiver(s) in '{}'",
                outbound.name(),
                sender,
                delivered,
                key
            ),
            Err(e) if gate.is_some() => tracing::error!(
                "'{}' was applied to '{}' but not broadcast: {}",
                outbound.name(),
                key,
                e
            ),
            Err(e) => return Err(e.into()),
        }
        drop(gate);
        Ok(())
    }

    fn drawing_exclusion(&self, sender: &ConnectionId) -> Option<ConnectionId> {
        if self.echo_policy.echoes() {
            None
        } else {
            Some(*sender)
        }
    }
}

fn relayed(event: RoomEvent) -> Result<ServerEvent, SessionError> {
    match event {
        RoomEvent::CodeUpdate { code, file } => Ok(ServerEvent::CodeUpdate { code, file }),
        RoomEvent::FileChange { file, code } => Ok(ServerEvent::FileChange { file, code }),
        RoomEvent::Output { output } => Ok(ServerEvent::Output { output }),
        RoomEvent::RunComplete => Ok(ServerEvent::RunComplete),
        other => Err(mismatch(EventAction::Relay, &other)),
    }
}

// The vocabulary tables and the decoder disagree; a bug, not bad input.
fn mismatch(action: EventAction, event: &RoomEvent) -> SessionError {
    SessionError::Internal(format!(
        "action {:?} cannot handle '{}'",
        action,
        event.event_type()
    ))
}
