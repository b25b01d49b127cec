//! Redis pub/sub broadcast bus.
//!
//! Every instance keeps its own local connection groups and subscribes to
//! `tsudoi:room:*`. A publish goes to Redis only; the subscriber task of each
//! instance (the publishing one included) fans the frame out to its local
//! members. The excluded connection id travels in the envelope so the
//! publisher's own socket is skipped wherever it lives.
//!
//! Room state (presence, whiteboard objects) is not shared through Redis.
//!
//! Losing the subscription means no broadcast reaches this instance's
//! connections any more, so the relay task ends with an error the caller
//! must treat as fatal.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use super::websocket::WebSocketBroadcastBus;
use crate::{
    domain::{
        BroadcastBus, BroadcastError, ConnectionId, PusherChannel, RoomId, RoomKey, RoomKind,
        ServerEvent,
    },
    infrastructure::dto::conversion::encode_server_event,
};

const CHANNEL_PREFIX: &str = "tsudoi:room";

/// Wire format of one relayed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Envelope {
    kind: RoomKind,
    room_id: RoomId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exclude: Option<ConnectionId>,
    /// Already encoded outbound JSON.
    payload: String,
}

impl Envelope {
    fn room_key(&self) -> RoomKey {
        RoomKey::new(self.kind, self.room_id.clone())
    }
}

fn channel_name(key: &RoomKey) -> String {
    format!("{}:{}:{}", CHANNEL_PREFIX, key.kind, key.id.as_str())
}

fn channel_pattern() -> String {
    format!("{}:*", CHANNEL_PREFIX)
}

fn broker_error(e: redis::RedisError) -> BroadcastError {
    BroadcastError::Broker(e.to_string())
}

pub struct RedisBroadcastBus {
    connection: MultiplexedConnection,
    local: Arc<WebSocketBroadcastBus>,
}

impl RedisBroadcastBus {
    /// Connect to `redis_url`, subscribe, and spawn the relay task.
    ///
    /// The returned handle finishes only when the subscription stream ends,
    /// and yields [`BroadcastError::SubscriptionClosed`].
    pub async fn connect(
        redis_url: &str,
    ) -> Result<(Self, JoinHandle<BroadcastError>), BroadcastError> {
        let client = Client::open(redis_url).map_err(broker_error)?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(broker_error)?;

        let mut pubsub = client.get_async_pubsub().await.map_err(broker_error)?;
        pubsub
            .psubscribe(channel_pattern())
            .await
            .map_err(broker_error)?;
        tracing::info!("Subscribed to '{}' on {}", channel_pattern(), redis_url);

        let local = Arc::new(WebSocketBroadcastBus::new());
        let relay_target = local.clone();
        let handle = tokio::spawn(async move {
            let payloads =
                std::pin::pin!(pubsub.on_message().map(|msg| msg.get_payload::<String>()));
            relay_messages(payloads, &relay_target).await
        });

        Ok((Self { connection, local }, handle))
    }
}

async fn relay_messages<S>(mut payloads: S, local: &WebSocketBroadcastBus) -> BroadcastError
where
    S: Stream<Item = redis::RedisResult<String>> + Unpin,
{
    while let Some(payload) = payloads.next().await {
        match payload {
            Ok(raw) => relay(local, &raw).await,
            Err(e) => tracing::warn!("Dropping unreadable pub/sub payload: {}", e),
        }
    }
    tracing::error!("Redis subscription stream ended");
    BroadcastError::SubscriptionClosed
}

async fn relay(local: &WebSocketBroadcastBus, raw: &str) {
    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Dropping malformed envelope: {}", e);
            return;
        }
    };
    local
        .publish_encoded(
            &envelope.room_key(),
            &envelope.payload,
            envelope.exclude.as_ref(),
        )
        .await;
}

#[async_trait]
impl BroadcastBus for RedisBroadcastBus {
    async fn register(&self, key: &RoomKey, connection_id: ConnectionId, channel: PusherChannel) {
        self.local.register(key, connection_id, channel).await;
    }

    async fn deregister(&self, key: &RoomKey, connection_id: &ConnectionId) -> bool {
        self.local.deregister(key, connection_id).await
    }

    /// Returns the number of instances that received the envelope.
    async fn publish(
        &self,
        key: &RoomKey,
        event: &ServerEvent,
        exclude: Option<&ConnectionId>,
    ) -> Result<usize, BroadcastError> {
        let envelope = Envelope {
            kind: key.kind,
            room_id: key.id.clone(),
            exclude: exclude.copied(),
            payload: encode_server_event(event)?,
        };
        let body = serde_json::to_string(&envelope)?;

        let mut connection = self.connection.clone();
        let receivers: i64 = connection
            .publish(channel_name(key), body)
            .await
            .map_err(broker_error)?;
        Ok(usize::try_from(receivers).unwrap_or(0))
    }

    // Direct replies never leave this instance.
    async fn push_to(
        &self,
        key: &RoomKey,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), BroadcastError> {
        self.local.push_to(key, connection_id, event).await
    }

    async fn connection_count(&self, key: &RoomKey) -> usize {
        self.local.connection_count(key).await
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    // Redis そのものを必要としない部分（チャンネル名・エンベロープ・中継）のみを検証する

    fn key(kind: RoomKind, id: &str) -> RoomKey {
        RoomKey::new(kind, RoomId::new(id.to_string()).unwrap())
    }

    #[test]
    fn test_channel_name_includes_kind_and_room() {
        // テスト項目: 種別ごとに別チャンネルになり、購読パターンに一致する
        // given (前提条件):
        let board = key(RoomKind::Whiteboard, "abc");
        let chat = key(RoomKind::Chat, "abc");

        // when (操作):
        let board_channel = channel_name(&board);
        let chat_channel = channel_name(&chat);

        // then (期待する結果):
        assert_eq!(board_channel, "tsudoi:room:whiteboard:abc");
        assert_eq!(chat_channel, "tsudoi:room:chat:abc");
        assert_eq!(channel_pattern(), "tsudoi:room:*");
    }

    #[test]
    fn test_envelope_omits_missing_exclusion() {
        // テスト項目: 除外指定がないエンベロープには exclude フィールドが出ない
        // given (前提条件):
        let envelope = Envelope {
            kind: RoomKind::Code,
            room_id: RoomId::new("r1".to_string()).unwrap(),
            exclude: None,
            payload: r#"{"type":"run_complete"}"#.to_string(),
        };

        // when (操作):
        let value: serde_json::Value =
            serde_json::to_value(&envelope).expect("envelope should encode");

        // then (期待する結果):
        assert_eq!(
            value,
            serde_json::json!({
                "kind": "code",
                "room_id": "r1",
                "payload": "{\"type\":\"run_complete\"}"
            })
        );
    }

    #[tokio::test]
    async fn test_relay_skips_excluded_connection() {
        // テスト項目: 受信したエンベロープが除外対象以外のローカル接続に配信される
        // given (前提条件):
        let local = WebSocketBroadcastBus::new();
        let room = key(RoomKind::Whiteboard, "abc");
        let (sender, other) = (ConnectionId::generate(), ConnectionId::generate());
        let (tx_s, mut rx_s) = mpsc::unbounded_channel();
        let (tx_o, mut rx_o) = mpsc::unbounded_channel();
        local.register(&room, sender, tx_s).await;
        local.register(&room, other, tx_o).await;
        let raw = serde_json::to_string(&Envelope {
            kind: RoomKind::Whiteboard,
            room_id: RoomId::new("abc".to_string()).unwrap(),
            exclude: Some(sender),
            payload: r#"{"type":"canvas_cleared"}"#.to_string(),
        })
        .unwrap();

        // when (操作):
        relay(&local, &raw).await;

        // then (期待する結果):
        assert_eq!(rx_o.recv().await.unwrap(), r#"{"type":"canvas_cleared"}"#);
        assert!(rx_s.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_relay_ignores_malformed_envelope() {
        // テスト項目: 壊れたエンベロープは捨てられ、誰にも配信されない
        // given (前提条件):
        let local = WebSocketBroadcastBus::new();
        let room = key(RoomKind::Chat, "abc");
        let (tx, mut rx) = mpsc::unbounded_channel();
        local.register(&room, ConnectionId::generate(), tx).await;

        // when (操作):
        relay(&local, "not json").await;

        // then (期待する結果):
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_relay_ends_with_error_when_subscription_closes() {
        // テスト項目: 購読ストリームが終わるまで受信分を配信し、終わったら SubscriptionClosed を返す
        // given (前提条件):
        let local = WebSocketBroadcastBus::new();
        let room = key(RoomKind::Chat, "abc");
        let (tx, mut rx) = mpsc::unbounded_channel();
        local.register(&room, ConnectionId::generate(), tx).await;
        let raw = serde_json::to_string(&Envelope {
            kind: RoomKind::Chat,
            room_id: RoomId::new("abc".to_string()).unwrap(),
            exclude: None,
            payload: r#"{"type":"run_complete"}"#.to_string(),
        })
        .unwrap();
        let payloads = futures_util::stream::iter(vec![
            Err(redis::RedisError::from((
                redis::ErrorKind::TypeError,
                "unreadable payload",
            ))),
            Ok(raw),
        ]);

        // when (操作):
        let ended = relay_messages(payloads, &local).await;

        // then (期待する結果):
        assert!(matches!(ended, BroadcastError::SubscriptionClosed));
        assert_eq!(rx.recv().await.unwrap(), r#"{"type":"run_complete"}"#);
    }
}
