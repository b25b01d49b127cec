//! テスト用の BroadcastBus
//!
//! Delegates to an in-process [`WebSocketBroadcastBus`], but can pause or fail
//! the publish of one event type.

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::{
    domain::{BroadcastBus, BroadcastError, ConnectionId, PusherChannel, RoomKey, ServerEvent},
    infrastructure::broadcast_bus::WebSocketBroadcastBus,
};

pub(super) struct ScriptedBus {
    inner: WebSocketBroadcastBus,
    hold: Option<&'static str>,
    fail: Option<&'static str>,
    /// Notified when a held publish starts waiting.
    pub entered: Notify,
    /// Lets a held publish continue.
    pub release: Notify,
}

impl ScriptedBus {
    fn new(hold: Option<&'static str>, fail: Option<&'static str>) -> Self {
        Self {
            inner: WebSocketBroadcastBus::new(),
            hold,
            fail,
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    /// `event` の配信を `release` まで止める
    pub fn holding(event: &'static str) -> Self {
        Self::new(Some(event), None)
    }

    /// `event` の配信を常に失敗させる
    pub fn failing(event: &'static str) -> Self {
        Self::new(None, Some(event))
    }
}

#[async_trait]
impl BroadcastBus for ScriptedBus {
    async fn register(&self, key: &RoomKey, connection_id: ConnectionId, channel: PusherChannel) {
        self.inner.register(key, connection_id, channel).await;
    }

    async fn deregister(&self, key: &RoomKey, connection_id: &ConnectionId) -> bool {
        self.inner.deregister(key, connection_id).await
    }

    async fn publish(
        &self,
        key: &RoomKey,
        event: &ServerEvent,
        exclude: Option<&ConnectionId>,
    ) -> Result<usize, BroadcastError> {
        if self.hold == Some(event.name()) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        if self.fail == Some(event.name()) {
            return Err(BroadcastError::Broker("connection reset".to_string()));
        }
        self.inner.publish(key, event, exclude).await
    }

    async fn push_to(
        &self,
        key: &RoomKey,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), BroadcastError> {
        self.inner.push_to(key, connection_id, event).await
    }

    async fn connection_count(&self, key: &RoomKey) -> usize {
        self.inner.connection_count(key).await
    }
}
