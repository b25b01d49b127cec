//! In-process broadcast bus.
//!
//! ## 責務
//!
//! - keep each room's group of connection channels
//! - encode an event once and hand the text to every member but the excluded
//!   one
//!
//! The WebSocket itself is owned by the UI layer; this bus only holds the
//! `UnboundedSender` side created there, so a send never waits on a slow
//! socket.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    domain::{BroadcastBus, BroadcastError, ConnectionId, PusherChannel, RoomKey, ServerEvent},
    infrastructure::dto::conversion::encode_server_event,
};

type Group = HashMap<ConnectionId, PusherChannel>;

/// Room groups of locally connected clients.
#[derive(Default)]
pub struct WebSocketBroadcastBus {
    groups: RwLock<HashMap<RoomKey, Group>>,
}

impl WebSocketBroadcastBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fan out an already encoded frame. Returns how many receivers took it.
    ///
    /// Receivers whose channel is closed are skipped with a warning; they are
    /// removed when their connection deregisters.
    pub async fn publish_encoded(
        &self,
        key: &RoomKey,
        content: &str,
        exclude: Option<&ConnectionId>,
    ) -> usize {
        let groups = self.groups.read().await;
        let Some(group) = groups.get(key) else {
            return 0;
        };

        let mut delivered = 0;
        for (connection_id, sender) in group {
            if exclude == Some(connection_id) {
                continue;
            }
            match sender.send(content.to_string()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        "Failed to push message to connection '{}' in '{}': {}",
                        connection_id,
                        key,
                        e
                    );
                }
            }
        }
        tracing::debug!("Broadcasted to {} connection(s) in '{}'", delivered, key);
        delivered
    }
}

#[async_trait]
impl BroadcastBus for WebSocketBroadcastBus {
    async fn register(&self, key: &RoomKey, connection_id: ConnectionId, channel: PusherChannel) {
        let mut groups = self.groups.write().await;
        groups
            .entry(key.clone())
            .or_default()
            .insert(connection_id, channel);
        tracing::debug!("Connection '{}' registered to '{}'", connection_id, key);
    }

    async fn deregister(&self, key: &RoomKey, connection_id: &ConnectionId) -> bool {
        let mut groups = self.groups.write().await;
        let Some(group) = groups.get_mut(key) else {
            return false;
        };
        let removed = group.remove(connection_id).is_some();
        if group.is_empty() {
            groups.remove(key);
        }
        if removed {
            tracing::debug!("Connection '{}' deregistered from '{}'", connection_id, key);
        }
        removed
    }

    async fn publish(
        &self,
        key: &RoomKey,
        event: &ServerEvent,
        exclude: Option<&ConnectionId>,
    ) -> Result<usize, BroadcastError> {
        let content = encode_server_event(event)?;
        Ok(self.publish_encoded(key, &content, exclude).await)
    }

    async fn push_to(
        &self,
        key: &RoomKey,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), BroadcastError> {
        let content = encode_server_event(event)?;
        let groups = self.groups.read().await;
        let sender = groups
            .get(key)
            .and_then(|group| group.get(connection_id))
            .ok_or_else(|| BroadcastError::ConnectionNotFound(connection_id.to_string()))?;

        sender
            .send(content)
            .map_err(|e| BroadcastError::PushFailed {
                connection: connection_id.to_string(),
                reason: e.to_string(),
            })?;
        tracing::debug!("Pushed '{}' to connection '{}'", event.name(), connection_id);
        Ok(())
    }

    async fn connection_count(&self, key: &RoomKey) -> usize {
        self.groups
            .read()
            .await
            .get(key)
            .map(|group| group.len())
            .unwrap_or(0)
    }
}
