//! Broadcast Bus trait 定義
//!
//! Fan-out of server events to the connections registered under a room.
//! Implementations may keep every connection in this process or route
//! through a shared broker; both honour the same contract:
//!
//! - delivery is best-effort and never blocks on a slow receiver;
//! - a dead receiver is skipped, it does not fail the publish for others;
//! - `register` / `deregister` are safe to call concurrently with `publish`.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{BroadcastError, ConnectionId, RoomKey, ServerEvent};

/// Outbound half of a connection: encoded text frames, drained by the
/// connection's pusher task.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait BroadcastBus: Send + Sync {
    /// Add a connection to the room's group.
    async fn register(&self, key: &RoomKey, connection_id: ConnectionId, channel: PusherChannel);

    /// Remove a connection from the room's group. Returns whether it was
    /// registered.
    async fn deregister(&self, key: &RoomKey, connection_id: &ConnectionId) -> bool;

    /// Deliver `event` to every connection of the room except `exclude`.
    ///
    /// Returns how many local connections it was handed to; a broker-backed
    /// bus may report 0 because delivery happens asynchronously.
    async fn publish(
        &self,
        key: &RoomKey,
        event: &ServerEvent,
        exclude: Option<&ConnectionId>,
    ) -> Result<usize, BroadcastError>;

    /// Deliver `event` to a single connection of this process.
    async fn push_to(
        &self,
        key: &RoomKey,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), BroadcastError>;

    /// Connections registered to the room in this process.
    async fn connection_count(&self, key: &RoomKey) -> usize;
}
