//! Broadcast bus implementations.
//!
//! - `websocket`: in-process fan-out to the connections of this server
//! - `redis`: Redis pub/sub, for several server instances behind one broker

pub mod redis;
pub mod websocket;

pub use self::redis::RedisBroadcastBus;
pub use websocket::WebSocketBroadcastBus;
