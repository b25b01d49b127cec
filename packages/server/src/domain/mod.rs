//! Domain layer: rooms, presence, drawing objects and the interfaces the
//! engine needs from the outside world.
//!
//! Nothing here knows about WebSocket, JSON wire shapes or Redis; those live
//! in the infrastructure layer and implement the traits declared here.

pub mod broadcast_bus;
pub mod directory;
pub mod entity;
pub mod error;
pub mod event;
pub mod repository;
pub mod value_object;
pub mod vocabulary;

pub use broadcast_bus::{BroadcastBus, PusherChannel};
pub use directory::{RoomDirectory, RoomStatus};
pub use entity::{ChatMessage, DrawDraft, DrawObject, Payload, Room, RoomSummary};
pub use error::{
    BroadcastError, DirectoryError, ProtocolError, RepositoryError, RoomError, ValueObjectError,
};
pub use event::{InboundEventType, RoomEvent, ServerEvent};
pub use repository::RoomRepository;
pub use value_object::{ConnectionId, DisplayName, RoomId, RoomKey, RoomKind, Timestamp};
pub use vocabulary::{EchoPolicy, EventAction};
