//! Domain error types.

use thiserror::Error;

use super::value_object::{RoomKey, RoomKind};

/// Validation failures when constructing value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("unknown room kind '{0}'")]
    UnknownRoomKind(String),

    #[error("room id must not be empty")]
    RoomIdEmpty,

    #[error("room id must be at most {0} characters")]
    RoomIdTooLong(usize),

    #[error("room id must not contain control characters")]
    RoomIdInvalidCharacter,

    #[error("expected 'kind:id', got '{0}'")]
    RoomKeyFormat(String),

    #[error("username must not be empty")]
    DisplayNameEmpty,

    #[error("username must be at most {0} characters")]
    DisplayNameTooLong(usize),

    #[error("username must not contain control characters")]
    DisplayNameInvalidCharacter,
}

/// Invariant violations inside a single room.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("{0} rooms do not retain drawing objects")]
    ObjectsNotRetained(RoomKind),
}

/// Room registry failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("room '{0}' has not been created")]
    RoomNotFound(RoomKey),

    #[error(transparent)]
    Room(#[from] RoomError),
}

/// Broadcast bus failures.
///
/// A single dead receiver during a fan-out is not an error; it is logged and
/// skipped.
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),

    #[error("failed to push to connection '{connection}': {reason}")]
    PushFailed { connection: String, reason: String },

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("broker error: {0}")]
    Broker(String),

    /// The broker stopped delivering messages to this instance.
    #[error("broker subscription closed")]
    SubscriptionClosed,
}

/// Room directory (collaborator) failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("room directory unavailable: {0}")]
    Unavailable(String),
}

/// A malformed or unacceptable inbound record.
///
/// Answered with an `error` event; never closes the connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    #[error("event must be a JSON object")]
    NotAnObject,

    #[error("missing 'type' field")]
    MissingType,

    #[error("'type' must be a string")]
    InvalidType,

    #[error("unknown event type '{0}'")]
    UnknownType(String),

    #[error("invalid '{event}' event: {reason}")]
    InvalidPayload { event: &'static str, reason: String },

    #[error("'{event}' is not supported in {kind} rooms")]
    Unsupported { event: &'static str, kind: RoomKind },

    #[error("'{event}' requires joining the room first")]
    NotJoined { event: &'static str },

    #[error("a username is required to join")]
    MissingUsername,

    #[error("invalid username: {0}")]
    InvalidUsername(ValueObjectError),

    #[error("binary frames are not supported")]
    BinaryFrame,
}
