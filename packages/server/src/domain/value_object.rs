//! Value objects.
//!
//! Each constructor validates its input, so a value that exists is valid.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

const ROOM_ID_MAX_LEN: usize = 128;
const DISPLAY_NAME_MAX_LEN: usize = 64;

/// The three kinds of collaboration rooms.
///
/// Each kind is its own namespace: `(Chat, "abc")` and `(Whiteboard, "abc")`
/// are different rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Whiteboard,
    Chat,
    Code,
}

impl RoomKind {
    pub const ALL: [RoomKind; 3] = [RoomKind::Whiteboard, RoomKind::Chat, RoomKind::Code];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomKind::Whiteboard => "whiteboard",
            RoomKind::Chat => "chat",
            RoomKind::Code => "code",
        }
    }
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomKind {
    type Err = ValueObjectError;

    /// Accepts the canonical names plus the `ide` / `code-session` aliases
    /// used by older clients for code rooms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whiteboard" => Ok(RoomKind::Whiteboard),
            "chat" => Ok(RoomKind::Chat),
            "code" | "ide" | "code-session" => Ok(RoomKind::Code),
            other => Err(ValueObjectError::UnknownRoomKind(other.to_string())),
        }
    }
}

/// Room identifier, opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        if value.chars().count() > ROOM_ID_MAX_LEN {
            return Err(ValueObjectError::RoomIdTooLong(ROOM_ID_MAX_LEN));
        }
        if value.chars().any(char::is_control) {
            return Err(ValueObjectError::RoomIdInvalidCharacter);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomId> for String {
    fn from(value: RoomId) -> Self {
        value.0
    }
}

/// Fully qualified room address: kind plus id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomKey {
    pub kind: RoomKind,
    pub id: RoomId,
}

impl RoomKey {
    pub fn new(kind: RoomKind, id: RoomId) -> Self {
        Self { kind, id }
    }

    /// Parse path segments as they appear in `/ws/{kind}/{room_id}`.
    pub fn from_parts(kind: &str, id: &str) -> Result<Self, ValueObjectError> {
        Ok(Self::new(kind.parse()?, RoomId::new(id.to_string())?))
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id.as_str())
    }
}

impl FromStr for RoomKey {
    type Err = ValueObjectError;

    /// Parse `kind:id`. The id may itself contain `:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| ValueObjectError::RoomKeyFormat(s.to_string()))?;
        Self::from_parts(kind, id)
    }
}

/// Identifier of one live connection, from accept to close.
///
/// UUID v4, so it stays unique across server instances sharing a broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Name shown to other room members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Surrounding whitespace is trimmed before validation.
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::DisplayNameEmpty);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX_LEN {
            return Err(ValueObjectError::DisplayNameTooLong(DISPLAY_NAME_MAX_LEN));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValueObjectError::DisplayNameInvalidCharacter);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
