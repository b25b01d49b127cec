//! Inbound and outbound room events, independent of their wire encoding.

use std::{fmt, str::FromStr};

use super::{
    entity::{ChatMessage, DrawDraft, DrawObject, Payload},
    error::ProtocolError,
    value_object::{DisplayName, Timestamp},
};

/// Discriminator of an inbound record (`type` field on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundEventType {
    Join,
    Chat,
    DrawStroke,
    DrawComplete,
    ClearCanvas,
    CodeUpdate,
    FileChange,
    Output,
    RunComplete,
}

impl InboundEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InboundEventType::Join => "join",
            InboundEventType::Chat => "chat",
            InboundEventType::DrawStroke => "draw_stroke",
            InboundEventType::DrawComplete => "draw_complete",
            InboundEventType::ClearCanvas => "clear_canvas",
            InboundEventType::CodeUpdate => "code_update",
            InboundEventType::FileChange => "file_change",
            InboundEventType::Output => "output",
            InboundEventType::RunComplete => "run_complete",
        }
    }
}

impl fmt::Display for InboundEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InboundEventType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "join" => Ok(InboundEventType::Join),
            "chat" => Ok(InboundEventType::Chat),
            "draw_stroke" => Ok(InboundEventType::DrawStroke),
            "draw_complete" => Ok(InboundEventType::DrawComplete),
            "clear_canvas" => Ok(InboundEventType::ClearCanvas),
            "code_update" => Ok(InboundEventType::CodeUpdate),
            "file_change" => Ok(InboundEventType::FileChange),
            "output" => Ok(InboundEventType::Output),
            "run_complete" => Ok(InboundEventType::RunComplete),
            other => Err(ProtocolError::UnknownType(other.to_string())),
        }
    }
}

/// A validated inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// `username` may be omitted when the connection carries an
    /// authenticated identity.
    Join { username: Option<String> },
    Chat { message: Payload },
    DrawStroke { stroke: Payload },
    DrawComplete { draft: DrawDraft },
    ClearCanvas,
    CodeUpdate { code: String, file: String },
    FileChange { file: String, code: String },
    Output { output: String },
    RunComplete,
}

impl RoomEvent {
    pub fn event_type(&self) -> InboundEventType {
        match self {
            RoomEvent::Join { .. } => InboundEventType::Join,
            RoomEvent::Chat { .. } => InboundEventType::Chat,
            RoomEvent::DrawStroke { .. } => InboundEventType::DrawStroke,
            RoomEvent::DrawComplete { .. } => InboundEventType::DrawComplete,
            RoomEvent::ClearCanvas => InboundEventType::ClearCanvas,
            RoomEvent::CodeUpdate { .. } => InboundEventType::CodeUpdate,
            RoomEvent::FileChange { .. } => InboundEventType::FileChange,
            RoomEvent::Output { .. } => InboundEventType::Output,
            RoomEvent::RunComplete => InboundEventType::RunComplete,
        }
    }
}

/// An event delivered to clients.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    StateSync {
        objects: Vec<DrawObject>,
        timestamp: Timestamp,
    },
    UserJoined {
        username: DisplayName,
    },
    UserLeft {
        username: DisplayName,
    },
    UserList {
        users: Vec<DisplayName>,
    },
    /// `stroke` already carries the author under `user`.
    LiveStroke {
        stroke: Payload,
    },
    ObjectAdded {
        object: DrawObject,
    },
    CanvasCleared,
    Chat {
        message: ChatMessage,
    },
    CodeUpdate {
        code: String,
        file: String,
    },
    FileChange {
        file: String,
        code: String,
    },
    Output {
        output: String,
    },
    RunComplete,
    Error {
        message: String,
    },
}

impl ServerEvent {
    /// Wire name, used for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::StateSync { .. } => "state_sync",
            ServerEvent::UserJoined { .. } => "user_joined",
            ServerEvent::UserLeft { .. } => "user_left",
            ServerEvent::UserList { .. } => "user_list",
            ServerEvent::LiveStroke { .. } => "live_stroke",
            ServerEvent::ObjectAdded { .. } => "object_added",
            ServerEvent::CanvasCleared => "canvas_cleared",
            ServerEvent::Chat { .. } => "chat",
            ServerEvent::CodeUpdate { .. } => "code_update",
            ServerEvent::FileChange { .. } => "file_change",
            ServerEvent::Output { .. } => "output",
            ServerEvent::RunComplete => "run_complete",
            ServerEvent::Error { .. } => "error",
        }
    }
}
