//! Conversion logic between domain types and DTOs.

use serde_json::Value;

use crate::domain::{ChatMessage, DisplayName, DrawObject, Payload, ServerEvent};
use crate::infrastructure::dto::websocket::{DrawObjectDto, OutboundMessage};

// ========================================
// Domain → DTO
// ========================================

impl From<&DrawObject> for DrawObjectDto {
    fn from(object: &DrawObject) -> Self {
        Self {
            id: object.id,
            kind: object.kind.clone(),
            user: object.author.as_str().to_string(),
            timestamp: object.created_at.value(),
            geometry: object.geometry.clone(),
        }
    }
}

/// Client fields first, then the server-owned `id`, `timestamp` and `user`,
/// which overwrite any client value of the same name.
pub fn chat_message_fields(message: &ChatMessage) -> Payload {
    let mut fields = message.payload.clone();
    fields.insert("id".to_string(), Value::from(message.id));
    fields.insert("timestamp".to_string(), Value::from(message.sent_at.value()));
    fields.insert(
        "user".to_string(),
        Value::String(message.author.as_str().to_string()),
    );
    fields
}

fn names(users: &[DisplayName]) -> Vec<String> {
    users.iter().map(|u| u.as_str().to_string()).collect()
}

impl From<&ServerEvent> for OutboundMessage {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::StateSync { objects, timestamp } => OutboundMessage::StateSync {
                objects: objects.iter().map(DrawObjectDto::from).collect(),
                timestamp: timestamp.value(),
            },
            ServerEvent::UserJoined { username } => OutboundMessage::UserJoined {
                username: username.as_str().to_string(),
            },
            ServerEvent::UserLeft { username } => OutboundMessage::UserLeft {
                username: username.as_str().to_string(),
            },
            ServerEvent::UserList { users } => OutboundMessage::UserList {
                users: names(users),
            },
            ServerEvent::LiveStroke { stroke } => OutboundMessage::LiveStroke {
                stroke: stroke.clone(),
            },
            ServerEvent::ObjectAdded { object } => OutboundMessage::ObjectAdded {
                object: object.into(),
            },
            ServerEvent::CanvasCleared => OutboundMessage::CanvasCleared {},
            ServerEvent::Chat { message } => OutboundMessage::Chat {
                message: chat_message_fields(message),
            },
            ServerEvent::CodeUpdate { code, file } => OutboundMessage::CodeUpdate {
                code: code.clone(),
                file: file.clone(),
            },
            ServerEvent::FileChange { file, code } => OutboundMessage::FileChange {
                file: file.clone(),
                code: code.clone(),
            },
            ServerEvent::Output { output } => OutboundMessage::Output {
                output: output.clone(),
            },
            ServerEvent::RunComplete => OutboundMessage::RunComplete {},
            ServerEvent::Error { message } => OutboundMessage::Error {
                message: message.clone(),
            },
        }
    }
}

/// Encode a server event as a JSON text frame.
pub fn encode_server_event(event: &ServerEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&OutboundMessage::from(event))
}
