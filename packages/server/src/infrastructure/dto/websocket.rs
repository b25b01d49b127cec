//! WebSocket message DTOs.
//!
//! Every frame is one JSON object with a `type` discriminator. Inbound
//! frames are decoded in two steps: the `type` is read first so errors can
//! name the event, then the remaining fields are checked against that
//! event's shape.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::domain::{DrawDraft, InboundEventType, Payload, ProtocolError, RoomEvent};

/// Object kind used when `draw_complete` does not name one.
pub const DEFAULT_OBJECT_KIND: &str = "path";

/// Keys the server owns on outbound objects; stripped from client geometry.
const RESERVED_OBJECT_KEYS: [&str; 6] = ["type", "kind", "shape", "id", "user", "timestamp"];

#[derive(Debug, Deserialize)]
struct JoinPayload {
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatPayload {
    message: Value,
}

#[derive(Debug, Deserialize)]
struct CodeUpdatePayload {
    code: String,
    file: String,
}

#[derive(Debug, Deserialize)]
struct FileChangePayload {
    file: String,
    code: String,
}

#[derive(Debug, Deserialize)]
struct OutputPayload {
    output: String,
}

/// Decode one inbound text frame.
pub fn decode_client_event(text: &str) -> Result<RoomEvent, ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(ProtocolError::NotAnObject);
    };

    let event_type: InboundEventType = match fields.remove("type") {
        Some(Value::String(name)) => name.parse()?,
        Some(_) => return Err(ProtocolError::InvalidType),
        None => return Err(ProtocolError::MissingType),
    };

    let event = match event_type {
        InboundEventType::Join => {
            let payload: JoinPayload = from_fields(event_type, fields)?;
            RoomEvent::Join {
                username: payload.username,
            }
        }
        InboundEventType::Chat => {
            let payload: ChatPayload = from_fields(event_type, fields)?;
            RoomEvent::Chat {
                message: chat_message_payload(payload.message)?,
            }
        }
        InboundEventType::DrawStroke => {
            require_points(event_type, &fields)?;
            fields.remove("user");
            RoomEvent::DrawStroke { stroke: fields }
        }
        InboundEventType::DrawComplete => RoomEvent::DrawComplete {
            draft: draw_draft(fields)?,
        },
        InboundEventType::ClearCanvas => RoomEvent::ClearCanvas,
        InboundEventType::CodeUpdate => {
            let payload: CodeUpdatePayload = from_fields(event_type, fields)?;
            RoomEvent::CodeUpdate {
                code: payload.code,
                file: payload.file,
            }
        }
        InboundEventType::FileChange => {
            let payload: FileChangePayload = from_fields(event_type, fields)?;
            RoomEvent::FileChange {
                file: payload.file,
                code: payload.code,
            }
        }
        InboundEventType::Output => {
            let payload: OutputPayload = from_fields(event_type, fields)?;
            RoomEvent::Output {
                output: payload.output,
            }
        }
        InboundEventType::RunComplete => RoomEvent::RunComplete,
    };

    Ok(event)
}

fn from_fields<T: DeserializeOwned>(
    event_type: InboundEventType,
    fields: Payload,
) -> Result<T, ProtocolError> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| ProtocolError::InvalidPayload {
        event: event_type.as_str(),
        reason: e.to_string(),
    })
}

fn require_points(event_type: InboundEventType, fields: &Payload) -> Result<(), ProtocolError> {
    match fields.get("points") {
        Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(ProtocolError::InvalidPayload {
            event: event_type.as_str(),
            reason: "'points' must be an array".to_string(),
        }),
        None => Err(ProtocolError::InvalidPayload {
            event: event_type.as_str(),
            reason: "missing field `points`".to_string(),
        }),
    }
}

/// A chat message is either plain text or an object of client fields.
fn chat_message_payload(message: Value) -> Result<Payload, ProtocolError> {
    match message {
        Value::Object(fields) => Ok(fields),
        Value::String(text) => {
            let mut fields = Payload::new();
            fields.insert("text".to_string(), Value::String(text));
            Ok(fields)
        }
        _ => Err(ProtocolError::InvalidPayload {
            event: InboundEventType::Chat.as_str(),
            reason: "'message' must be a string or an object".to_string(),
        }),
    }
}

fn draw_draft(mut fields: Payload) -> Result<DrawDraft, ProtocolError> {
    let event = InboundEventType::DrawComplete;
    require_points(event, &fields)?;

    let kind = match fields.get("kind").or_else(|| fields.get("shape")) {
        None => DEFAULT_OBJECT_KIND.to_string(),
        Some(Value::String(kind)) if !kind.trim().is_empty() => kind.trim().to_string(),
        Some(_) => {
            return Err(ProtocolError::InvalidPayload {
                event: event.as_str(),
                reason: "'kind' must be a non-empty string".to_string(),
            });
        }
    };

    for reserved in RESERVED_OBJECT_KEYS {
        fields.remove(reserved);
    }

    Ok(DrawDraft {
        kind,
        geometry: fields,
    })
}

/// A drawing object as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawObjectDto {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub user: String,
    pub timestamp: i64,
    #[serde(flatten)]
    pub geometry: Payload,
}

/// Every event the server sends, in wire form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    StateSync {
        objects: Vec<DrawObjectDto>,
        timestamp: i64,
    },
    UserJoined {
        username: String,
    },
    UserLeft {
        username: String,
    },
    UserList {
        users: Vec<String>,
    },
    LiveStroke {
        stroke: Payload,
    },
    ObjectAdded {
        object: DrawObjectDto,
    },
    CanvasCleared {},
    Chat {
        message: Payload,
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
    RunComplete {},
    Error {
        message: String,
    },
}
