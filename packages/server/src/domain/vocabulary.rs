//! Per-kind event vocabulary.
//!
//! The session handler is generic; a room kind only decides which inbound
//! events it accepts and what each one does.

use super::{event::InboundEventType, value_object::RoomKind};

/// What the handler does with an accepted inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    /// Record presence, announce it, broadcast the user list.
    Join,
    /// Relay an ephemeral stroke; echo to sender follows [`EchoPolicy`].
    Stroke,
    /// Append a drawing object, then relay it.
    AppendObject,
    /// Reset the object sequence, then relay.
    ClearObjects,
    /// Stamp id, timestamp and author on the message, then relay.
    Chat,
    /// Relay verbatim to everyone but the sender.
    Relay,
}

const WHITEBOARD: &[(InboundEventType, EventAction)] = &[
    (InboundEventType::Join, EventAction::Join),
    (InboundEventType::DrawStroke, EventAction::Stroke),
    (InboundEventType::DrawComplete, EventAction::AppendObject),
    (InboundEventType::ClearCanvas, EventAction::ClearObjects),
];

const CHAT: &[(InboundEventType, EventAction)] = &[
    (InboundEventType::Join, EventAction::Join),
    (InboundEventType::Chat, EventAction::Chat),
];

const CODE: &[(InboundEventType, EventAction)] = &[
    (InboundEventType::Join, EventAction::Join),
    (InboundEventType::CodeUpdate, EventAction::Relay),
    (InboundEventType::FileChange, EventAction::Relay),
    (InboundEventType::Output, EventAction::Relay),
    (InboundEventType::RunComplete, EventAction::Relay),
];

impl RoomKind {
    pub fn vocabulary(&self) -> &'static [(InboundEventType, EventAction)] {
        match self {
            RoomKind::Whiteboard => WHITEBOARD,
            RoomKind::Chat => CHAT,
            RoomKind::Code => CODE,
        }
    }

    pub fn action_for(&self, event_type: InboundEventType) -> Option<EventAction> {
        self.vocabulary()
            .iter()
            .find(|(candidate, _)| *candidate == event_type)
            .map(|(_, action)| *action)
    }

    /// Whether the room keeps a drawing object sequence.
    pub fn retains_objects(&self) -> bool {
        matches!(self, RoomKind::Whiteboard)
    }

    /// Whether a new connection receives `state_sync` on connect.
    ///
    /// Code rooms keep no server-side copy, so late joiners see nothing
    /// until the next edit.
    pub fn hydrates_on_connect(&self) -> bool {
        self.retains_objects()
    }
}

/// Whether `live_stroke` / `object_added` are echoed back to their sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoPolicy {
    #[default]
    ExcludeSender,
    IncludeSender,
}

impl EchoPolicy {
    pub fn echoes(&self) -> bool {
        matches!(self, EchoPolicy::IncludeSender)
    }
}
