//! Wire models exchanged over the real-time channel.

use serde::{Deserialize, Serialize};

/// Event discriminator carried in the `type` field of every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    SendMessage,
    MessageReceived,
    Typing,
    Broadcast,
    UserJoined,
    UserLeft,
    Error,
    LeaveRoom,
    /// Any discriminator this client does not know about.
    #[serde(other)]
    Unknown,
}

impl EventType {
    /// Whether events of this type carry a chat message for the history.
    pub fn is_chat(self) -> bool {
        matches!(
            self,
            EventType::SendMessage | EventType::MessageReceived | EventType::Broadcast
        )
    }

    /// Wire name, as it appears in the `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::SendMessage => "SEND_MESSAGE",
            EventType::MessageReceived => "MESSAGE_RECEIVED",
            EventType::Typing => "TYPING",
            EventType::Broadcast => "BROADCAST",
            EventType::UserJoined => "USER_JOINED",
            EventType::UserLeft => "USER_LEFT",
            EventType::Error => "ERROR",
            EventType::LeaveRoom => "LEAVE_ROOM",
            EventType::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message-shaped payload carried by every event.
///
/// For `TYPING` events `content` holds `"true"` or `"false"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub id: String,
    pub sender: String,
    pub content: String,
    /// Display timestamp. Servers may omit it or send an empty string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}

impl WireMessage {
    /// The display time, treating an empty string as absent.
    pub fn display_time(&self) -> Option<&str> {
        self.time.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// A typed envelope exchanged over the real-time channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventType,
    pub payload: WireMessage,
}

impl Event {
    /// Wrap a payload in an envelope of the given type.
    pub fn new(kind: EventType, payload: WireMessage) -> Self {
        Self { kind, payload }
    }
}
