//! Event router: decodes inbound events into store mutations and builds
//! outbound events.

use chrono::Local;
use roomchat_shared::{decode_frame, Event, EventType, WireMessage};

use crate::config::OutboundKind;
use crate::identity::{Identity, SYSTEM_SENDER};
use crate::stores::{ConversationStore, MessageKind, StoredMessage};

/// What a single inbound event did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Appended,
    /// Chat message whose id was already in history.
    Duplicate,
    Typing(bool),
    Joined(String),
    Left(String),
    Error(String),
    Ignored,
}

/// Counts for one inbound frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSummary {
    pub applied: usize,
    pub malformed: usize,
}

/// Display time in the `hh:mm AM` form used across the chat.
pub fn display_time_now() -> String {
    Local::now().format("%I:%M %p").to_string()
}

pub struct EventRouter {
    local_username: String,
    room_id: Option<String>,
    outbound: OutboundKind,
}

impl EventRouter {
    pub fn new(identity: &Identity, outbound: OutboundKind) -> Self {
        Self {
            local_username: identity.username().to_string(),
            room_id: identity.room_id().map(str::to_string),
            outbound,
        }
    }

    /// Decode every line of a text frame and apply the valid ones in order.
    ///
    /// Malformed lines are logged and skipped; they never stop the rest of
    /// the frame from being processed.
    pub fn handle_frame(&self, frame: &str, store: &mut ConversationStore) -> FrameSummary {
        let mut summary = FrameSummary::default();
        for decoded in decode_frame(frame) {
            match decoded {
                Ok(event) => {
                    self.apply(event, store);
                    summary.applied += 1;
                }
                Err(e) => {
                    crate::log_warn!("Discarding inbound event: {}", e);
                    summary.malformed += 1;
                }
            }
        }
        summary
    }

    /// Apply exactly one inbound event to the store.
    pub fn apply(&self, event: Event, store: &mut ConversationStore) -> RouteOutcome {
        let Event { kind, payload } = event;
        match kind {
            EventType::MessageReceived | EventType::SendMessage | EventType::Broadcast => {
                if store.append_message(self.to_stored(payload)) {
                    RouteOutcome::Appended
                } else {
                    RouteOutcome::Duplicate
                }
            }
            EventType::Typing => {
                let typing = payload.content == "true";
                store.set_typing(typing);
                RouteOutcome::Typing(typing)
            }
            EventType::UserJoined => {
                if payload.sender.is_empty() {
                    crate::log_warn!("Ignoring USER_JOINED without sender");
                    return RouteOutcome::Ignored;
                }
                store.add_participant(&payload.sender);
                store.append_message(system_message(format!("{} joined the room", payload.sender)));
                RouteOutcome::Joined(payload.sender)
            }
            EventType::UserLeft => {
                if payload.sender.is_empty() {
                    crate::log_warn!("Ignoring USER_LEFT without sender");
                    return RouteOutcome::Ignored;
                }
                store.remove_participant(&payload.sender);
                store.append_message(system_message(format!("{} left the room", payload.sender)));
                RouteOutcome::Left(payload.sender)
            }
            EventType::Error => {
                crate::log_warn!("Server error: {}", payload.content);
                store.set_error(payload.content.clone());
                RouteOutcome::Error(payload.content)
            }
            EventType::LeaveRoom | EventType::Unknown => {
                crate::log_warn!("Unhandled event type {} from '{}'", kind, payload.sender);
                RouteOutcome::Ignored
            }
        }
    }

    /// Convert a wire payload into a history entry, stamping the receipt time
    /// when the payload has none.
    pub fn to_stored(&self, payload: WireMessage) -> StoredMessage {
        let time = payload
            .display_time()
            .map(str::to_string)
            .unwrap_or_else(display_time_now);
        StoredMessage {
            is_me: payload.sender == self.local_username,
            id: payload.id,
            sender: payload.sender,
            content: payload.content,
            time,
            avatar: payload.avatar,
            kind: MessageKind::Chat,
        }
    }

    /// Package local text as an outbound chat event.
    pub fn chat_event(&self, text: &str) -> Event {
        Event::new(self.outbound.event_type(), self.local_payload(text))
    }

    /// TYPING event carrying `"true"` or `"false"` as content.
    pub fn typing_event(&self, typing: bool) -> Event {
        let content = if typing { "true" } else { "false" };
        Event::new(EventType::Typing, self.local_payload(content))
    }

    /// Farewell sent before a deliberate disconnect.
    pub fn leave_event(&self) -> Event {
        Event::new(EventType::LeaveRoom, self.local_payload(""))
    }

    fn local_payload(&self, content: &str) -> WireMessage {
        WireMessage {
            id: uuid::Uuid::new_v4().to_string(),
            sender: self.local_username.clone(),
            content: content.to_string(),
            time: Some(display_time_now()),
            avatar: None,
            room_id: self.room_id.clone(),
        }
    }
}

fn system_message(content: String) -> StoredMessage {
    StoredMessage {
        id: uuid::Uuid::new_v4().to_string(),
        sender: SYSTEM_SENDER.to_string(),
        content,
        time: display_time_now(),
        avatar: None,
        is_me: false,
        kind: MessageKind::System,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomchat_shared::encode_event;

    fn router(username: &str) -> EventRouter {
        EventRouter::new(&Identity::new(username, Some("room1")).unwrap(), OutboundKind::SendMessage)
    }

    fn inbound(kind: EventType, id: &str, sender: &str, content: &str) -> Event {
        Event::new(
            kind,
            WireMessage {
                id: id.to_string(),
                sender: sender.to_string(),
                content: content.to_string(),
                time: Some("10:00".to_string()),
                avatar: None,
                room_id: None,
            },
        )
    }

    #[test]
    fn own_message_is_flagged_as_me() {
        let router = router("alice");
        let mut store = ConversationStore::new();
        let frame = r#"{"type":"MESSAGE_RECEIVED","payload":{"id":"1","sender":"alice","content":"hi","time":"10:00"}}"#;
        let summary = router.handle_frame(frame, &mut store);
        assert_eq!(summary, FrameSummary { applied: 1, malformed: 0 });
        let msg = &store.state().messages()[0];
        assert!(msg.is_me);
        assert_eq!(msg.time, "10:00");
        assert_eq!(msg.kind, MessageKind::Chat);
    }

    #[test]
    fn chat_types_all_append_and_others_are_not_me() {
        let router = router("alice");
        let mut store = ConversationStore::new();
        router.apply(inbound(EventType::MessageReceived, "1", "bob", "a"), &mut store);
        router.apply(inbound(EventType::SendMessage, "2", "bob", "b"), &mut store);
        router.apply(inbound(EventType::Broadcast, "3", "carol", "c"), &mut store);
        let messages = store.state().messages();
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| !m.is_me));
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["a", "b", "c"]);
    }

    #[test]
    fn history_counts_only_valid_events() {
        let router = router("alice");
        let mut store = ConversationStore::new();
        let mut lines = Vec::new();
        for i in 0..5 {
            lines.push(encode_event(&inbound(EventType::MessageReceived, &i.to_string(), "bob", "x")).unwrap());
            lines.push(format!("{{\"type\":\"MESSAGE_RECEIVED\",\"payload\":{{\"id\":\"bad{}\"}}}}", i));
        }
        lines.push("garbage".to_string());
        let summary = router.handle_frame(&lines.join("\n"), &mut store);
        assert_eq!(summary, FrameSummary { applied: 5, malformed: 6 });
        assert_eq!(store.state().messages().len(), 5);
    }

    #[test]
    fn messages_without_id_all_land_in_history() {
        let router = router("alice");
        let mut store = ConversationStore::new();
        let frame = ["bob", "carol", "dave"]
            .iter()
            .map(|sender| encode_event(&inbound(EventType::MessageReceived, "", sender, "hey")).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        let summary = router.handle_frame(&frame, &mut store);
        assert_eq!(summary, FrameSummary { applied: 3, malformed: 0 });
        let senders: Vec<_> = store.state().messages().iter().map(|m| m.sender.as_str()).collect();
        assert_eq!(senders, ["bob", "carol", "dave"]);
    }

    #[test]
    fn missing_time_is_stamped_at_receipt() {
        let router = router("alice");
        let mut store = ConversationStore::new();
        let frame = r#"{"type":"MESSAGE_RECEIVED","payload":{"id":"1","sender":"bob","content":"hi","time":""}}"#;
        router.handle_frame(frame, &mut store);
        let time = &store.state().messages()[0].time;
        assert!(time.ends_with("AM") || time.ends_with("PM"), "got {time}");
    }

    #[test]
    fn typing_is_last_write_wins() {
        let router = router("alice");
        let mut store = ConversationStore::new();
        router.apply(inbound(EventType::Typing, "t1", "bob", "true"), &mut store);
        assert!(store.state().is_typing());
        router.apply(inbound(EventType::Typing, "t2", "bob", "false"), &mut store);
        assert!(!store.state().is_typing());
        router.apply(inbound(EventType::Typing, "t3", "bob", "true"), &mut store);
        router.apply(inbound(EventType::Typing, "t4", "bob", "yes"), &mut store);
        assert!(!store.state().is_typing());
        assert!(store.state().messages().is_empty());
    }

    #[test]
    fn join_and_leave_track_participants() {
        let router = router("alice");
        let mut store = ConversationStore::new();
        assert_eq!(
            router.apply(inbound(EventType::UserJoined, "j", "bob", ""), &mut store),
            RouteOutcome::Joined("bob".to_string())
        );
        assert!(store.state().participants().contains("bob"));
        router.apply(inbound(EventType::UserLeft, "l", "bob", ""), &mut store);
        assert!(!store.state().participants().contains("bob"));

        let messages = store.state().messages();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.kind == MessageKind::System && m.sender == SYSTEM_SENDER));
        assert_eq!(messages[0].content, "bob joined the room");
        assert_eq!(messages[1].content, "bob left the room");
    }

    #[test]
    fn leaving_non_member_still_appends_notice() {
        let router = router("alice");
        let mut store = ConversationStore::new();
        router.apply(inbound(EventType::UserJoined, "j", "carol", ""), &mut store);
        let before = store.state().participants().clone();
        router.apply(inbound(EventType::UserLeft, "l", "dave", ""), &mut store);
        assert_eq!(store.state().participants(), &before);
        assert_eq!(store.state().messages().len(), 2);
    }

    #[test]
    fn error_event_surfaces_content() {
        let router = router("alice");
        let mut store = ConversationStore::new();
        router.apply(inbound(EventType::Error, "e", "server", "room is full"), &mut store);
        assert_eq!(store.state().last_error(), Some("room is full"));
        assert!(store.state().messages().is_empty());
    }

    #[test]
    fn unknown_and_leave_room_are_discarded() {
        let router = router("alice");
        let mut store = ConversationStore::new();
        let frame = concat!(
            r#"{"type":"join_room","payload":{"id":"1","sender":"bob","content":"x"}}"#,
            "\n",
            r#"{"type":"LEAVE_ROOM","payload":{"id":"2","sender":"bob","content":""}}"#,
        );
        let summary = router.handle_frame(frame, &mut store);
        assert_eq!(summary.applied, 2);
        assert!(store.state().messages().is_empty());
        assert!(store.state().participants().is_empty());
        assert_eq!(store.state().last_error(), None);
    }

    #[test]
    fn echo_of_own_message_is_deduplicated() {
        let router = router("alice");
        let mut store = ConversationStore::new();
        let event = router.chat_event("hello");
        store.append_message(router.to_stored(event.payload.clone()));
        let echo = Event::new(EventType::MessageReceived, event.payload);
        assert_eq!(router.apply(echo, &mut store), RouteOutcome::Duplicate);
        assert_eq!(store.state().messages().len(), 1);
    }

    #[test]
    fn outbound_events_carry_identity() {
        let router = router("alice");
        let chat = router.chat_event("hello");
        assert_eq!(chat.kind, EventType::SendMessage);
        assert_eq!(chat.payload.sender, "alice");
        assert_eq!(chat.payload.content, "hello");
        assert_eq!(chat.payload.room_id.as_deref(), Some("room1"));
        assert!(chat.payload.time.is_some());
        assert_ne!(chat.payload.id, router.chat_event("hello").payload.id);

        assert_eq!(router.typing_event(true).payload.content, "true");
        assert_eq!(router.typing_event(false).kind, EventType::Typing);
        assert_eq!(router.leave_event().kind, EventType::LeaveRoom);

        let broadcast = EventRouter::new(&Identity::new("alice", None).unwrap(), OutboundKind::Broadcast);
        assert_eq!(broadcast.chat_event("x").kind, EventType::Broadcast);
    }
}
