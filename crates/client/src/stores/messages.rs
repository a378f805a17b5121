//! Message history for one conversation.
//!
//! History is append-only and kept in arrival order. Messages are
//! de-duplicated by id, so a server echo of a message we already appended
//! optimistically is dropped. Entries with an empty id are never treated as
//! duplicates.

use std::collections::HashSet;

/// Where a history entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Authored by a participant (local or remote).
    Chat,
    /// Generated by the client for join/leave notices.
    System,
}

/// A message stored in the conversation history.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StoredMessage {
    pub id: String,
    pub sender: String,
    pub content: String,
    /// Display timestamp, as received or as stamped at receipt.
    pub time: String,
    pub avatar: Option<String>,
    /// Computed at receipt by comparing the sender with the local username.
    pub is_me: bool,
    pub kind: MessageKind,
}

#[derive(Debug, Default, Clone)]
pub struct MessageHistory {
    messages: Vec<StoredMessage>,
    ids: HashSet<String>,
}

impl MessageHistory {
    /// Append a message to the end of the history.
    /// Returns false if a message with the same ID already exists (deduplication).
    /// Messages without an id are always appended.
    pub fn add_message(&mut self, msg: StoredMessage) -> bool {
        if !msg.id.is_empty() && !self.ids.insert(msg.id.clone()) {
            return false;
        }
        self.messages.push(msg);
        true
    }

    pub fn messages(&self) -> &[StoredMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str, content: &str) -> StoredMessage {
        StoredMessage {
            id: id.to_string(),
            sender: "bob".to_string(),
            content: content.to_string(),
            time: "10:00 AM".to_string(),
            avatar: None,
            is_me: false,
            kind: MessageKind::Chat,
        }
    }

    #[test]
    fn keeps_arrival_order() {
        let mut history = MessageHistory::default();
        history.add_message(msg("b", "first"));
        history.add_message(msg("a", "second"));
        let contents: Vec<_> = history.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);
    }

    #[test]
    fn drops_duplicate_ids() {
        let mut history = MessageHistory::default();
        assert!(history.add_message(msg("1", "hi")));
        assert!(!history.add_message(msg("1", "hi again")));
        assert_eq!(history.len(), 1);
        assert_eq!(history.messages()[0].content, "hi");
    }

    #[test]
    fn empty_ids_are_never_duplicates() {
        let mut history = MessageHistory::default();
        assert!(history.add_message(msg("", "from bob")));
        assert!(history.add_message(msg("", "from carol")));
        assert!(history.add_message(msg("", "from dave")));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn clear_forgets_ids() {
        let mut history = MessageHistory::default();
        history.add_message(msg("1", "hi"));
        history.clear();
        assert!(history.is_empty());
        assert!(history.add_message(msg("1", "hi")));
    }
}
