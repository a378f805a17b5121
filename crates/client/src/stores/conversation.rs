//! Explicit state container for one conversation.
//!
//! The connection manager and the event router never touch fields directly;
//! every change goes through a [`ConversationStore`] mutation function.

use crate::ws::ConnectionStatus;

use super::{MessageHistory, Participants, StoredMessage};

/// Read-only view of the conversation.
#[derive(Debug, Default, Clone)]
pub struct ConversationState {
    history: MessageHistory,
    typing: bool,
    participants: Participants,
    status: ConnectionStatus,
    last_error: Option<String>,
}

impl ConversationState {
    pub fn messages(&self) -> &[StoredMessage] {
        self.history.messages()
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn participants(&self) -> &Participants {
        &self.participants
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Most recent user-visible error, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

/// Owner of a [`ConversationState`] and the only way to change it.
#[derive(Debug, Default)]
pub struct ConversationStore {
    state: ConversationState,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Append to history. Returns false for a duplicate id.
    pub fn append_message(&mut self, message: StoredMessage) -> bool {
        let added = self.state.history.add_message(message);
        if !added {
            crate::log_debug!("Dropping duplicate message");
        }
        added
    }

    /// Remote typing indicator, last write wins.
    pub fn set_typing(&mut self, typing: bool) {
        self.state.typing = typing;
    }

    /// Returns false if the participant was already listed.
    pub fn add_participant(&mut self, name: &str) -> bool {
        self.state.participants.join(name)
    }

    /// Returns false if the participant was not listed.
    pub fn remove_participant(&mut self, name: &str) -> bool {
        self.state.participants.leave(name)
    }

    /// Record a connection status change.
    ///
    /// Typing and participants only describe the live connection, so they are
    /// cleared whenever the status actually changes. History is kept. Reaching
    /// `Connected` also clears the last error.
    pub fn set_status(&mut self, status: ConnectionStatus) {
        if self.state.status != status {
            self.state.typing = false;
            self.state.participants.clear();
        }
        self.state.status = status;
        if status.is_connected() {
            self.state.last_error = None;
        }
    }

    /// Surface a user-visible error until the next successful connect.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.state.last_error = Some(message.into());
    }

    /// Drop everything tied to the session: history, typing flag,
    /// participants and error. Connection status is left as is.
    pub fn reset(&mut self) {
        self.state.history.clear();
        self.state.typing = false;
        self.state.participants.clear();
        self.state.last_error = None;
    }
}
