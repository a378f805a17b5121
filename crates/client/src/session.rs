//! Chat session: the owner of identity, connection, router and store.
//!
//! All state mutation happens on the task that drives the session. Inbound
//! frames and lifecycle transitions are applied one at a time, in the order
//! the connection reported them.

use futures_channel::mpsc::UnboundedReceiver;
use futures_util::StreamExt;

use crate::config::ClientConfig;
use crate::identity::Identity;
use crate::router::{EventRouter, FrameSummary};
use crate::stores::{ConversationState, ConversationStore};
use crate::ws::{ConnectionEvent, ConnectionManager, ConnectionStatus};

pub const CONNECTION_LOST: &str = "Connection lost";

/// What processing one connection event changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Status(ConnectionStatus),
    Frame(FrameSummary),
    Closed { abnormal: bool },
    Error(String),
}

pub struct ChatSession {
    config: ClientConfig,
    identity: Identity,
    router: EventRouter,
    connection: ConnectionManager,
    events: UnboundedReceiver<ConnectionEvent>,
    store: ConversationStore,
}

impl ChatSession {
    pub fn new(config: ClientConfig, identity: Identity) -> Self {
        let router = EventRouter::new(&identity, config.outbound);
        let (connection, events) = ConnectionManager::new(config.clone());
        Self {
            config,
            identity,
            router,
            connection,
            events,
            store: ConversationStore::new(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn state(&self) -> &ConversationState {
        self.store.state()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.connection.status()
    }

    /// Connect to the configured endpoint. Any prior connection is closed.
    ///
    /// Never fails: a transport failure shows up as a `Disconnected` status
    /// and a user-visible error in the state.
    pub async fn connect(&mut self) -> ConnectionStatus {
        let status = self
            .connection
            .connect(&self.config.ws_url, &self.identity)
            .await;
        self.drain_pending();
        status
    }

    /// Send local text as a chat message and append it optimistically.
    ///
    /// Returns false, leaving history untouched, when the text is blank, the
    /// connection is not up, or the frame could not be queued.
    pub fn send_message(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        if !self.connection.status().is_connected() {
            crate::log_warn!("Not connected; message not sent");
            return false;
        }

        let event = self.router.chat_event(text);
        if !self.connection.send(&event) {
            return false;
        }
        self.store.append_message(self.router.to_stored(event.payload));
        true
    }

    /// Tell the room whether we are typing. No local state changes.
    pub fn send_typing(&mut self, typing: bool) -> bool {
        let event = self.router.typing_event(typing);
        self.connection.send(&event)
    }

    /// Leave the room and close the connection, then reset the conversation.
    pub async fn disconnect(&mut self) {
        let farewell = self
            .connection
            .status()
            .is_connected()
            .then(|| self.router.leave_event());
        self.connection.disconnect(farewell.as_ref()).await;
        self.drain_pending();
        self.store.reset();
    }

    /// Wait for the next connection event and apply it.
    ///
    /// Cancel-safe: an event is either fully applied or left in the queue.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        let event = self.events.next().await?;
        Some(self.apply(event))
    }

    /// Apply every event that is already queued, without waiting.
    pub fn drain_pending(&mut self) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        while let Ok(Some(event)) = self.events.try_next() {
            updates.push(self.apply(event));
        }
        updates
    }

    fn apply(&mut self, event: ConnectionEvent) -> SessionUpdate {
        match event {
            ConnectionEvent::Status(status) => {
                self.store.set_status(status);
                SessionUpdate::Status(status)
            }
            ConnectionEvent::Frame(text) => {
                SessionUpdate::Frame(self.router.handle_frame(&text, &mut self.store))
            }
            ConnectionEvent::Closed { abnormal, reason } => {
                if abnormal {
                    crate::log_warn!("{}: {}", CONNECTION_LOST, reason);
                    self.store.set_error(CONNECTION_LOST);
                }
                SessionUpdate::Closed { abnormal }
            }
            ConnectionEvent::Error(message) => {
                self.store.set_error(message.clone());
                SessionUpdate::Error(message)
            }
        }
    }
}
