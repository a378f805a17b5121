//! Conversation state owned by the UI layer.

pub mod conversation;
pub mod messages;
pub mod presence;

pub use conversation::{ConversationState, ConversationStore};
pub use messages::{MessageHistory, MessageKind, StoredMessage};
pub use presence::Participants;
