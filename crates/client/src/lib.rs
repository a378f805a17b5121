//! Roomchat client
//!
//! Client-side event protocol and connection lifecycle for a room-based chat
//! service reached over a WebSocket channel.

pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod router;
pub mod session;
pub mod stores;
pub mod ws;

pub use config::{ClientConfig, OutboundKind};
pub use error::ClientError;
pub use identity::Identity;
pub use router::EventRouter;
pub use session::{ChatSession, SessionUpdate};
pub use ws::{ConnectionEvent, ConnectionManager, ConnectionStatus};
