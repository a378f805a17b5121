//! WebSocket module for the real-time chat channel.
//!
//! This module provides:
//! - [`ConnectionManager`]: owns at most one live connection and exposes
//!   `connect` / `send` / `disconnect`
//! - [`ConnectionEvent`]: lifecycle transitions and inbound frames, delivered
//!   in arrival order over a channel
//!
//! # Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────┐
//!   │            ConnectionManager             │
//!   │  status (watch)      outbound (mpsc)     │
//!   └──────────────────────────────────────────┘
//!        │ spawns                     │
//!        ▼                            ▼
//!   ┌────────────┐             ┌────────────┐
//!   │ read task  │             │ write task │
//!   └────────────┘             └────────────┘
//!        │ ConnectionEvent
//!        ▼
//!   ┌──────────────────────────────────────────┐
//!   │  ChatSession (router + store, one task)  │
//!   └──────────────────────────────────────────┘
//! ```
//!
//! The tasks never touch conversation state. The session drains the event
//! channel and applies each event to its store one at a time.

pub mod connection;
pub mod manager;

pub use connection::{endpoint_url, ConnectionEvent, ConnectionStatus};
pub use manager::ConnectionManager;
