//! Shared wire types and frame codec for the roomchat protocol.

pub mod error;
pub mod models;
pub mod protocol;

pub use error::*;
pub use models::*;
pub use protocol::*;
