//! Protocol error types.

use thiserror::Error;

/// Errors raised while encoding or decoding wire events.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A line was not a well-formed event envelope.
    #[error("malformed event: {0}")]
    Malformed(#[source] serde_json::Error),
    /// An outbound event could not be serialized.
    #[error("failed to encode event: {0}")]
    Encode(#[source] serde_json::Error),
}
