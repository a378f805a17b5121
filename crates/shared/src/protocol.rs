//! Newline-delimited JSON frame codec.
//!
//! Every WebSocket text frame holds one or more JSON event envelopes, one per
//! line. Lines are decoded independently so a single bad line never poisons
//! the rest of the frame.

use crate::{Event, ProtocolError};

/// Serialize one event as a single-line JSON text frame.
pub fn encode_event(event: &Event) -> Result<String, ProtocolError> {
    serde_json::to_string(event).map_err(ProtocolError::Encode)
}

/// Decode a single line into an event envelope.
pub fn decode_event(line: &str) -> Result<Event, ProtocolError> {
    serde_json::from_str(line.trim()).map_err(ProtocolError::Malformed)
}

/// Decode every non-blank line of a text frame, in order.
pub fn decode_frame(frame: &str) -> impl Iterator<Item = Result<Event, ProtocolError>> + '_ {
    frame
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(decode_event)
}
