//! Client configuration from environment variables.

use std::str::FromStr;
use std::time::Duration;

use roomchat_shared::EventType;

use crate::error::ClientError;

pub const ENV_WS_URL: &str = "ROOMCHAT_WS_URL";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "ROOMCHAT_CONNECT_TIMEOUT_MS";
pub const ENV_CLOSE_TIMEOUT_MS: &str = "ROOMCHAT_CLOSE_TIMEOUT_MS";
pub const ENV_MAX_FRAME_BYTES: &str = "ROOMCHAT_MAX_FRAME_BYTES";
pub const ENV_OUTBOUND: &str = "ROOMCHAT_OUTBOUND";

/// Event type used for locally authored chat messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutboundKind {
    #[default]
    SendMessage,
    Broadcast,
}

impl OutboundKind {
    pub fn event_type(self) -> EventType {
        match self {
            OutboundKind::SendMessage => EventType::SendMessage,
            OutboundKind::Broadcast => EventType::Broadcast,
        }
    }
}

impl FromStr for OutboundKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "send_message" | "send" => Ok(OutboundKind::SendMessage),
            "broadcast" => Ok(OutboundKind::Broadcast),
            _ => Err(ClientError::InvalidConfig {
                key: ENV_OUTBOUND,
                value: s.to_string(),
            }),
        }
    }
}

/// Connection and protocol settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Real-time channel endpoint, without identity query parameters.
    pub ws_url: String,
    /// Upper bound on the WebSocket handshake.
    pub connect_timeout: Duration,
    /// How long `disconnect` waits for queued frames to drain.
    pub close_timeout: Duration,
    /// Largest outbound text frame the remote service accepts.
    pub max_frame_bytes: usize,
    pub outbound: OutboundKind,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8080/ws".to_string(),
            connect_timeout: Duration::from_millis(5000),
            close_timeout: Duration::from_millis(2000),
            max_frame_bytes: 512,
            outbound: OutboundKind::SendMessage,
        }
    }
}

impl ClientConfig {
    /// Parse configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ROOMCHAT_WS_URL`: endpoint (default: "ws://localhost:8080/ws")
    /// - `ROOMCHAT_CONNECT_TIMEOUT_MS`: handshake timeout (default: 5000)
    /// - `ROOMCHAT_CLOSE_TIMEOUT_MS`: drain timeout on disconnect (default: 2000)
    /// - `ROOMCHAT_MAX_FRAME_BYTES`: outbound frame limit (default: 512)
    /// - `ROOMCHAT_OUTBOUND`: "send_message" | "broadcast" (default: "send_message")
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_WS_URL).filter(|v| !v.trim().is_empty()) {
            config.ws_url = url.trim().to_string();
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_CONNECT_TIMEOUT_MS)? {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_CLOSE_TIMEOUT_MS)? {
            config.close_timeout = Duration::from_millis(ms);
        }
        if let Some(bytes) = parse_var::<usize>(&lookup, ENV_MAX_FRAME_BYTES)? {
            config.max_frame_bytes = bytes;
        }
        if let Some(kind) = lookup(ENV_OUTBOUND).filter(|v| !v.trim().is_empty()) {
            config.outbound = kind.parse()?;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ClientError> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClientError::InvalidConfig { key, value: raw }),
        _ => Ok(None),
    }
}
