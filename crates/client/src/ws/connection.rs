//! Connection status, lifecycle events and endpoint construction.

use url::Url;

use crate::error::ClientError;
use crate::identity::Identity;

/// Connection state for the real-time channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
        };
        f.write_str(label)
    }
}

/// Everything the connection reports back to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Connection status changed
    Status(ConnectionStatus),
    /// A text frame arrived; may hold several newline-delimited events
    Frame(String),
    /// The remote side closed the connection or the transport failed
    Closed { abnormal: bool, reason: String },
    /// The connection could not be established
    Error(String),
}

/// Build the endpoint URL carrying the identity as query parameters.
///
/// `http`/`https` endpoints are mapped to `ws`/`wss`. Any `username` or
/// `roomid` already present in the endpoint is replaced.
pub fn endpoint_url(endpoint: &str, identity: &Identity) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let mut url = Url::parse(endpoint.trim()).map_err(|e| invalid(e.to_string()))?;

    let scheme = match url.scheme() {
        "ws" | "http" => "ws",
        "wss" | "https" => "wss",
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    };
    if url.scheme() != scheme && url.set_scheme(scheme).is_err() {
        return Err(invalid(format!("cannot switch scheme to '{}'", scheme)));
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "username" && k != "roomid")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (k, v) in &kept {
            query.append_pair(k, v);
        }
        query.append_pair("username", identity.username());
        if let Some(room) = identity.room_id() {
            query.append_pair("roomid", room);
        }
    }

    Ok(url)
}
