//! Connection manager for one real-time channel, using tokio-tungstenite.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use roomchat_shared::{encode_event, Event};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{endpoint_url, ConnectionEvent, ConnectionStatus};
use crate::config::ClientConfig;
use crate::identity::Identity;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum Outbound {
    Text(String),
    Close,
}

/// Status cell and event channel shared with the connection tasks.
///
/// Every connection gets a generation number. Once a connection is replaced
/// or closed locally the generation moves on, and its tasks can no longer
/// report anything.
#[derive(Clone)]
struct Lifecycle {
    status: Arc<watch::Sender<ConnectionStatus>>,
    events: UnboundedSender<ConnectionEvent>,
    generation: Arc<AtomicU64>,
}

impl Lifecycle {
    fn emit(&self, event: ConnectionEvent) {
        // Receiver may already be gone.
        let _ = self.events.unbounded_send(event);
    }

    fn transition(&self, next: ConnectionStatus) {
        let changed = self.status.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
        if changed {
            crate::log_debug!("Connection status -> {}", next);
            self.emit(ConnectionEvent::Status(next));
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn fail(&self, message: String) {
        crate::log_error!("{}", message);
        self.emit(ConnectionEvent::Error(message));
        self.transition(ConnectionStatus::Disconnected);
    }
}

struct ActiveConnection {
    outbound: UnboundedSender<Outbound>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

/// Owns at most one live WebSocket connection.
///
/// Lifecycle transitions and inbound frames are delivered on the receiver
/// returned by [`ConnectionManager::new`], in arrival order. Nothing is
/// retried automatically; reconnecting means calling `connect` again.
pub struct ConnectionManager {
    config: ClientConfig,
    lifecycle: Lifecycle,
    active: Option<ActiveConnection>,
}

impl ConnectionManager {
    /// Create a disconnected manager and the receiver its events arrive on.
    pub fn new(config: ClientConfig) -> (Self, UnboundedReceiver<ConnectionEvent>) {
        let (events, receiver) = unbounded();
        let (status, _) = watch::channel(ConnectionStatus::Disconnected);
        let manager = Self {
            config,
            lifecycle: Lifecycle {
                status: Arc::new(status),
                events,
                generation: Arc::new(AtomicU64::new(0)),
            },
            active: None,
        };
        (manager, receiver)
    }

    /// Current lifecycle status.
    pub fn status(&self) -> ConnectionStatus {
        *self.lifecycle.status.borrow()
    }

    /// Watch status transitions without going through the event channel.
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.lifecycle.status.subscribe()
    }

    /// Open a connection to `endpoint` as `identity`.
    ///
    /// Any previous connection is closed first. Failures are logged, reported
    /// as [`ConnectionEvent::Error`] and leave the status at `Disconnected`;
    /// they are never returned to the caller. Returns the resulting status.
    pub async fn connect(&mut self, endpoint: &str, identity: &Identity) -> ConnectionStatus {
        if self.active.is_some() {
            crate::log_info!("Closing previous connection before connecting again");
            self.disconnect(None).await;
        }

        let url = match endpoint_url(endpoint, identity) {
            Ok(url) => url,
            Err(e) => {
                self.lifecycle.fail(e.to_string());
                return self.status();
            }
        };

        let generation = self.lifecycle.advance();
        self.lifecycle.transition(ConnectionStatus::Connecting);
        crate::log_info!("Connecting to {} as '{}'", endpoint, identity.username());

        let handshake = connect_async(url.as_str());
        let ws_stream = match tokio::time::timeout(self.config.connect_timeout, handshake).await {
            Ok(Ok((ws_stream, _response))) => ws_stream,
            Ok(Err(e)) => {
                self.lifecycle.fail(format!("WebSocket error for {}: {}", endpoint, e));
                return self.status();
            }
            Err(_) => {
                self.lifecycle.fail(format!(
                    "Connection timeout after {}ms for {}",
                    self.config.connect_timeout.as_millis(),
                    endpoint
                ));
                return self.status();
            }
        };

        // Report Connected before the reader can forward any frame.
        self.lifecycle.transition(ConnectionStatus::Connected);
        crate::log_info!("WebSocket connected to {}", endpoint);

        let (write, read) = ws_stream.split();
        let (outbound, outbound_rx) = unbounded();

        let reader = tokio::spawn(read_loop(read, self.lifecycle.clone(), generation));
        let writer = tokio::spawn(write_loop(write, outbound_rx));

        self.active = Some(ActiveConnection {
            outbound,
            reader,
            writer,
        });

        self.status()
    }

    /// Queue an event for transmission.
    ///
    /// Only transmits while `Connected`. Otherwise, or when the encoded frame
    /// exceeds the configured size limit, this is a no-op that logs a warning
    /// and returns false.
    pub fn send(&self, event: &Event) -> bool {
        let active = match self.active.as_ref() {
            Some(active) if self.status().is_connected() => active,
            _ => {
                crate::log_warn!("Cannot send {} event: not connected", event.kind);
                return false;
            }
        };

        let json = match encode_event(event) {
            Ok(json) => json,
            Err(e) => {
                crate::log_error!("Serialize failed: {}", e);
                return false;
            }
        };

        if json.len() > self.config.max_frame_bytes {
            crate::log_warn!(
                "Refusing to send {} event: frame is {} bytes, limit is {}",
                event.kind,
                json.len(),
                self.config.max_frame_bytes
            );
            return false;
        }

        match active.outbound.unbounded_send(Outbound::Text(json)) {
            Ok(()) => true,
            Err(e) => {
                crate::log_warn!("Failed to queue {} event: {}", event.kind, e);
                false
            }
        }
    }

    /// Close the connection, optionally sending `farewell` first.
    ///
    /// Waits up to the configured close timeout for queued frames to drain.
    /// Always ends in `Disconnected`.
    pub async fn disconnect(&mut self, farewell: Option<&Event>) {
        if let Some(event) = farewell {
            self.send(event);
        }

        let Some(mut active) = self.active.take() else {
            self.lifecycle.transition(ConnectionStatus::Disconnected);
            return;
        };

        // Detach the reader so the local close is not reported as a remote one.
        self.lifecycle.advance();
        let _ = active.outbound.unbounded_send(Outbound::Close);

        if tokio::time::timeout(self.config.close_timeout, &mut active.writer)
            .await
            .is_err()
        {
            crate::log_warn!(
                "Writer did not drain within {}ms, dropping connection",
                self.config.close_timeout.as_millis()
            );
            active.writer.abort();
        }
        active.reader.abort();

        self.lifecycle.transition(ConnectionStatus::Disconnected);
        crate::log_info!("Disconnected");
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            self.lifecycle.advance();
            let _ = active.outbound.unbounded_send(Outbound::Close);
            active.reader.abort();
        }
    }
}

async fn read_loop(mut read: SplitStream<WsStream>, lifecycle: Lifecycle, generation: u64) {
    let (abnormal, reason) = loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => {
                crate::log_debug!("WebSocket received: {}", text.as_str());
                if !lifecycle.is_current(generation) {
                    return;
                }
                lifecycle.emit(ConnectionEvent::Frame(text.as_str().to_string()));
            }
            Some(Ok(Message::Close(frame))) => {
                break match frame {
                    Some(frame) => (
                        !matches!(frame.code, CloseCode::Normal | CloseCode::Away),
                        format!("code {} {}", u16::from(frame.code), frame.reason.as_str())
                            .trim_end()
                            .to_string(),
                    ),
                    None => (false, "closed by server".to_string()),
                };
            }
            Some(Ok(Message::Ping(data))) => {
                // Pong is handled automatically by tungstenite
                crate::log_debug!("Received ping: {:?}", data);
            }
            Some(Ok(Message::Binary(data))) => {
                crate::log_warn!("Ignoring binary frame of {} bytes", data.len());
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                crate::log_error!("WebSocket read error: {}", e);
                break (true, e.to_string());
            }
            None => break (true, "stream ended without close frame".to_string()),
        }
    };

    if !lifecycle.is_current(generation) {
        return;
    }
    crate::log_info!("WebSocket closed ({}): {}", if abnormal { "abnormal" } else { "normal" }, reason);
    lifecycle.emit(ConnectionEvent::Closed { abnormal, reason });
    lifecycle.transition(ConnectionStatus::Disconnected);
}

async fn write_loop(mut write: SplitSink<WsStream, Message>, mut outbound: UnboundedReceiver<Outbound>) {
    while let Some(item) = outbound.next().await {
        match item {
            Outbound::Text(json) => {
                crate::log_debug!("Sending: {}", json);
                if let Err(e) = write.send(Message::Text(json.into())).await {
                    crate::log_error!("Send failed: {}", e);
                    return;
                }
            }
            Outbound::Close => break,
        }
    }
    // Sends the close frame and flushes anything still buffered.
    if let Err(e) = write.close().await {
        crate::log_debug!("Close failed: {}", e);
    }
}
