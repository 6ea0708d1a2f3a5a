//! Duplex connection to the live endpoint
//!
//! A [`LiveConnector`] opens a connection and hands back a pair of channels
//! plus a guard that tears the connection down. The session never touches the
//! socket directly, which keeps it testable with an in-memory connector.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::Message;

use super::events::{parse_server_message, ClientMessage, ServerEvent, SetupConfig};
use super::resources::{Releasable, TaskGuard};
use crate::credentials::CredentialProvider;

const CHANNEL_CAPACITY: usize = 64;

/// What the downlink sees
#[derive(Debug, Clone, PartialEq)]
pub enum LiveInbound {
    Event(ServerEvent),
    /// The server closed the connection
    Closed { reason: Option<String> },
    /// The connection failed
    Error(String),
}

pub struct LiveChannel {
    pub outbound: mpsc::Sender<ClientMessage>,
    pub inbound: mpsc::Receiver<LiveInbound>,
    /// Closes the connection when released
    pub guard: Box<dyn Releasable>,
}

#[async_trait]
pub trait LiveConnector: Send + Sync {
    /// Open a connection and send the setup message
    async fn connect(&self, setup: SetupConfig) -> Result<LiveChannel, String>;
}

// ===== WebSocket implementation =====

pub struct GeminiLiveConnector {
    url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl GeminiLiveConnector {
    pub fn new(url: impl Into<String>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            url: url.into(),
            credentials,
        }
    }
}

/// Aborts the writer and reader tasks. Dropping the writer's sink closes
/// the socket.
struct ConnectionGuard {
    writer: TaskGuard,
    reader: TaskGuard,
}

impl Releasable for ConnectionGuard {
    fn release(&mut self) {
        self.reader.release();
        self.writer.release();
    }

    fn label(&self) -> &str {
        "live connection"
    }
}

#[async_trait]
impl LiveConnector for GeminiLiveConnector {
    async fn connect(&self, setup: SetupConfig) -> Result<LiveChannel, String> {
        let key = self
            .credentials
            .api_key()
            .ok_or_else(|| "no API key selected".to_string())?;
        let url = format!("{}?key={}", self.url, key);

        log::info!("Opening live session with model {}", setup.model);
        let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| format!("WebSocket handshake failed: {}", e))?;
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        let setup_message = ClientMessage::Setup(setup).to_json().to_string();
        ws_sender
            .send(Message::text(setup_message))
            .await
            .map_err(|e| format!("Failed to send setup: {}", e))?;

        let (outbound_tx, mut outbound_rx) = mpsc::channel::<ClientMessage>(CHANNEL_CAPACITY);
        let (inbound_tx, inbound_rx) = mpsc::channel::<LiveInbound>(CHANNEL_CAPACITY);

        let writer = tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                let text = message.to_json().to_string();
                if let Err(e) = ws_sender.send(Message::text(text)).await {
                    log::warn!("Live send failed: {}", e);
                    break;
                }
            }
            let _ = ws_sender.send(Message::Close(None)).await;
        });

        let reader = tokio::spawn(async move {
            while let Some(frame) = ws_receiver.next().await {
                let raw = match frame {
                    Ok(Message::Text(text)) => text.as_str().to_string(),
                    Ok(Message::Binary(bytes)) => String::from_utf8_lossy(&bytes).to_string(),
                    Ok(Message::Close(frame)) => {
                        let reason = frame.map(|f| f.reason.as_str().to_string());
                        let _ = inbound_tx.send(LiveInbound::Closed { reason }).await;
                        return;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        let _ = inbound_tx.send(LiveInbound::Error(e.to_string())).await;
                        return;
                    }
                };

                match parse_server_message(&raw) {
                    Ok(events) => {
                        for event in events {
                            if inbound_tx.send(LiveInbound::Event(event)).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => log::warn!("Ignoring unparseable live frame: {}", e),
                }
            }
            let _ = inbound_tx.send(LiveInbound::Closed { reason: None }).await;
        });

        Ok(LiveChannel {
            outbound: outbound_tx,
            inbound: inbound_rx,
            guard: Box::new(ConnectionGuard {
                writer: TaskGuard::new("live writer", writer),
                reader: TaskGuard::new("live reader", reader),
            }),
        })
    }
}
