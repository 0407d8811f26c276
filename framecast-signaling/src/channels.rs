//! Plain JSON WebSocket client for Django Channels style consumers
//!
//! Every text frame is one JSON object tagged by `type`. Frames go out as
//! `{"type":"media","data":"<base64>"}`; the consumer rejects sockets that
//! do not carry a `session_id` query parameter.

use crate::error::{SignalingError, SignalingResult};
use crate::protocol::{ChannelMessage, InboundEvent, OutboundEvent};
use crate::transport::{websocket_url, EventTransport};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};
use url::Url;

type WebSocketConnection = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Build the consumer URL, adding `session_id` when given
pub fn channels_url(raw: &str, session_id: Option<&str>) -> SignalingResult<Url> {
    let mut url = websocket_url(raw)?;
    if let Some(session_id) = session_id {
        url.query_pairs_mut().append_pair("session_id", session_id);
    }
    Ok(url)
}

/// Client for a JSON-over-WebSocket consumer
pub struct ChannelsClient {
    ws: WebSocketConnection,
    pending: VecDeque<InboundEvent>,
    closed: bool,
}

impl std::fmt::Debug for ChannelsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelsClient")
            .field("pending", &self.pending.len())
            .field("closed", &self.closed)
            .finish()
    }
}

impl ChannelsClient {
    /// Open the socket; the successful handshake is reported as
    /// [`InboundEvent::Connected`]
    pub async fn connect(url: &str, session_id: Option<&str>) -> SignalingResult<Self> {
        let endpoint = channels_url(url, session_id)?;
        info!("Connecting to Channels consumer at {}", endpoint);

        let (ws, _) = connect_async(endpoint.as_str()).await?;

        let mut pending = VecDeque::new();
        pending.push_back(InboundEvent::Connected {
            sid: session_id.map(str::to_string),
        });
        Ok(Self {
            ws,
            pending,
            closed: false,
        })
    }

    fn mark_closed(&mut self, reason: &str) {
        if self.closed {
            return;
        }
        self.closed = true;
        debug!("Channels connection closed: {}", reason);
        self.pending.push_back(InboundEvent::Disconnected {
            reason: reason.to_string(),
        });
    }

    fn handle_text(&mut self, text: &str) -> SignalingResult<()> {
        let value: Value = serde_json::from_str(text)?;
        let event = match value.get("type").and_then(Value::as_str) {
            Some(kind) => {
                let kind = kind.to_string();
                InboundEvent::from_named(&kind, value, Vec::new())
            }
            None => InboundEvent::Message {
                name: "message".to_string(),
                data: value,
            },
        };
        self.pending.push_back(event);
        Ok(())
    }
}

/// Encode a frame as the consumer's `media` message
pub fn media_message(frame: &[u8]) -> SignalingResult<String> {
    let message = ChannelMessage::Media {
        data: STANDARD.encode(frame),
    };
    Ok(serde_json::to_string(&message)?)
}

#[async_trait]
impl EventTransport for ChannelsClient {
    async fn emit(&mut self, event: OutboundEvent) -> SignalingResult<()> {
        if self.closed {
            return Err(SignalingError::Closed);
        }
        match event {
            OutboundEvent::VideoChunk { frame } => {
                let text = media_message(&frame)?;
                self.ws.send(Message::Text(text)).await?;
            }
        }
        Ok(())
    }

    async fn next_event(&mut self) -> Option<SignalingResult<InboundEvent>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.closed {
                return None;
            }

            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    if let Err(e) = self.handle_text(&text) {
                        return Some(Err(e));
                    }
                }
                Some(Ok(Message::Binary(data))) => {
                    debug!("Received binary data of length {}", data.len());
                    self.pending.push_back(InboundEvent::VideoChunk {
                        data: Value::Null,
                        attachments: vec![Bytes::from(data)],
                    });
                }
                Some(Ok(Message::Close(_))) => self.mark_closed("server closed the socket"),
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    self.mark_closed("transport error");
                    return Some(Err(e.into()));
                }
                None => self.mark_closed("transport closed"),
            }
        }
    }

    async fn close(&mut self) -> SignalingResult<()> {
        if self.closed {
            return Ok(());
        }
        self.ws.close(None).await?;
        self.closed = true;
        info!("Channels connection closed");
        Ok(())
    }
}
