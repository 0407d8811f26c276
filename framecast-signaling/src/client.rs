//! Socket.IO client over the Engine.IO WebSocket transport

use crate::engineio::{EnginePacket, OpenHandshake, ENGINE_IO_VERSION};
use crate::error::{SignalingError, SignalingResult};
use crate::protocol::{InboundEvent, OutboundEvent, FRAME_FIELD};
use crate::socketio::{placeholder, PacketType, SocketPacket, DEFAULT_NAMESPACE};
use crate::transport::{websocket_url, EventTransport};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};
use url::Url;

type WebSocketConnection = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Build the Engine.IO endpoint for a Socket.IO server URL.
///
/// A URL without a path gets the default `/socket.io/` path.
pub fn socket_io_url(raw: &str) -> SignalingResult<Url> {
    let mut url = websocket_url(raw)?;
    if url.path().is_empty() || url.path() == "/" {
        url.set_path("/socket.io/");
    }
    url.query_pairs_mut()
        .append_pair("EIO", &ENGINE_IO_VERSION.to_string())
        .append_pair("transport", "websocket");
    Ok(url)
}

/// Binary event waiting for its attachments
#[derive(Debug)]
struct PendingBinary {
    /// `None` for binary acks, which are drained and dropped
    name: Option<String>,
    data: Value,
    expected: usize,
    attachments: Vec<Bytes>,
}

/// Socket.IO client bound to one namespace
pub struct SocketIoClient {
    ws: WebSocketConnection,
    handshake: OpenHandshake,
    namespace: String,
    pending: VecDeque<InboundEvent>,
    partial: Option<PendingBinary>,
    closed: bool,
}

impl std::fmt::Debug for SocketIoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketIoClient")
            .field("sid", &self.handshake.sid)
            .field("namespace", &self.namespace)
            .field("closed", &self.closed)
            .finish()
    }
}

impl SocketIoClient {
    /// Connect to a Socket.IO server and request the default namespace.
    ///
    /// The namespace acknowledgement arrives later as
    /// [`InboundEvent::Connected`].
    pub async fn connect(url: &str) -> SignalingResult<Self> {
        let endpoint = socket_io_url(url)?;
        info!("Connecting to Socket.IO server at {}", endpoint);

        let (mut ws, _) = connect_async(endpoint.as_str()).await?;

        let handshake = loop {
            match ws.next().await {
                Some(Ok(message)) => match EnginePacket::decode(message)? {
                    Some(EnginePacket::Open(handshake)) => break handshake,
                    Some(EnginePacket::Noop) | None => continue,
                    Some(other) => {
                        return Err(SignalingError::Handshake {
                            reason: format!("expected open packet, got {:?}", other),
                        })
                    }
                },
                Some(Err(e)) => return Err(e.into()),
                None => {
                    return Err(SignalingError::Handshake {
                        reason: "connection closed before the open packet".to_string(),
                    })
                }
            }
        };
        debug!(
            sid = %handshake.sid,
            ping_interval_ms = handshake.ping_interval,
            ping_timeout_ms = handshake.ping_timeout,
            "Engine.IO session opened"
        );

        let mut client = Self {
            ws,
            handshake,
            namespace: DEFAULT_NAMESPACE.to_string(),
            pending: VecDeque::new(),
            partial: None,
            closed: false,
        };
        client
            .send_packet(EnginePacket::Message(SocketPacket::connect().encode()))
            .await?;
        Ok(client)
    }

    /// Engine.IO handshake received from the server
    pub fn handshake(&self) -> &OpenHandshake {
        &self.handshake
    }

    /// Whether the connection has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    async fn send_packet(&mut self, packet: EnginePacket) -> SignalingResult<()> {
        let message = packet.encode()?;
        self.ws.send(message).await?;
        Ok(())
    }

    fn mark_closed(&mut self, reason: &str) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.partial = None;
        debug!("Socket.IO connection closed: {}", reason);
        self.pending.push_back(InboundEvent::Disconnected {
            reason: reason.to_string(),
        });
    }

    async fn handle_engine_packet(&mut self, packet: EnginePacket) -> SignalingResult<()> {
        match packet {
            EnginePacket::Ping(payload) => {
                trace!("Engine.IO ping");
                self.send_packet(EnginePacket::Pong(payload)).await?;
            }
            EnginePacket::Close => self.mark_closed("server closed the transport"),
            EnginePacket::Message(text) => {
                let packet = SocketPacket::decode(&text)?;
                self.handle_socket_packet(packet)?;
            }
            EnginePacket::Binary(data) => self.push_attachment(data),
            EnginePacket::Open(_) => warn!("Ignoring unexpected Engine.IO open packet"),
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {}
        }
        Ok(())
    }

    fn handle_socket_packet(&mut self, packet: SocketPacket) -> SignalingResult<()> {
        if packet.namespace != self.namespace {
            debug!("Ignoring packet for namespace {}", packet.namespace);
            return Ok(());
        }

        match packet.packet_type {
            PacketType::Connect => {
                let sid = packet
                    .data
                    .as_ref()
                    .and_then(|data| data.get("sid"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                info!("Socket.IO namespace {} connected", self.namespace);
                self.pending.push_back(InboundEvent::Connected { sid });
            }
            PacketType::ConnectError => {
                let message = packet
                    .data
                    .as_ref()
                    .and_then(|data| data.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("connection refused")
                    .to_string();
                self.closed = true;
                return Err(SignalingError::ConnectRejected { message });
            }
            PacketType::Disconnect => self.mark_closed("server disconnected the namespace"),
            PacketType::Event => match packet.event_name() {
                Some(name) => {
                    let event = InboundEvent::from_named(name, packet.event_payload(), Vec::new());
                    self.pending.push_back(event);
                }
                None => warn!("Dropping event packet without a name"),
            },
            PacketType::BinaryEvent | PacketType::BinaryAck => {
                let name = match packet.packet_type {
                    PacketType::BinaryEvent => packet.event_name().map(str::to_string),
                    _ => None,
                };
                let pending = PendingBinary {
                    name,
                    data: packet.event_payload(),
                    expected: packet.attachments,
                    attachments: Vec::new(),
                };
                if pending.expected == 0 {
                    self.finish_binary(pending);
                } else {
                    self.partial = Some(pending);
                }
            }
            PacketType::Ack => debug!("Ignoring ack {:?}", packet.id),
        }
        Ok(())
    }

    fn push_attachment(&mut self, data: Bytes) {
        let complete = match self.partial.as_mut() {
            Some(partial) => {
                partial.attachments.push(data);
                partial.attachments.len() >= partial.expected
            }
            None => {
                warn!("Dropping unexpected binary frame of {} bytes", data.len());
                return;
            }
        };
        if complete {
            if let Some(partial) = self.partial.take() {
                self.finish_binary(partial);
            }
        }
    }

    fn finish_binary(&mut self, partial: PendingBinary) {
        if let Some(name) = partial.name {
            let event = InboundEvent::from_named(&name, partial.data, partial.attachments);
            self.pending.push_back(event);
        }
    }
}

#[async_trait]
impl EventTransport for SocketIoClient {
    async fn emit(&mut self, event: OutboundEvent) -> SignalingResult<()> {
        if self.closed {
            return Err(SignalingError::Closed);
        }

        let name = event.name();
        match event {
            OutboundEvent::VideoChunk { frame } => {
                let mut payload = serde_json::Map::new();
                payload.insert(FRAME_FIELD.to_string(), placeholder(0));
                let packet = SocketPacket::binary_event(name, Value::Object(payload), 1);

                trace!("Emitting {} with {} byte attachment", name, frame.len());
                self.send_packet(EnginePacket::Message(packet.encode()))
                    .await?;
                self.send_packet(EnginePacket::Binary(frame)).await?;
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

            let message = match self.ws.next().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    self.mark_closed("transport error");
                    return Some(Err(e.into()));
                }
                None => {
                    self.mark_closed("transport closed");
                    continue;
                }
            };

            let result = match EnginePacket::decode(message) {
                Ok(Some(packet)) => self.handle_engine_packet(packet).await,
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                return Some(Err(e));
            }
        }
    }

    async fn close(&mut self) -> SignalingResult<()> {
        if self.closed {
            return Ok(());
        }
        self.send_packet(EnginePacket::Message(SocketPacket::disconnect().encode()))
            .await?;
        self.send_packet(EnginePacket::Close).await?;
        self.ws.close(None).await?;
        self.closed = true;
        info!("Socket.IO connection closed");
        Ok(())
    }
}
