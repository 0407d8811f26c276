//! Engine.IO v4 packet codec (WebSocket transport)
//!
//! Over WebSocket every text frame carries exactly one packet: a single
//! digit type followed by its payload. Binary frames are binary message
//! packets and carry no type prefix.

use crate::error::{SignalingError, SignalingResult};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tungstenite::Message;

/// Engine.IO protocol revision spoken by the client
pub const ENGINE_IO_VERSION: u8 = 4;

/// Payload of the `open` packet sent by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    /// Engine session id
    pub sid: String,
    /// Transports the session could upgrade to
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Interval between server pings, in milliseconds
    pub ping_interval: u64,
    /// Time the server waits for a pong, in milliseconds
    pub ping_timeout: u64,
    /// Largest payload the server accepts, in bytes
    #[serde(default)]
    pub max_payload: Option<u64>,
}

impl OpenHandshake {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout)
    }
}

/// A single Engine.IO packet
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    /// `0`: session opened
    Open(OpenHandshake),
    /// `1`: transport closing
    Close,
    /// `2`: heartbeat from the server, optional probe payload
    Ping(String),
    /// `3`: heartbeat answer
    Pong(String),
    /// `4`: text message carrying a Socket.IO packet
    Message(String),
    /// Binary frame, an attachment of a Socket.IO binary packet
    Binary(Bytes),
    /// `5`: transport upgrade
    Upgrade,
    /// `6`: no-op
    Noop,
}

impl EnginePacket {
    /// Decode a text frame
    pub fn decode_text(text: &str) -> SignalingResult<Self> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| SignalingError::invalid_packet("empty packet", text))?;
        let payload = chars.as_str();

        let packet = match kind {
            '0' => EnginePacket::Open(serde_json::from_str(payload)?),
            '1' => EnginePacket::Close,
            '2' => EnginePacket::Ping(payload.to_string()),
            '3' => EnginePacket::Pong(payload.to_string()),
            '4' => EnginePacket::Message(payload.to_string()),
            '5' => EnginePacket::Upgrade,
            '6' => EnginePacket::Noop,
            _ => return Err(SignalingError::invalid_packet("unknown packet type", text)),
        };
        Ok(packet)
    }

    /// Decode a WebSocket message; control frames yield `None`
    pub fn decode(message: Message) -> SignalingResult<Option<Self>> {
        match message {
            Message::Text(text) => Self::decode_text(&text).map(Some),
            Message::Binary(data) => Ok(Some(EnginePacket::Binary(Bytes::from(data)))),
            Message::Close(_) => Ok(Some(EnginePacket::Close)),
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Ok(None),
        }
    }

    /// Encode into the WebSocket message that carries it
    pub fn encode(&self) -> SignalingResult<Message> {
        let text = match self {
            EnginePacket::Binary(data) => return Ok(Message::Binary(data.to_vec())),
            EnginePacket::Open(handshake) => format!("0{}", serde_json::to_string(handshake)?),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(payload) => format!("2{}", payload),
            EnginePacket::Pong(payload) => format!("3{}", payload),
            EnginePacket::Message(payload) => format!("4{}", payload),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        };
        Ok(Message::Text(text))
    }
}
