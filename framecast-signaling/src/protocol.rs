//! Typed socket events
//!
//! Inbound traffic from either socket flavor is surfaced as an
//! [`InboundEvent`]; the only outbound message is a captured frame.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event name used for frame messages in both directions
pub const VIDEO_CHUNK_EVENT: &str = "video_chunk";
/// Event name of the server greeting
pub const CONNECTION_ESTABLISHED_EVENT: &str = "connection_established";
/// Field of the outbound frame object holding the encoded image
pub const FRAME_FIELD: &str = "frame";

/// Kinds of inbound events, the key handlers are registered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connected,
    ConnectionEstablished,
    Disconnected,
    VideoChunk,
    Message,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Connected => "connect",
            EventKind::ConnectionEstablished => CONNECTION_ESTABLISHED_EVENT,
            EventKind::Disconnected => "disconnect",
            EventKind::VideoChunk => VIDEO_CHUNK_EVENT,
            EventKind::Message => "message",
        }
    }
}

/// Events received from the remote peer
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// The socket is connected and ready for events
    Connected {
        /// Session id assigned by the server, when it sends one
        sid: Option<String>,
    },
    /// Server greeting
    ConnectionEstablished {
        /// Human-readable greeting
        message: String,
    },
    /// The connection went away
    Disconnected {
        /// Why, as far as the client can tell
        reason: String,
    },
    /// Frame data pushed by the peer
    VideoChunk {
        /// JSON part of the payload, binary parts replaced by placeholders
        data: Value,
        /// Binary attachments in placeholder order
        attachments: Vec<Bytes>,
    },
    /// Any other named event
    Message {
        /// Event name
        name: String,
        /// Event payload
        data: Value,
    },
}

impl InboundEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InboundEvent::Connected { .. } => EventKind::Connected,
            InboundEvent::ConnectionEstablished { .. } => EventKind::ConnectionEstablished,
            InboundEvent::Disconnected { .. } => EventKind::Disconnected,
            InboundEvent::VideoChunk { .. } => EventKind::VideoChunk,
            InboundEvent::Message { .. } => EventKind::Message,
        }
    }

    /// Map a named event and its payload to a typed event
    pub fn from_named(name: &str, data: Value, attachments: Vec<Bytes>) -> Self {
        match name {
            CONNECTION_ESTABLISHED_EVENT => InboundEvent::ConnectionEstablished {
                message: greeting_text(&data),
            },
            VIDEO_CHUNK_EVENT => InboundEvent::VideoChunk { data, attachments },
            _ => InboundEvent::Message {
                name: name.to_string(),
                data,
            },
        }
    }
}

fn greeting_text(data: &Value) -> String {
    match data {
        Value::String(text) => text.clone(),
        other => other
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
    }
}

/// Events sent to the remote peer
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// One encoded frame, sent as `{ frame: <binary> }`
    VideoChunk {
        /// Encoded image bytes
        frame: Bytes,
    },
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::VideoChunk { .. } => VIDEO_CHUNK_EVENT,
        }
    }
}

/// JSON messages of the Channels consumer, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelMessage {
    /// Greeting sent right after the socket is accepted
    ConnectionEstablished {
        /// Greeting text
        message: String,
    },
    /// Base64 encoded media sent by the client
    Media {
        /// Base64 payload
        data: String,
    },
}
