//! Socket.IO v5 packet codec
//!
//! Packets travel inside Engine.IO message packets as
//! `<type>[<attachments>-][<namespace>,][<ack id>][<json>]`. Binary packets
//! replace each buffer in the JSON with `{"_placeholder":true,"num":<i>}`
//! and send the buffers as the next `attachments` binary frames.

use crate::error::{SignalingError, SignalingResult};
use serde_json::{json, Value};

/// Namespace every client joins unless told otherwise
pub const DEFAULT_NAMESPACE: &str = "/";

/// Largest attachment count accepted on a binary packet
pub const MAX_ATTACHMENTS: usize = 64;

/// Socket.IO packet types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Connect,
    Disconnect,
    Event,
    Ack,
    ConnectError,
    BinaryEvent,
    BinaryAck,
}

impl PacketType {
    fn from_digit(digit: char) -> Option<Self> {
        Some(match digit {
            '0' => PacketType::Connect,
            '1' => PacketType::Disconnect,
            '2' => PacketType::Event,
            '3' => PacketType::Ack,
            '4' => PacketType::ConnectError,
            '5' => PacketType::BinaryEvent,
            '6' => PacketType::BinaryAck,
            _ => return None,
        })
    }

    fn digit(self) -> char {
        match self {
            PacketType::Connect => '0',
            PacketType::Disconnect => '1',
            PacketType::Event => '2',
            PacketType::Ack => '3',
            PacketType::ConnectError => '4',
            PacketType::BinaryEvent => '5',
            PacketType::BinaryAck => '6',
        }
    }

    /// Whether the packet is followed by binary attachments
    pub fn is_binary(self) -> bool {
        matches!(self, PacketType::BinaryEvent | PacketType::BinaryAck)
    }
}

/// A decoded Socket.IO packet
#[derive(Debug, Clone, PartialEq)]
pub struct SocketPacket {
    pub packet_type: PacketType,
    pub namespace: String,
    pub id: Option<u64>,
    pub data: Option<Value>,
    pub attachments: usize,
}

impl SocketPacket {
    fn new(packet_type: PacketType, data: Option<Value>) -> Self {
        Self {
            packet_type,
            namespace: DEFAULT_NAMESPACE.to_string(),
            id: None,
            data,
            attachments: 0,
        }
    }

    /// Namespace connect request
    pub fn connect() -> Self {
        Self::new(PacketType::Connect, None)
    }

    /// Namespace disconnect
    pub fn disconnect() -> Self {
        Self::new(PacketType::Disconnect, None)
    }

    /// Plain event `[name, payload]`
    pub fn event(name: &str, payload: Value) -> Self {
        Self::new(PacketType::Event, Some(json!([name, payload])))
    }

    /// Binary event whose payload references `attachments` placeholders
    pub fn binary_event(name: &str, payload: Value, attachments: usize) -> Self {
        let mut packet = Self::new(PacketType::BinaryEvent, Some(json!([name, payload])));
        packet.attachments = attachments;
        packet
    }

    /// Event name of an event packet
    pub fn event_name(&self) -> Option<&str> {
        match self.packet_type {
            PacketType::Event | PacketType::BinaryEvent => self
                .data
                .as_ref()
                .and_then(|data| data.get(0))
                .and_then(Value::as_str),
            _ => None,
        }
    }

    /// First argument after the event name, `Null` when absent
    pub fn event_payload(&self) -> Value {
        self.data
            .as_ref()
            .and_then(|data| data.get(1))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Encode to the text carried by an Engine.IO message packet
    pub fn encode(&self) -> String {
        let mut out = String::new();
        out.push(self.packet_type.digit());
        if self.packet_type.is_binary() {
            out.push_str(&self.attachments.to_string());
            out.push('-');
        }
        if self.namespace != DEFAULT_NAMESPACE {
            out.push_str(&self.namespace);
            out.push(',');
        }
        if let Some(id) = self.id {
            out.push_str(&id.to_string());
        }
        if let Some(data) = &self.data {
            out.push_str(&data.to_string());
        }
        out
    }

    /// Decode the text of an Engine.IO message packet
    pub fn decode(text: &str) -> SignalingResult<Self> {
        let mut rest = text;

        let packet_type = rest
            .chars()
            .next()
            .and_then(PacketType::from_digit)
            .ok_or_else(|| SignalingError::invalid_packet("unknown packet type", text))?;
        rest = &rest[1..];

        let mut attachments = 0;
        if packet_type.is_binary() {
            let dash = rest
                .find('-')
                .ok_or_else(|| SignalingError::invalid_packet("missing attachment count", text))?;
            attachments = rest[..dash]
                .parse()
                .map_err(|_| SignalingError::invalid_packet("bad attachment count", text))?;
            if attachments > MAX_ATTACHMENTS {
                return Err(SignalingError::invalid_packet(
                    format!("more than {} attachments", MAX_ATTACHMENTS),
                    text,
                ));
            }
            rest = &rest[dash + 1..];
        }

        let mut namespace = DEFAULT_NAMESPACE.to_string();
        if rest.starts_with('/') {
            let end = rest.find(',').unwrap_or(rest.len());
            namespace = rest[..end].to_string();
            rest = rest.get(end + 1..).unwrap_or("");
        }

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let id = if digits > 0 {
            Some(
                rest[..digits]
                    .parse()
                    .map_err(|_| SignalingError::invalid_packet("bad ack id", text))?,
            )
        } else {
            None
        };
        rest = &rest[digits..];

        let data = if rest.is_empty() {
            None
        } else {
            Some(serde_json::from_str(rest)?)
        };

        if packet_type.is_binary() {
            let placeholders = data.as_ref().map(count_placeholders).unwrap_or(0);
            if placeholders != attachments {
                return Err(SignalingError::invalid_packet(
                    format!(
                        "{} placeholders for {} attachments",
                        placeholders, attachments
                    ),
                    text,
                ));
            }
        }

        Ok(Self {
            packet_type,
            namespace,
            id,
            data,
            attachments,
        })
    }
}

/// Marker standing in for binary attachment `num`
pub fn placeholder(num: usize) -> Value {
    json!({ "_placeholder": true, "num": num })
}

/// Attachment index referenced by a placeholder value
pub fn placeholder_index(value: &Value) -> Option<usize> {
    let object = value.as_object()?;
    if object.get("_placeholder").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    object
        .get("num")
        .and_then(Value::as_u64)
        .map(|num| num as usize)
}

/// Count the placeholders anywhere inside `value`
pub fn count_placeholders(value: &Value) -> usize {
    if placeholder_index(value).is_some() {
        return 1;
    }
    match value {
        Value::Array(items) => items.iter().map(count_placeholders).sum(),
        Value::Object(map) => map.values().map(count_placeholders).sum(),
        _ => 0,
    }
}
