//! Error types for socket connections

use thiserror::Error;

/// Main error type for signaling operations
#[derive(Error, Debug)]
pub enum SignalingError {
    /// Server URL could not be used
    #[error("Invalid server URL {url}: {reason}")]
    InvalidUrl {
        /// URL as given
        url: String,
        /// Reason it was rejected
        reason: String,
    },

    /// WebSocket transport failure
    #[error("WebSocket error: {source}")]
    WebSocket {
        /// Underlying error
        #[from]
        source: tungstenite::Error,
    },

    /// JSON payload could not be (de)serialized
    #[error("JSON error: {source}")]
    Json {
        /// Underlying error
        #[from]
        source: serde_json::Error,
    },

    /// Packet did not follow the wire format
    #[error("Invalid packet: {reason} ({packet})")]
    InvalidPacket {
        /// What was wrong
        reason: String,
        /// Offending packet, possibly truncated
        packet: String,
    },

    /// Opening handshake did not complete
    #[error("Handshake failed: {reason}")]
    Handshake {
        /// Why the handshake failed
        reason: String,
    },

    /// Server refused the namespace connection
    #[error("Connection rejected by server: {message}")]
    ConnectRejected {
        /// Message sent by the server
        message: String,
    },

    /// Operation on a closed connection
    #[error("Connection closed")]
    Closed,
}

/// Result type alias for signaling operations
pub type SignalingResult<T> = Result<T, SignalingError>;

impl SignalingError {
    /// Build an [`SignalingError::InvalidPacket`], truncating long packets
    pub fn invalid_packet(reason: impl Into<String>, packet: &str) -> Self {
        let mut shown: String = packet.chars().take(64).collect();
        if shown.len() < packet.len() {
            shown.push_str("...");
        }
        SignalingError::InvalidPacket {
            reason: reason.into(),
            packet: shown,
        }
    }

    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            SignalingError::InvalidUrl { .. } => "INVALID_URL",
            SignalingError::WebSocket { .. } => "WEBSOCKET",
            SignalingError::Json { .. } => "JSON",
            SignalingError::InvalidPacket { .. } => "INVALID_PACKET",
            SignalingError::Handshake { .. } => "HANDSHAKE",
            SignalingError::ConnectRejected { .. } => "CONNECT_REJECTED",
            SignalingError::Closed => "CLOSED",
        }
    }
}
