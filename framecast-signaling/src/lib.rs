//! # Framecast Signaling
//!
//! Socket connections for Framecast. Two flavors are supported: a Socket.IO
//! client speaking Engine.IO v4 over WebSocket, and a plain JSON WebSocket
//! client for Channels style consumers. Both surface traffic as typed
//! [`InboundEvent`]s behind the [`EventTransport`] trait.

#![warn(clippy::all)]

pub mod channels;
pub mod client;
pub mod dispatcher;
pub mod engineio;
pub mod error;
pub mod protocol;
pub mod socketio;
pub mod transport;

// Re-export main types
pub use channels::ChannelsClient;
pub use client::SocketIoClient;
pub use dispatcher::{EventDispatcher, EventHandler};
pub use error::{SignalingError, SignalingResult};
pub use protocol::{EventKind, InboundEvent, OutboundEvent};
pub use transport::EventTransport;
