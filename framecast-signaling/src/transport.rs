//! Transport seam between the session loop and a socket implementation

use crate::error::{SignalingError, SignalingResult};
use crate::protocol::{InboundEvent, OutboundEvent};
use async_trait::async_trait;

/// A connected bidirectional event channel
#[async_trait]
pub trait EventTransport: Send {
    /// Send one event to the peer
    async fn emit(&mut self, event: OutboundEvent) -> SignalingResult<()>;

    /// Wait for the next inbound event.
    ///
    /// Returns `None` once the connection is closed and every pending event
    /// has been delivered.
    async fn next_event(&mut self) -> Option<SignalingResult<InboundEvent>>;

    /// Close the connection
    async fn close(&mut self) -> SignalingResult<()>;
}

#[async_trait]
impl<T: EventTransport + ?Sized> EventTransport for Box<T> {
    async fn emit(&mut self, event: OutboundEvent) -> SignalingResult<()> {
        (**self).emit(event).await
    }

    async fn next_event(&mut self) -> Option<SignalingResult<InboundEvent>> {
        (**self).next_event().await
    }

    async fn close(&mut self) -> SignalingResult<()> {
        (**self).close().await
    }
}

/// Parse a peer URL, mapping `http(s)` to `ws(s)`
pub(crate) fn websocket_url(raw: &str) -> SignalingResult<url::Url> {
    let mut url = url::Url::parse(raw).map_err(|e| SignalingError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    let scheme = match url.scheme() {
        "ws" | "http" => "ws",
        "wss" | "https" => "wss",
        other => {
            return Err(SignalingError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme {}", other),
            })
        }
    };
    if url.scheme() != scheme && url.set_scheme(scheme).is_err() {
        return Err(SignalingError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("cannot switch scheme to {}", scheme),
        });
    }
    Ok(url)
}
