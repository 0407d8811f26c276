//! # Framecast - periodic frame emission over sockets
//!
//! Framecast opens a local video (and optionally audio) stream once the
//! socket connects, then every interval samples the current frame, encodes
//! it as JPEG and sends it to the peer as a single `video_chunk` message.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use framecast::{FramecastConfig, Session, SocketIoClient, SyntheticDevices, VideoResolution};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FramecastConfig::default();
//!     let transport = SocketIoClient::connect(&config.url).await?;
//!     let devices = SyntheticDevices::new(VideoResolution::HD);
//!
//!     let summary = Session::new(transport, devices, &config)?.run().await?;
//!     println!("sent {} frames", summary.emitter.frames_emitted);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

// Re-export the building blocks
pub use framecast_media::{
    open_devices, CaptureSource, JpegEncoder, MediaConstraints, MediaDevices, MediaError,
    MediaStream, OffscreenCanvas, SyntheticDevices, TrackSettings, VideoResolution,
};
#[cfg(feature = "camera")]
pub use framecast_media::CameraDevices;
pub use framecast_signaling::{
    ChannelsClient, EventKind, EventTransport, InboundEvent, OutboundEvent, SignalingError,
    SocketIoClient,
};

// Public API modules
pub mod cli;
pub mod config;
pub mod emitter;
pub mod error;
pub mod logging;
pub mod session;

// Re-export main API types
pub use config::{FramecastConfig, Protocol};
pub use emitter::{EmitOutcome, EmitterStats, EncodedFrame, FrameEmitter, SkipReason, StreamState};
pub use error::{FramecastError, FramecastResult};
pub use session::{Reaction, Session, SessionSummary};
