//! # Framecast Media
//!
//! Media stream acquisition, frame sampling and JPEG encoding for Framecast.
//! A [`MediaDevices`] backend hands out a [`MediaStream`]; frames sampled
//! from it are drawn onto an [`OffscreenCanvas`] and encoded by
//! [`JpegEncoder`].

#![warn(clippy::all)]

pub mod canvas;
pub mod capture;
pub mod codecs;
pub mod error;
pub mod tracks;
pub mod video_capture;

// Re-export main types
pub use canvas::OffscreenCanvas;
pub use capture::{open_devices, CaptureSource, SyntheticDevices, SyntheticSource};
#[cfg(feature = "camera")]
pub use capture::CameraDevices;
pub use codecs::{CodecInfo, JpegEncoder, DEFAULT_JPEG_QUALITY};
pub use error::{ErrorCategory, MediaError, MediaResult};
pub use tracks::{AudioTrack, TrackSettings, VideoFrame, VideoTrack};
pub use video_capture::{
    FrameSource, MediaConstraints, MediaDevices, MediaStream, VideoResolution,
};
