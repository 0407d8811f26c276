//! Periodic frame emission
//!
//! The [`FrameEmitter`] owns the media stream. Each tick it samples the
//! current frame, draws it on a canvas sized from the video track settings
//! (a missing width falls back to 640 and a missing height to 480),
//! encodes the canvas as JPEG and sends it as one `video_chunk` message.

use crate::config::{FramecastConfig, FALLBACK_RESOLUTION};
use crate::error::FramecastResult;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use framecast_media::{
    JpegEncoder, MediaConstraints, MediaDevices, MediaError, MediaResult, MediaStream,
    OffscreenCanvas, VideoResolution,
};
use framecast_signaling::{EventTransport, OutboundEvent};
use tracing::{debug, info, trace, warn};

/// Logged when a tick finds no stream to sample
pub const NO_STREAM_WARNING: &str = "No active video stream";

/// Whether a media stream is held
#[derive(Debug, Default)]
pub enum StreamState {
    /// No stream acquired yet, or released
    #[default]
    Uninitialized,
    /// Stream acquired and live
    Streaming(MediaStream),
}

/// Why a tick sent nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoStream,
}

/// Result of one emission tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// One frame went out
    Sent {
        /// Encoded payload size
        bytes: usize,
        /// Canvas size the frame was drawn at
        resolution: VideoResolution,
    },
    /// Nothing was sent
    Skipped(SkipReason),
}

/// Encoded frame ready to be sent
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    pub data: Bytes,
    pub resolution: VideoResolution,
}

/// Emission counters
#[derive(Debug, Clone, Default)]
pub struct EmitterStats {
    pub frames_emitted: u64,
    pub frames_skipped: u64,
    /// Ticks whose capture or encode step failed
    pub capture_failures: u64,
    pub bytes_sent: u64,
    pub last_emitted_at: Option<DateTime<Utc>>,
}

/// Captures, encodes and sends frames from the held media stream
#[derive(Debug)]
pub struct FrameEmitter {
    state: StreamState,
    encoder: JpegEncoder,
    fallback_resolution: VideoResolution,
    stats: EmitterStats,
}

impl Default for FrameEmitter {
    fn default() -> Self {
        Self::new(JpegEncoder::default())
    }
}

impl FrameEmitter {
    /// Emitter encoding with `encoder` and falling back to 640x480
    pub fn new(encoder: JpegEncoder) -> Self {
        Self {
            state: StreamState::Uninitialized,
            encoder,
            fallback_resolution: FALLBACK_RESOLUTION,
            stats: EmitterStats::default(),
        }
    }

    /// Build an emitter from the encoder settings of `config`
    pub fn from_config(config: &FramecastConfig) -> FramecastResult<Self> {
        let encoder = JpegEncoder::new(config.jpeg_quality)?;
        Ok(Self::new(encoder).with_fallback_resolution(config.fallback_resolution))
    }

    /// Canvas size to use when the track lacks width or height
    pub fn with_fallback_resolution(mut self, resolution: VideoResolution) -> Self {
        self.fallback_resolution = resolution;
        self
    }

    /// Acquire the media stream. Only one stream may be held at a time.
    pub fn acquire<D>(&mut self, devices: &mut D, constraints: &MediaConstraints) -> MediaResult<()>
    where
        D: MediaDevices + ?Sized,
    {
        if let StreamState::Streaming(stream) = &self.state {
            return Err(MediaError::StreamAlreadyAcquired {
                stream_id: stream.id().to_string(),
            });
        }

        debug!(
            backend = devices.name(),
            video = constraints.video,
            audio = constraints.audio,
            "Requesting media stream"
        );
        let stream = devices.get_user_media(constraints)?;
        info!(
            stream_id = stream.id(),
            video_tracks = stream.video_tracks().len(),
            audio_tracks = stream.audio_tracks().len(),
            "Media stream acquired"
        );
        self.state = StreamState::Streaming(stream);
        Ok(())
    }

    /// Stop the held stream and return to the uninitialized state
    pub fn release(&mut self) -> MediaResult<()> {
        match std::mem::take(&mut self.state) {
            StreamState::Streaming(mut stream) => {
                stream.stop()?;
                info!(stream_id = stream.id(), "Media stream released");
                Ok(())
            }
            StreamState::Uninitialized => Ok(()),
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.state, StreamState::Streaming(_))
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Canvas size the next frame will be drawn at, `None` without a stream.
    ///
    /// A missing or zero width or height is replaced on its own by the
    /// fallback dimension.
    pub fn capture_resolution(&self) -> Option<VideoResolution> {
        match &self.state {
            StreamState::Streaming(stream) => Some(match stream.first_video_track() {
                Some(track) => track.settings().resolution_or(self.fallback_resolution),
                None => self.fallback_resolution,
            }),
            StreamState::Uninitialized => None,
        }
    }

    /// Sample and encode the current frame, `None` without a stream
    pub fn prepare_frame(&mut self) -> MediaResult<Option<EncodedFrame>> {
        let resolution = match self.capture_resolution() {
            Some(resolution) => resolution,
            None => return Ok(None),
        };
        let stream = match &mut self.state {
            StreamState::Streaming(stream) => stream,
            StreamState::Uninitialized => return Ok(None),
        };

        debug!(%resolution, "Capturing frame");
        let frame = stream.grab_frame()?;
        let image = OffscreenCanvas::new(resolution).draw_frame(&frame)?;
        let data = self.encoder.encode(&image)?;
        debug!(bytes = data.len(), "Frame encoded");

        Ok(Some(EncodedFrame { data, resolution }))
    }

    /// Run one tick: capture, encode and send a `video_chunk`.
    ///
    /// Without a stream this logs a single warning and sends nothing.
    /// Capture and encode failures come back as [`FramecastError::Media`],
    /// send failures as [`FramecastError::Signaling`].
    ///
    /// [`FramecastError::Media`]: crate::FramecastError::Media
    /// [`FramecastError::Signaling`]: crate::FramecastError::Signaling
    pub async fn emit<T>(&mut self, transport: &mut T) -> FramecastResult<EmitOutcome>
    where
        T: EventTransport + ?Sized,
    {
        let frame = match self.prepare_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                warn!("{}", NO_STREAM_WARNING);
                self.stats.frames_skipped += 1;
                return Ok(EmitOutcome::Skipped(SkipReason::NoStream));
            }
            Err(e) => {
                self.stats.capture_failures += 1;
                return Err(e.into());
            }
        };

        let bytes = frame.data.len();
        let resolution = frame.resolution;
        trace!(payload = ?frame.data, "video_chunk payload");
        transport
            .emit(OutboundEvent::VideoChunk { frame: frame.data })
            .await?;

        self.stats.frames_emitted += 1;
        self.stats.bytes_sent += bytes as u64;
        self.stats.last_emitted_at = Some(Utc::now());
        info!(bytes, %resolution, "Sent video chunk");

        Ok(EmitOutcome::Sent { bytes, resolution })
    }

    pub fn stats(&self) -> &EmitterStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecast_media::SyntheticDevices;

    #[test]
    fn test_starts_uninitialized() {
        let emitter = FrameEmitter::default();
        assert!(!emitter.is_streaming());
        assert!(matches!(emitter.state(), StreamState::Uninitialized));
        assert_eq!(emitter.capture_resolution(), None);
    }

    #[test]
    fn test_prepare_without_stream() {
        let mut emitter = FrameEmitter::default();
        assert!(emitter.prepare_frame().unwrap().is_none());
    }

    #[test]
    fn test_release_returns_to_uninitialized() {
        let mut devices = SyntheticDevices::new(VideoResolution::VGA);
        let mut emitter = FrameEmitter::default();

        emitter
            .acquire(&mut devices, &MediaConstraints::default())
            .unwrap();
        assert!(emitter.is_streaming());

        emitter.release().unwrap();
        assert!(!emitter.is_streaming());
        // releasing twice is fine
        emitter.release().unwrap();
    }

    #[test]
    fn test_custom_fallback() {
        let mut devices = SyntheticDevices::new(VideoResolution::HD).without_settings();
        let mut emitter =
            FrameEmitter::default().with_fallback_resolution(VideoResolution::new(320, 240));
        emitter
            .acquire(&mut devices, &MediaConstraints::default())
            .unwrap();

        let frame = emitter.prepare_frame().unwrap().unwrap();
        assert_eq!(frame.resolution, VideoResolution::new(320, 240));
        assert!(!frame.data.is_empty());
    }
}
