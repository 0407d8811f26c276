//! Media stream acquisition
//!
//! A [`MediaDevices`] implementation plays the role of the platform device
//! API: given [`MediaConstraints`] it opens the camera (and optionally the
//! microphone) and hands back a [`MediaStream`]. The stream owns its tracks
//! and the [`FrameSource`] used to sample the current video frame.

use crate::error::{MediaError, MediaResult};
use crate::tracks::{AudioTrack, VideoFrame, VideoTrack};
use tracing::{debug, info};

/// Video resolution information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VideoResolution {
    pub width: u32,
    pub height: u32,
}

impl VideoResolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const HD: Self = Self::new(1280, 720);
    pub const VGA: Self = Self::new(640, 480);
}

impl Default for VideoResolution {
    fn default() -> Self {
        Self::VGA
    }
}

impl std::fmt::Display for VideoResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// What to request when acquiring a media stream
#[derive(Debug, Clone)]
pub struct MediaConstraints {
    /// Request a video track
    pub video: bool,
    /// Request an audio track
    pub audio: bool,
    /// Preferred capture resolution, backends may ignore it
    pub ideal_resolution: Option<VideoResolution>,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            video: true,
            audio: true,
            ideal_resolution: None,
        }
    }
}

impl MediaConstraints {
    /// Validate constraints
    pub fn validate(&self) -> MediaResult<()> {
        if !self.video && !self.audio {
            return Err(MediaError::UnsupportedConstraints {
                reason: "at least one of video or audio must be requested".to_string(),
            });
        }

        if let Some(resolution) = self.ideal_resolution {
            if resolution.width == 0 || resolution.height == 0 {
                return Err(MediaError::InvalidConfiguration {
                    message: "Invalid resolution".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Source of the current video frame of a live stream
pub trait FrameSource {
    /// Sample the frame currently shown by the stream
    fn grab_frame(&mut self) -> MediaResult<VideoFrame>;

    /// Release the underlying device
    fn stop(&mut self) -> MediaResult<()> {
        Ok(())
    }
}

/// Platform device access, the equivalent of `getUserMedia`
pub trait MediaDevices {
    /// Backend name used in logs
    fn name(&self) -> &str;

    /// Open the devices matching `constraints` and return a live stream
    fn get_user_media(&mut self, constraints: &MediaConstraints) -> MediaResult<MediaStream>;
}

impl<D: MediaDevices + ?Sized> MediaDevices for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get_user_media(&mut self, constraints: &MediaConstraints) -> MediaResult<MediaStream> {
        (**self).get_user_media(constraints)
    }
}

/// A live audio/video capture handle
pub struct MediaStream {
    id: String,
    video_tracks: Vec<VideoTrack>,
    audio_tracks: Vec<AudioTrack>,
    source: Box<dyn FrameSource>,
    active: bool,
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("video_tracks", &self.video_tracks)
            .field("audio_tracks", &self.audio_tracks)
            .field("active", &self.active)
            .finish()
    }
}

impl MediaStream {
    /// Assemble a stream from its tracks and frame source
    pub fn new(
        video_tracks: Vec<VideoTrack>,
        audio_tracks: Vec<AudioTrack>,
        source: Box<dyn FrameSource>,
    ) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        debug!(
            stream_id = %id,
            video_tracks = video_tracks.len(),
            audio_tracks = audio_tracks.len(),
            "Media stream created"
        );

        Self {
            id,
            video_tracks,
            audio_tracks,
            source,
            active: true,
        }
    }

    /// Stream ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// All video tracks
    pub fn video_tracks(&self) -> &[VideoTrack] {
        &self.video_tracks
    }

    /// All audio tracks
    pub fn audio_tracks(&self) -> &[AudioTrack] {
        &self.audio_tracks
    }

    /// The first video track, the one frames are sampled from
    pub fn first_video_track(&self) -> Option<&VideoTrack> {
        self.video_tracks.first()
    }

    /// Whether the stream still holds its devices
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Sample the current video frame
    pub fn grab_frame(&mut self) -> MediaResult<VideoFrame> {
        if !self.active || self.video_tracks.is_empty() {
            return Err(MediaError::CaptureNotActive);
        }
        self.source.grab_frame()
    }

    /// Stop every track and release the devices
    pub fn stop(&mut self) -> MediaResult<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.source.stop()?;
        info!(stream_id = %self.id, "Media stream stopped");
        Ok(())
    }
}

impl Drop for MediaStream {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.stop() {
                tracing::warn!(stream_id = %self.id, "Failed to stop media stream: {}", e);
            }
        }
    }
}
