//! Track abstractions and raw frame types

use crate::error::{MediaError, MediaResult};
use crate::video_capture::VideoResolution;
use image::RgbImage;

/// Raw video frame as produced by a frame source
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Packed RGB24 pixel data, row major
    pub data: Vec<u8>,
    /// Capture timestamp in milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl VideoFrame {
    /// Wrap packed RGB24 data, checking its length against the dimensions
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> MediaResult<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(MediaError::InvalidFrameData {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
        })
    }

    /// Frame dimensions
    pub fn resolution(&self) -> VideoResolution {
        VideoResolution::new(self.width, self.height)
    }

    /// Borrow the frame as an image buffer
    pub fn to_image(&self) -> MediaResult<RgbImage> {
        let expected = self.width as usize * self.height as usize * 3;
        RgbImage::from_raw(self.width, self.height, self.data.clone()).ok_or(
            MediaError::InvalidFrameData {
                expected,
                actual: self.data.len(),
            },
        )
    }
}

/// Settings a video track reports once it is live.
///
/// Every field is optional: some platforms never report dimensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSettings {
    /// Frame width in pixels
    pub width: Option<u32>,
    /// Frame height in pixels
    pub height: Option<u32>,
    /// Frames per second
    pub frame_rate: Option<f64>,
    /// Device the track is bound to
    pub device_id: Option<String>,
}

impl TrackSettings {
    /// Reported resolution, if both dimensions are present and non-zero
    pub fn resolution(&self) -> Option<VideoResolution> {
        match (self.width, self.height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => {
                Some(VideoResolution::new(width, height))
            }
            _ => None,
        }
    }

    /// Reported resolution with each missing or zero dimension taken from
    /// `fallback` on its own
    pub fn resolution_or(&self, fallback: VideoResolution) -> VideoResolution {
        VideoResolution::new(
            self.width.filter(|w| *w > 0).unwrap_or(fallback.width),
            self.height.filter(|h| *h > 0).unwrap_or(fallback.height),
        )
    }
}

/// Video track representation
#[derive(Debug, Clone)]
pub struct VideoTrack {
    /// Track ID
    pub id: String,
    /// Human-readable device label
    pub label: String,
    settings: TrackSettings,
}

impl VideoTrack {
    /// Create new video track
    pub fn new(label: impl Into<String>, settings: TrackSettings) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.into(),
            settings,
        }
    }

    /// Get track ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current track settings
    pub fn settings(&self) -> &TrackSettings {
        &self.settings
    }
}

/// Audio track representation
#[derive(Debug, Clone)]
pub struct AudioTrack {
    /// Track ID
    pub id: String,
    /// Human-readable device label
    pub label: String,
}

impl AudioTrack {
    /// Create new audio track
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.into(),
        }
    }

    /// Get track ID
    pub fn id(&self) -> &str {
        &self.id
    }
}
