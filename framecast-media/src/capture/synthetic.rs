//! Synthetic capture backend
//!
//! Produces color bars that scroll one step per grabbed frame, so
//! consecutive frames differ. Used by the CLI's `test-pattern` source and by
//! tests that need a stream without hardware.

use crate::error::{MediaError, MediaResult};
use crate::tracks::{AudioTrack, TrackSettings, VideoFrame, VideoTrack};
use crate::video_capture::{
    FrameSource, MediaConstraints, MediaDevices, MediaStream, VideoResolution,
};
use tracing::{debug, info};

const BARS: [[u8; 3]; 7] = [
    [192, 192, 192],
    [192, 192, 0],
    [0, 192, 192],
    [0, 192, 0],
    [192, 0, 192],
    [192, 0, 0],
    [0, 0, 192],
];

/// Test-pattern frame source
#[derive(Debug)]
pub struct SyntheticSource {
    resolution: VideoResolution,
    frame_index: u64,
}

impl SyntheticSource {
    /// Create a source rendering at `resolution`
    pub fn new(resolution: VideoResolution) -> Self {
        Self {
            resolution,
            frame_index: 0,
        }
    }

    fn render(&self) -> Vec<u8> {
        let VideoResolution { width, height } = self.resolution;
        let bar_width = (width as usize / BARS.len()).max(1);
        let shift = self.frame_index as usize * 8;
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);

        for y in 0..height as usize {
            for x in 0..width as usize {
                let bar = ((x + shift) / bar_width) % BARS.len();
                let [r, g, b] = BARS[bar];
                // vertical gradient keeps the encoder honest about detail
                let shade = (y * 63 / height.max(1) as usize) as u8;
                data.extend_from_slice(&[
                    r.saturating_add(shade),
                    g.saturating_add(shade),
                    b.saturating_add(shade),
                ]);
            }
        }
        data
    }
}

impl FrameSource for SyntheticSource {
    fn grab_frame(&mut self) -> MediaResult<VideoFrame> {
        let frame = VideoFrame::from_rgb(
            self.resolution.width,
            self.resolution.height,
            self.render(),
        )?;
        self.frame_index += 1;
        Ok(frame)
    }
}

/// Device backend that yields [`SyntheticSource`] streams
#[derive(Debug, Clone)]
pub struct SyntheticDevices {
    resolution: VideoResolution,
    settings: Option<TrackSettings>,
    deny_permission: bool,
    acquisitions: u32,
}

impl SyntheticDevices {
    /// Devices producing frames at `resolution`
    pub fn new(resolution: VideoResolution) -> Self {
        Self {
            resolution,
            settings: None,
            deny_permission: false,
            acquisitions: 0,
        }
    }

    /// Leave width and height out of the track settings
    pub fn without_settings(self) -> Self {
        self.reporting(TrackSettings::default())
    }

    /// Report `settings` on the video track instead of the real ones
    pub fn reporting(mut self, settings: TrackSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Refuse every acquisition, as a user dismissing the permission prompt
    pub fn denying_permission(mut self) -> Self {
        self.deny_permission = true;
        self
    }

    /// Number of successful acquisitions so far
    pub fn acquisitions(&self) -> u32 {
        self.acquisitions
    }
}

impl MediaDevices for SyntheticDevices {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn get_user_media(&mut self, constraints: &MediaConstraints) -> MediaResult<MediaStream> {
        constraints.validate()?;

        if self.deny_permission {
            return Err(MediaError::PermissionDenied {
                operation: "access camera and microphone".to_string(),
            });
        }

        let resolution = constraints.ideal_resolution.unwrap_or(self.resolution);
        let settings = self.settings.clone().unwrap_or_else(|| TrackSettings {
            width: Some(resolution.width),
            height: Some(resolution.height),
            frame_rate: Some(30.0),
            device_id: Some("synthetic-0".to_string()),
        });

        let video_tracks = if constraints.video {
            vec![VideoTrack::new("Synthetic Camera", settings)]
        } else {
            Vec::new()
        };
        let audio_tracks = if constraints.audio {
            vec![AudioTrack::new("Synthetic Microphone")]
        } else {
            Vec::new()
        };

        self.acquisitions += 1;
        debug!(%resolution, "Synthetic source opened");
        info!(
            "Acquired synthetic stream ({} video, {} audio)",
            video_tracks.len(),
            audio_tracks.len()
        );

        Ok(MediaStream::new(
            video_tracks,
            audio_tracks,
            Box::new(SyntheticSource::new(resolution)),
        ))
    }
}
