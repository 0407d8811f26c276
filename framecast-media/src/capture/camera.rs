//! Camera capture through nokhwa
//!
//! Opens a system camera by index and decodes each grabbed buffer to RGB24.
//! Audio is not captured by this backend; an audio request is logged and
//! the stream carries video only.

use crate::error::{MediaError, MediaResult};
use crate::tracks::{TrackSettings, VideoFrame, VideoTrack};
use crate::video_capture::{FrameSource, MediaConstraints, MediaDevices, MediaStream};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::{Camera, NokhwaError};
use tracing::{debug, info};

fn capture_error(err: NokhwaError) -> MediaError {
    match err {
        NokhwaError::OpenDeviceError(device, reason) => MediaError::PermissionDenied {
            operation: format!("open camera {}: {}", device, reason),
        },
        other => MediaError::CaptureFailed {
            backend: "nokhwa".to_string(),
            message: other.to_string(),
        },
    }
}

/// Frame source backed by an open nokhwa camera
pub struct CameraSource {
    camera: Camera,
}

impl FrameSource for CameraSource {
    fn grab_frame(&mut self) -> MediaResult<VideoFrame> {
        let buffer = self.camera.frame().map_err(capture_error)?;
        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(capture_error)?;
        let (width, height) = (image.width(), image.height());
        VideoFrame::from_rgb(width, height, image.into_raw())
    }

    fn stop(&mut self) -> MediaResult<()> {
        self.camera.stop_stream().map_err(capture_error)
    }
}

/// Device backend for a system camera
#[derive(Debug, Clone)]
pub struct CameraDevices {
    index: u32,
}

impl CameraDevices {
    /// Camera at `index` in the platform's device list
    pub fn new(index: u32) -> Self {
        Self { index }
    }
}

impl MediaDevices for CameraDevices {
    fn name(&self) -> &str {
        "nokhwa"
    }

    fn get_user_media(&mut self, constraints: &MediaConstraints) -> MediaResult<MediaStream> {
        constraints.validate()?;
        if !constraints.video {
            return Err(MediaError::UnsupportedConstraints {
                reason: "camera backend cannot capture audio alone".to_string(),
            });
        }
        if constraints.audio {
            debug!("Audio requested but not captured by the camera backend");
        }

        let requested = match constraints.ideal_resolution {
            Some(ideal) => RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
                CameraFormat::new(
                    Resolution::new(ideal.width, ideal.height),
                    FrameFormat::MJPEG,
                    30,
                ),
            )),
            None => RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate),
        };

        let mut camera =
            Camera::new(CameraIndex::Index(self.index), requested).map_err(capture_error)?;
        camera.open_stream().map_err(capture_error)?;

        let resolution = camera.resolution();
        let label = camera.info().human_name();
        let settings = TrackSettings {
            width: Some(resolution.width()),
            height: Some(resolution.height()),
            frame_rate: Some(camera.frame_rate() as f64),
            device_id: Some(self.index.to_string()),
        };
        info!(
            "Opened camera {} ({}x{})",
            label,
            resolution.width(),
            resolution.height()
        );

        Ok(MediaStream::new(
            vec![VideoTrack::new(label, settings)],
            Vec::new(),
            Box::new(CameraSource { camera }),
        ))
    }
}
