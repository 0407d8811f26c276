//! Capture backends
//!
//! [`SyntheticDevices`] renders a moving test pattern and is always
//! available. [`CameraDevices`] opens a real camera through nokhwa and is
//! compiled in with the `camera` feature.

#[cfg(feature = "camera")]
pub mod camera;
pub mod synthetic;

#[cfg(feature = "camera")]
pub use camera::CameraDevices;
pub use synthetic::{SyntheticDevices, SyntheticSource};

use crate::error::MediaError;
use crate::video_capture::MediaDevices;

/// Backend selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSource {
    /// Moving color bars at the given resolution
    TestPattern(crate::VideoResolution),
    /// System camera by index
    Camera(u32),
}

/// Get the devices backend for the requested source
pub fn open_devices(source: &CaptureSource) -> Result<Box<dyn MediaDevices>, MediaError> {
    match source {
        CaptureSource::TestPattern(resolution) => {
            Ok(Box::new(SyntheticDevices::new(*resolution)))
        }
        #[cfg(feature = "camera")]
        CaptureSource::Camera(index) => Ok(Box::new(CameraDevices::new(*index))),
        #[cfg(not(feature = "camera"))]
        CaptureSource::Camera(_) => Err(MediaError::DeviceEnumerationFailed {
            reason: "camera capture requires the `camera` feature".to_string(),
        }),
    }
}
