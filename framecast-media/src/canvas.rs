//! Offscreen drawing surface for frame snapshots

use crate::error::MediaResult;
use crate::tracks::VideoFrame;
use crate::video_capture::VideoResolution;
use image::imageops::{self, FilterType};
use image::RgbImage;

/// Fixed-size surface a video frame is drawn onto before encoding.
///
/// Drawing scales the frame to fill the whole surface, the same way drawing
/// a video element into a canvas of different size does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffscreenCanvas {
    pub width: u32,
    pub height: u32,
}

impl OffscreenCanvas {
    pub fn new(resolution: VideoResolution) -> Self {
        Self {
            width: resolution.width,
            height: resolution.height,
        }
    }

    pub fn resolution(&self) -> VideoResolution {
        VideoResolution::new(self.width, self.height)
    }

    /// Draw `frame` at `(0, 0)` stretched to the canvas size
    pub fn draw_frame(&self, frame: &VideoFrame) -> MediaResult<RgbImage> {
        let image = frame.to_image()?;
        if image.dimensions() == (self.width, self.height) {
            return Ok(image);
        }
        Ok(imageops::resize(
            &image,
            self.width,
            self.height,
            FilterType::Triangle,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_keeps_matching_frame() {
        let frame = VideoFrame::from_rgb(4, 2, vec![7; 24]).unwrap();
        let canvas = OffscreenCanvas::new(VideoResolution::new(4, 2));
        let image = canvas.draw_frame(&frame).unwrap();
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.as_raw(), &frame.data);
    }

    #[test]
    fn test_draw_scales_to_canvas() {
        let frame = VideoFrame::from_rgb(8, 6, vec![200; 8 * 6 * 3]).unwrap();
        let canvas = OffscreenCanvas::new(VideoResolution::new(4, 3));
        let image = canvas.draw_frame(&frame).unwrap();
        assert_eq!(image.dimensions(), (4, 3));
        assert!(image.pixels().all(|p| p.0 == [200, 200, 200]));
    }
}
