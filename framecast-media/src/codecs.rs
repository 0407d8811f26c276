//! Still-image codec used for frame emission

use crate::error::{MediaError, MediaResult};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
use image::RgbImage;

/// Default JPEG quality, matching what browsers use for `image/jpeg` exports
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Codec information
#[derive(Debug, Clone)]
pub struct CodecInfo {
    /// Codec name
    pub name: String,
    /// MIME type
    pub mime_type: String,
}

/// JPEG encoder for canvas snapshots
#[derive(Debug, Clone)]
pub struct JpegEncoder {
    quality: u8,
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl JpegEncoder {
    /// Create an encoder, quality must be in `1..=100`
    pub fn new(quality: u8) -> MediaResult<Self> {
        if !(1..=100).contains(&quality) {
            return Err(MediaError::InvalidConfiguration {
                message: format!("JPEG quality must be between 1 and 100, got {}", quality),
            });
        }
        Ok(Self { quality })
    }

    /// Configured quality
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Get codec information
    pub fn info(&self) -> CodecInfo {
        CodecInfo {
            name: "JPEG".to_string(),
            mime_type: "image/jpeg".to_string(),
        }
    }

    /// Encode an RGB image
    pub fn encode(&self, image: &RgbImage) -> MediaResult<Bytes> {
        if image.width() == 0 || image.height() == 0 {
            return Err(MediaError::EncodingFailed {
                codec: "JPEG".to_string(),
                reason: "image has no pixels".to_string(),
            });
        }

        let mut out = Vec::with_capacity(image.as_raw().len() / 8);
        let mut encoder = ImageJpegEncoder::new_with_quality(&mut out, self.quality);
        encoder
            .encode_image(image)
            .map_err(|e| MediaError::EncodingFailed {
                codec: "JPEG".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Bytes::from(out))
    }
}
