//! Media error types and handling
//!
//! This module defines the error types used by stream acquisition, frame
//! capture and JPEG encoding, with enough context to log a failure and decide
//! whether a later attempt could succeed.

use thiserror::Error;

/// Main error type for media operations
#[derive(Error, Debug)]
pub enum MediaError {
    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// Encoding operation failed
    #[error("Encoding failed: {codec} - {reason}")]
    EncodingFailed {
        /// Codec name
        codec: String,
        /// Failure reason
        reason: String,
    },

    /// Invalid frame data error
    #[error("Invalid frame data: expected {expected} bytes, got {actual}")]
    InvalidFrameData {
        /// Expected data size
        expected: usize,
        /// Actual data size
        actual: usize,
    },

    /// Device enumeration failed
    #[error("Device enumeration failed: {reason}")]
    DeviceEnumerationFailed {
        /// Failure reason
        reason: String,
    },

    /// The user or platform refused access to the capture devices
    #[error("Permission denied: {operation}")]
    PermissionDenied {
        /// Operation that was denied
        operation: String,
    },

    /// A media stream is already held
    #[error("Media stream {stream_id} is already acquired")]
    StreamAlreadyAcquired {
        /// Id of the stream currently held
        stream_id: String,
    },

    /// Capture not active error
    #[error("Capture not active")]
    CaptureNotActive,

    /// Constraints asked for nothing the device can provide
    #[error("Unsupported constraints: {reason}")]
    UnsupportedConstraints {
        /// Why the constraints cannot be satisfied
        reason: String,
    },

    /// Backend-specific capture failure
    #[error("Capture failed: {backend} - {message}")]
    CaptureFailed {
        /// Backend name
        backend: String,
        /// Error message
        message: String,
    },
}

/// Result type alias for media operations
pub type MediaResult<T> = Result<T, MediaError>;

impl MediaError {
    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            MediaError::CaptureFailed { .. } => true,
            MediaError::InvalidFrameData { .. } => true,
            MediaError::EncodingFailed { .. } => false,
            MediaError::PermissionDenied { .. } => false,
            MediaError::UnsupportedConstraints { .. } => false,
            _ => false,
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            MediaError::InvalidConfiguration { .. } => ErrorCategory::Configuration,
            MediaError::EncodingFailed { .. } => ErrorCategory::Codec,
            MediaError::InvalidFrameData { .. } => ErrorCategory::Data,
            MediaError::DeviceEnumerationFailed { .. } => ErrorCategory::Device,
            MediaError::PermissionDenied { .. } => ErrorCategory::Permission,
            MediaError::StreamAlreadyAcquired { .. } => ErrorCategory::State,
            MediaError::CaptureNotActive => ErrorCategory::State,
            MediaError::UnsupportedConstraints { .. } => ErrorCategory::Configuration,
            MediaError::CaptureFailed { .. } => ErrorCategory::Device,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Configuration and parameter errors
    Configuration,
    /// Codec-related errors
    Codec,
    /// Data validation errors
    Data,
    /// Device and hardware errors
    Device,
    /// Access to devices was refused
    Permission,
    /// State management errors
    State,
}
