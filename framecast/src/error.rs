//! Error types for the Framecast facade

use framecast_media::MediaError;
use framecast_signaling::SignalingError;
use thiserror::Error;

/// Errors surfaced by the emitter, the session and the binary
#[derive(Error, Debug)]
pub enum FramecastError {
    /// Capture, canvas or encoder failure
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Socket failure
    #[error("Signaling error: {0}")]
    Signaling(#[from] SignalingError),

    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    Config {
        /// What is wrong with it
        message: String,
    },

    /// Process-wide setup failed
    #[error("Initialization failed: {reason}")]
    Initialization {
        /// Failure reason
        reason: String,
    },
}

impl FramecastError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the session can keep running after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            FramecastError::Media(e) => e.is_recoverable(),
            FramecastError::Signaling(_) => false,
            FramecastError::Config { .. } => false,
            FramecastError::Initialization { .. } => false,
        }
    }
}

/// Result type alias for Framecast operations
pub type FramecastResult<T> = Result<T, FramecastError>;
