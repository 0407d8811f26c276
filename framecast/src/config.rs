//! Configuration types and defaults

use crate::error::{FramecastError, FramecastResult};
use framecast_media::{CaptureSource, MediaConstraints, VideoResolution, DEFAULT_JPEG_QUALITY};
use std::time::Duration;
use url::Url;

/// Peer the client connects to when no URL is given
pub const DEFAULT_URL: &str = "ws://0.0.0.0:9000";

/// Time between two frame emissions
pub const DEFAULT_EMIT_INTERVAL: Duration = Duration::from_secs(10);

/// Canvas size used when the video track does not report its dimensions
pub const FALLBACK_RESOLUTION: VideoResolution = VideoResolution::VGA;

/// Socket flavor spoken to the peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Protocol {
    /// Socket.IO v5 over the Engine.IO WebSocket transport
    #[default]
    SocketIo,
    /// Plain JSON messages over WebSocket, as Django Channels consumers speak
    Channels,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::SocketIo => write!(f, "socket-io"),
            Protocol::Channels => write!(f, "channels"),
        }
    }
}

/// Runtime configuration of a Framecast session
#[derive(Debug, Clone)]
pub struct FramecastConfig {
    /// Peer URL (`ws`, `wss`, `http` or `https`)
    pub url: String,
    /// Socket flavor
    pub protocol: Protocol,
    /// Session id passed to Channels consumers
    pub session_id: Option<String>,
    /// Time between emissions; the first one comes a full interval after
    /// the stream starts
    pub emit_interval: Duration,
    /// Canvas size when the track settings lack width or height
    pub fallback_resolution: VideoResolution,
    /// JPEG quality, 1..=100
    pub jpeg_quality: u8,
    /// What to ask the devices for
    pub constraints: MediaConstraints,
    /// Where frames come from
    pub source: CaptureSource,
}

impl Default for FramecastConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            protocol: Protocol::SocketIo,
            session_id: None,
            emit_interval: DEFAULT_EMIT_INTERVAL,
            fallback_resolution: FALLBACK_RESOLUTION,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            constraints: MediaConstraints::default(),
            source: CaptureSource::TestPattern(VideoResolution::HD),
        }
    }
}

impl FramecastConfig {
    /// Validate configuration
    pub fn validate(&self) -> FramecastResult<()> {
        let url = Url::parse(&self.url)
            .map_err(|e| FramecastError::config(format!("invalid url {}: {}", self.url, e)))?;
        if !matches!(url.scheme(), "ws" | "wss" | "http" | "https") {
            return Err(FramecastError::config(format!(
                "unsupported url scheme: {}",
                url.scheme()
            )));
        }

        if self.emit_interval.is_zero() {
            return Err(FramecastError::config("emit interval must be positive"));
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(FramecastError::config(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }

        if self.fallback_resolution.width == 0 || self.fallback_resolution.height == 0 {
            return Err(FramecastError::config("fallback resolution must be non-zero"));
        }

        if !self.constraints.video {
            return Err(FramecastError::config("video must be requested"));
        }
        self.constraints.validate()?;

        if let CaptureSource::TestPattern(resolution) = &self.source {
            if resolution.width == 0 || resolution.height == 0 {
                return Err(FramecastError::config("test pattern resolution must be non-zero"));
            }
        }

        if self.protocol == Protocol::Channels && self.session_id.is_none() {
            return Err(FramecastError::config(
                "the channels protocol requires a session id",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FramecastConfig::default();
        assert_eq!(config.url, "ws://0.0.0.0:9000");
        assert_eq!(config.emit_interval, Duration::from_secs(10));
        assert_eq!(config.fallback_resolution, VideoResolution::new(640, 480));
        assert_eq!(config.jpeg_quality, 92);
        assert!(config.constraints.video && config.constraints.audio);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let config = FramecastConfig {
            url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FramecastConfig {
            url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FramecastConfig {
            emit_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FramecastConfig {
            jpeg_quality: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut config = FramecastConfig::default();
        config.constraints.video = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_channels_requires_session_id() {
        let mut config = FramecastConfig {
            protocol: Protocol::Channels,
            url: "ws://localhost:8000/ws/socket_server/".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FramecastError::Config { .. })
        ));

        config.session_id = Some("42".to_string());
        assert!(config.validate().is_ok());
    }
}
