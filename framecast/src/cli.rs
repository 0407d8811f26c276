//! Command line arguments of the `framecast` binary

use crate::config::{FramecastConfig, Protocol, DEFAULT_URL};
use clap::{ArgAction, Parser, ValueEnum};
use framecast_media::{CaptureSource, MediaConstraints, VideoResolution, DEFAULT_JPEG_QUALITY};
use std::time::Duration;

/// Where frames come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Moving color bars
    TestPattern,
    /// System camera (needs the `camera` feature)
    Camera,
}

/// Capture frames and send one every interval to a socket peer
#[derive(Debug, Parser)]
#[command(name = "framecast", version)]
pub struct Args {
    /// Peer URL
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,

    /// Socket flavor
    #[arg(long, value_enum, default_value_t = Protocol::SocketIo)]
    pub protocol: Protocol,

    /// Session id sent to Channels consumers
    #[arg(long)]
    pub session_id: Option<String>,

    /// Emission interval in milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub interval_ms: u64,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    pub quality: u8,

    /// Frame source
    #[arg(long, value_enum, default_value_t = SourceKind::TestPattern)]
    pub source: SourceKind,

    /// Camera index for `--source camera`
    #[arg(long, default_value_t = 0)]
    pub camera_index: u32,

    /// Test pattern width
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Test pattern height
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Do not request an audio track
    #[arg(long)]
    pub no_audio: bool,

    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn to_config(&self) -> FramecastConfig {
        let source = match self.source {
            SourceKind::TestPattern => {
                CaptureSource::TestPattern(VideoResolution::new(self.width, self.height))
            }
            SourceKind::Camera => CaptureSource::Camera(self.camera_index),
        };

        FramecastConfig {
            url: self.url.clone(),
            protocol: self.protocol,
            session_id: self.session_id.clone(),
            emit_interval: Duration::from_millis(self.interval_ms),
            jpeg_quality: self.quality,
            constraints: MediaConstraints {
                audio: !self.no_audio,
                ..MediaConstraints::default()
            },
            source,
            ..FramecastConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_config() {
        let args = Args::try_parse_from(["framecast"]).unwrap();
        let config = args.to_config();

        assert_eq!(config.url, "ws://0.0.0.0:9000");
        assert_eq!(config.protocol, Protocol::SocketIo);
        assert_eq!(config.emit_interval, Duration::from_secs(10));
        assert_eq!(config.jpeg_quality, 92);
        assert_eq!(config.source, CaptureSource::TestPattern(VideoResolution::HD));
        assert!(config.constraints.audio);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_channels_flags() {
        let args = Args::try_parse_from([
            "framecast",
            "--protocol",
            "channels",
            "--url",
            "ws://localhost:8000/ws/socket_server/",
            "--session-id",
            "42",
            "--interval-ms",
            "500",
            "--no-audio",
            "-vv",
        ])
        .unwrap();
        let config = args.to_config();

        assert_eq!(config.protocol, Protocol::Channels);
        assert_eq!(config.session_id.as_deref(), Some("42"));
        assert_eq!(config.emit_interval, Duration::from_millis(500));
        assert!(!config.constraints.audio);
        assert_eq!(args.verbose, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_camera_source() {
        let args =
            Args::try_parse_from(["framecast", "--source", "camera", "--camera-index", "2"])
                .unwrap();
        assert_eq!(args.to_config().source, CaptureSource::Camera(2));
    }

    #[test]
    fn test_rejects_unknown_protocol() {
        assert!(Args::try_parse_from(["framecast", "--protocol", "udp"]).is_err());
    }
}
