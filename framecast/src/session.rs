//! Socket session driving the frame emitter
//!
//! A [`Session`] runs on a single task. It waits on the socket and on the
//! emission timer with `select!`, so ticks never overlap inbound handling:
//! a slow encode pushes the next tick back instead of running beside it.
//!
//! Inbound events go through an [`EventDispatcher`]. The default handlers
//! log what the peer sends and start the video stream on `Connected`.
//! The timer only exists once a stream was acquired, and its first tick
//! comes one full interval later.

use crate::config::FramecastConfig;
use crate::emitter::{EmitterStats, FrameEmitter};
use crate::error::{FramecastError, FramecastResult};
use framecast_media::{MediaConstraints, MediaDevices, MediaError};
use framecast_signaling::{EventDispatcher, EventKind, EventTransport, InboundEvent};
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

/// What the session loop should do after a handler ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Nothing beyond the handler itself
    Continue,
    /// Acquire the media stream and start the emission timer
    StartStream,
}

/// Counters reported when a session ends
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub events_received: u64,
    pub socket_errors: u64,
    pub ticks: u64,
    pub emitter: EmitterStats,
}

/// One connection to the peer plus the emitter it feeds
pub struct Session<T, D> {
    transport: T,
    devices: D,
    emitter: FrameEmitter,
    constraints: MediaConstraints,
    emit_interval: Duration,
    dispatcher: EventDispatcher<Reaction>,
}

impl<T, D> std::fmt::Debug for Session<T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("emitter", &self.emitter)
            .field("emit_interval", &self.emit_interval)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

fn default_dispatcher() -> EventDispatcher<Reaction> {
    let mut dispatcher = EventDispatcher::new();

    dispatcher.on(EventKind::Connected, |event| {
        if let InboundEvent::Connected { sid } = event {
            info!(sid = sid.as_deref().unwrap_or("-"), "connected to server");
        }
        Reaction::StartStream
    });
    dispatcher.on(EventKind::ConnectionEstablished, |event| {
        if let InboundEvent::ConnectionEstablished { message } = event {
            info!("Server says: {}", message);
        }
        Reaction::Continue
    });
    dispatcher.on(EventKind::Disconnected, |event| {
        if let InboundEvent::Disconnected { reason } = event {
            info!(reason = %reason, "disconnected");
        }
        Reaction::Continue
    });
    dispatcher.on(EventKind::VideoChunk, |event| {
        if let InboundEvent::VideoChunk { data, attachments } = event {
            info!(attachments = attachments.len(), "video_chunk: {}", data);
        }
        Reaction::Continue
    });
    dispatcher.on(EventKind::Message, |event| {
        if let InboundEvent::Message { name, data } = event {
            debug!("{}: {}", name, data);
        }
        Reaction::Continue
    });

    dispatcher
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

impl<T, D> Session<T, D>
where
    T: EventTransport,
    D: MediaDevices,
{
    /// Create a session over a connected transport
    pub fn new(transport: T, devices: D, config: &FramecastConfig) -> FramecastResult<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            devices,
            emitter: FrameEmitter::from_config(config)?,
            constraints: config.constraints.clone(),
            emit_interval: config.emit_interval,
            dispatcher: default_dispatcher(),
        })
    }

    /// Replace the handler for `kind`
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> &mut Self
    where
        F: FnMut(&InboundEvent) -> Reaction + Send + 'static,
    {
        self.dispatcher.on(kind, handler);
        self
    }

    pub fn emitter(&self) -> &FrameEmitter {
        &self.emitter
    }

    pub fn devices(&self) -> &D {
        &self.devices
    }

    /// Run until the peer closes the connection
    pub async fn run(self) -> FramecastResult<SessionSummary> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Run until the peer closes the connection or `shutdown` completes.
    ///
    /// A failed send ends the session with an error; a failed capture only
    /// skips the tick.
    pub async fn run_until<F>(mut self, shutdown: F) -> FramecastResult<SessionSummary>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticker: Option<Interval> = None;
        let mut summary = SessionSummary::default();

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    if let Err(e) = self.transport.close().await {
                        debug!("Error closing connection: {}", e);
                    }
                    break Ok(());
                }
                event = self.transport.next_event() => match event {
                    Some(Ok(event)) => {
                        summary.events_received += 1;
                        if self.dispatcher.dispatch(&event) == Some(Reaction::StartStream)
                            && self.start_stream()
                        {
                            ticker = Some(self.new_ticker());
                        }
                    }
                    Some(Err(e)) => {
                        summary.socket_errors += 1;
                        error!("Socket error: {}", e);
                    }
                    None => {
                        info!("Connection closed");
                        break Ok(());
                    }
                },
                _ = next_tick(&mut ticker) => {
                    summary.ticks += 1;
                    match self.emitter.emit(&mut self.transport).await {
                        Ok(outcome) => trace!(?outcome, "Tick finished"),
                        Err(FramecastError::Media(e)) => {
                            error!("Failed to capture frame: {}", e);
                        }
                        Err(e) => {
                            error!("Failed to send frame: {}", e);
                            break Err(e);
                        }
                    }
                }
            }
        };

        if let Err(e) = self.emitter.release() {
            warn!("Failed to release media stream: {}", e);
        }
        summary.emitter = self.emitter.stats().clone();
        info!(
            frames = summary.emitter.frames_emitted,
            bytes = summary.emitter.bytes_sent,
            "Session ended"
        );

        result.map(|_| summary)
    }

    /// Acquire the stream, returning whether a new one was started
    fn start_stream(&mut self) -> bool {
        match self.emitter.acquire(&mut self.devices, &self.constraints) {
            Ok(()) => true,
            Err(MediaError::StreamAlreadyAcquired { stream_id }) => {
                debug!(%stream_id, "Video stream already running");
                false
            }
            Err(e) => {
                error!("Error accessing media devices: {}", e);
                false
            }
        }
    }

    fn new_ticker(&self) -> Interval {
        let mut ticker = interval_at(Instant::now() + self.emit_interval, self.emit_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_ms = self.emit_interval.as_millis() as u64,
            "Frame emission started"
        );
        ticker
    }
}
