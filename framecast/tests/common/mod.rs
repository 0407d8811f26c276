//! Shared test doubles: an in-memory transport and a log recorder

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use framecast::{EventTransport, InboundEvent, OutboundEvent, SignalingError};
use framecast_signaling::SignalingResult;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Frame handed to the transport
#[derive(Debug, Clone)]
pub struct SentFrame {
    pub at: Instant,
    pub frame: Bytes,
}

/// What the mock transport saw
#[derive(Debug, Default)]
pub struct Recorder {
    sent: Mutex<Vec<SentFrame>>,
    closed: AtomicBool,
}

impl Recorder {
    pub fn sent(&self) -> Vec<SentFrame> {
        self.sent.lock().clone()
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Transport fed from a channel; ends when every sender is dropped
pub struct MockTransport {
    inbound: mpsc::UnboundedReceiver<InboundEvent>,
    recorder: Arc<Recorder>,
}

pub fn mock_transport() -> (
    MockTransport,
    mpsc::UnboundedSender<InboundEvent>,
    Arc<Recorder>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let recorder = Arc::new(Recorder::default());
    let transport = MockTransport {
        inbound: rx,
        recorder: recorder.clone(),
    };
    (transport, tx, recorder)
}

#[async_trait]
impl EventTransport for MockTransport {
    async fn emit(&mut self, event: OutboundEvent) -> SignalingResult<()> {
        match event {
            OutboundEvent::VideoChunk { frame } => self.recorder.sent.lock().push(SentFrame {
                at: Instant::now(),
                frame,
            }),
        }
        Ok(())
    }

    async fn next_event(&mut self) -> Option<SignalingResult<InboundEvent>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self) -> SignalingResult<()> {
        self.recorder.closed.store(true, Ordering::SeqCst);
        self.inbound.close();
        Ok(())
    }
}

/// Transport whose sends always fail
pub struct FailingTransport {
    inbound: mpsc::UnboundedReceiver<InboundEvent>,
}

pub fn failing_transport() -> (FailingTransport, mpsc::UnboundedSender<InboundEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (FailingTransport { inbound: rx }, tx)
}

#[async_trait]
impl EventTransport for FailingTransport {
    async fn emit(&mut self, _event: OutboundEvent) -> SignalingResult<()> {
        Err(SignalingError::Closed)
    }

    async fn next_event(&mut self) -> Option<SignalingResult<InboundEvent>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self) -> SignalingResult<()> {
        Ok(())
    }
}

/// Records the level and message of every event
#[derive(Debug, Clone, Default)]
pub struct LogRecorder {
    records: Arc<Mutex<Vec<(Level, String)>>>,
}

impl LogRecorder {
    pub fn count(&self, level: Level) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for LogRecorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.records
            .lock()
            .push((*event.metadata().level(), visitor.0));
    }
}

/// Capture logs of the current thread until the guard drops
pub fn capture_logs() -> (LogRecorder, tracing::subscriber::DefaultGuard) {
    let recorder = LogRecorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (recorder, guard)
}
