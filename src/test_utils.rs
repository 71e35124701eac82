//! Sinks and helpers shared by unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HubConfig;
use crate::hub::{HubError, MessageSink};

/// Hub settings with short deadlines so failure paths finish quickly
pub fn fast_hub_config() -> HubConfig {
    HubConfig {
        write_timeout: Duration::from_millis(100),
        ping_interval: Duration::from_secs(60),
        idle_timeout: Duration::from_secs(120),
    }
}

#[derive(Default)]
struct SinkRecord {
    texts: Vec<String>,
    attempts: usize,
    pings: usize,
    closes: usize,
}

/// Shared view of what a test sink has seen
#[derive(Clone, Default)]
pub struct SinkLog(Arc<Mutex<SinkRecord>>);

impl SinkLog {
    pub fn texts(&self) -> Vec<String> {
        self.0.lock().texts.clone()
    }

    /// Text writes attempted, successful or not
    pub fn attempts(&self) -> usize {
        self.0.lock().attempts
    }

    pub fn ping_count(&self) -> usize {
        self.0.lock().pings
    }

    pub fn close_count(&self) -> usize {
        self.0.lock().closes
    }

    fn record_close(&self) {
        self.0.lock().closes += 1;
    }
}

/// Accepts every write, optionally after a delay
pub struct RecordingSink {
    log: SinkLog,
    delay: Option<Duration>,
}

impl RecordingSink {
    pub fn new() -> (Self, SinkLog) {
        let log = SinkLog::default();
        (
            Self {
                log: log.clone(),
                delay: None,
            },
            log,
        )
    }

    pub fn with_delay(delay: Duration) -> (Self, SinkLog) {
        let (mut sink, log) = Self::new();
        sink.delay = Some(delay);
        (sink, log)
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send_text(&mut self, text: &str) -> Result<(), HubError> {
        self.log.0.lock().attempts += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.log.0.lock().texts.push(text.to_string());
        Ok(())
    }

    async fn send_ping(&mut self) -> Result<(), HubError> {
        self.log.0.lock().pings += 1;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), HubError> {
        self.log.record_close();
        Ok(())
    }
}

/// Never completes a write, like a peer that stopped reading
pub struct BlockingSink {
    log: SinkLog,
}

impl BlockingSink {
    pub fn new() -> (Self, SinkLog) {
        let log = SinkLog::default();
        (Self { log: log.clone() }, log)
    }
}

#[async_trait]
impl MessageSink for BlockingSink {
    async fn send_text(&mut self, _text: &str) -> Result<(), HubError> {
        self.log.0.lock().attempts += 1;
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn send_ping(&mut self) -> Result<(), HubError> {
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), HubError> {
        self.log.record_close();
        Ok(())
    }
}

/// Fails every write immediately, like a reset socket
pub struct FailingSink {
    log: SinkLog,
}

impl FailingSink {
    pub fn new() -> (Self, SinkLog) {
        let log = SinkLog::default();
        (Self { log: log.clone() }, log)
    }
}

#[async_trait]
impl MessageSink for FailingSink {
    async fn send_text(&mut self, _text: &str) -> Result<(), HubError> {
        self.log.0.lock().attempts += 1;
        Err(HubError::Transport("connection reset".to_string()))
    }

    async fn send_ping(&mut self) -> Result<(), HubError> {
        Err(HubError::Transport("connection reset".to_string()))
    }

    async fn close(&mut self) -> Result<(), HubError> {
        self.log.record_close();
        Err(HubError::Transport("connection reset".to_string()))
    }
}

/// Never completes anything, close included, like a peer whose TCP window is
/// shut and that never acknowledges a close frame
pub struct UnresponsiveSink {
    log: SinkLog,
}

impl UnresponsiveSink {
    pub fn new() -> (Self, SinkLog) {
        let log = SinkLog::default();
        (Self { log: log.clone() }, log)
    }
}

#[async_trait]
impl MessageSink for UnresponsiveSink {
    async fn send_text(&mut self, _text: &str) -> Result<(), HubError> {
        self.log.0.lock().attempts += 1;
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn send_ping(&mut self) -> Result<(), HubError> {
        std::future::pending::<()>().await;
        Ok(())
    }

    /// Counts the attempt, then hangs
    async fn close(&mut self) -> Result<(), HubError> {
        self.log.record_close();
        std::future::pending::<()>().await;
        Ok(())
    }
}
