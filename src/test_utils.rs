//! Test utilities: sample builders and a scripted transport
//!
//! Shared by the in-module unit tests, the integration suite, and the
//! benchmarks (hence the `benchmark` feature gate alongside `test`).

#![cfg(any(test, feature = "benchmark"))]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::transport::Transport;
use crate::types::Sample;
use crate::{MetricError, Result};

/// A sample with every metric set to the same value.
pub fn flat_sample(timestamp: f64, value: f64) -> Sample {
    Sample {
        timestamp,
        interest: value,
        engagement: value,
        stress: value,
        relaxation: value,
        excitement: value,
        focus: value,
    }
}

/// An encoded wire frame for [`flat_sample`].
pub fn sample_frame(timestamp: f64, value: f64) -> String {
    crate::codec::encode(&flat_sample(timestamp, value)).expect("finite sample must encode")
}

/// One step in a scripted session.
pub enum ScriptedEvent {
    /// Deliver this raw frame.
    Frame(String),
    /// Stall the session for this long before the next event.
    Wait(Duration),
    /// Fail the session with a transport error.
    Fail(String),
}

/// Deterministic in-memory transport driven by a list of events.
///
/// When the script runs out, the session reports a clean peer close.
/// Everything sent to the peer is recorded in a shared log.
pub struct ScriptedTransport {
    events: VecDeque<ScriptedEvent>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn new(events: Vec<ScriptedEvent>) -> Self {
        Self { events: events.into(), sent: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Shared handle to the log of lines sent to the peer.
    pub fn sent_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn recv(&mut self) -> Result<Option<String>> {
        loop {
            match self.events.pop_front() {
                Some(ScriptedEvent::Frame(frame)) => return Ok(Some(frame)),
                Some(ScriptedEvent::Wait(duration)) => tokio::time::sleep(duration).await,
                Some(ScriptedEvent::Fail(reason)) => return Err(MetricError::transport(reason)),
                None => return Ok(None),
            }
        }
    }

    async fn send(&mut self, line: &str) -> Result<()> {
        self.sent.lock().unwrap().push(line.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "scripted://test".to_string()
    }
}
