//! Consumer capabilities for the distribution hub.
//!
//! A consumer declares, by construction, which of two delivery shapes it
//! wants: every decoded sample, or the refreshed per-metric window after
//! each publish. The distributor dispatches on the tag and assumes nothing
//! else about consumer internals.
//!
//! Callbacks run on the publishing context and must return promptly; a
//! consumer that needs to block (rendering, I/O) should subscribe through
//! [`Distributor::subscribe`](crate::distributor::Distributor::subscribe)
//! instead, which hands samples over through a channel and lets the
//! subscriber drain them at its own pace.

use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tracing::warn;

use crate::distributor::Distributor;
use crate::types::{Coordinate, Metric, Sample};

/// A consumer that wants every sample as it is published.
pub trait SampleConsumer: Send + Sync {
    /// Called once per publish. Errors are logged and isolated; they never
    /// affect delivery to other consumers.
    fn on_sample(&self, sample: &Sample) -> anyhow::Result<()>;
}

/// A consumer that wants the refreshed window contents after each publish.
pub trait SeriesConsumer: Send + Sync {
    /// Called once per metric per publish with the current window, oldest
    /// coordinate first.
    fn on_series(&self, metric: Metric, series: &[Coordinate]) -> anyhow::Result<()>;
}

/// A registered consumer capability.
///
/// Registration is identity-based: registering the same consumer value twice
/// is a no-op, and unregistration takes the same handle that was registered.
#[derive(Clone)]
pub enum Consumer {
    /// Deliver every sample.
    Samples(Arc<dyn SampleConsumer>),
    /// Deliver refreshed per-metric windows.
    Series(Arc<dyn SeriesConsumer>),
}

impl Consumer {
    /// Stable identity of the underlying consumer allocation.
    pub(crate) fn identity(&self) -> usize {
        match self {
            Consumer::Samples(c) => Arc::as_ptr(c) as *const () as usize,
            Consumer::Series(c) => Arc::as_ptr(c) as *const () as usize,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Consumer::Samples(_) => "samples",
            Consumer::Series(_) => "series",
        }
    }
}

impl std::fmt::Debug for Consumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consumer")
            .field("kind", &self.kind())
            .field("identity", &self.identity())
            .finish()
    }
}

/// Channel-backed sample consumer used by [`Distributor::subscribe`].
///
/// The hand-off is non-blocking: if the subscriber falls behind and the
/// channel fills up, new samples are dropped for this subscriber (delivery
/// is at-most-once, never duplicated) and a warning is logged.
pub(crate) struct ChannelConsumer {
    tx: mpsc::Sender<Sample>,
}

impl ChannelConsumer {
    pub(crate) fn new(tx: mpsc::Sender<Sample>) -> Self {
        Self { tx }
    }
}

impl SampleConsumer for ChannelConsumer {
    fn on_sample(&self, sample: &Sample) -> anyhow::Result<()> {
        match self.tx.try_send(*sample) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(timestamp = sample.timestamp, "subscriber lagging, sample dropped");
                Ok(())
            }
            // Receiver dropped; unregistration is racing this publish.
            Err(mpsc::error::TrySendError::Closed(_)) => Ok(()),
        }
    }
}

/// Stream of published samples for one subscriber.
///
/// Returned by [`Distributor::subscribe`]. Dropping the stream unregisters
/// the underlying consumer from the distributor.
pub struct SampleStream {
    rx: mpsc::Receiver<Sample>,
    consumer: Consumer,
    distributor: Weak<Distributor>,
}

impl SampleStream {
    pub(crate) fn new(
        rx: mpsc::Receiver<Sample>,
        consumer: Consumer,
        distributor: Weak<Distributor>,
    ) -> Self {
        Self { rx, consumer, distributor }
    }
}

impl Stream for SampleStream {
    type Item = Sample;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for SampleStream {
    fn drop(&mut self) {
        if let Some(distributor) = self.distributor.upgrade() {
            distributor.unregister_consumer(&self.consumer);
        }
    }
}
