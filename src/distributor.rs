//! The distribution hub: windowed buffering plus consumer fan-out.
//!
//! One [`Distributor`] exists per running client. It is constructed by the
//! connection factory and handed to whoever needs to publish or consume:
//! explicit dependency injection, no global instance.
//!
//! Every operation is safe to call from any execution context. A single
//! critical section guards the six metric series, the window duration, and
//! the consumer set; for `publish` it spans append + prune + fan-out, which
//! is what gives consumers at-most-once delivery per publish and a sample
//! order identical to publish order.
//!
//! Consumer callbacks run inside that critical section and must not call
//! back into the distributor; everything a callback needs is passed in as an
//! argument. Consumers that cannot keep the prompt-return contract should
//! use [`Distributor::subscribe`] and drain their channel at their own pace.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::consumer::{ChannelConsumer, Consumer, SampleStream};
use crate::series::MetricSeries;
use crate::types::{Coordinate, Metric, Sample};
use crate::{MetricError, Result};

/// Display window applied until the user adjusts it.
pub const DEFAULT_WINDOW_SECS: f64 = 10.0;

/// Shared fan-out and buffering hub for decoded samples.
pub struct Distributor {
    inner: Mutex<Inner>,
}

struct Inner {
    window_secs: f64,
    series: [MetricSeries; 6],
    consumers: Vec<Consumer>,
    /// Largest timestamp seen so far; the "now" all pruning is measured
    /// against. Source time, not wall clock.
    latest_timestamp: Option<f64>,
    closed: bool,
    published: u64,
}

impl Distributor {
    /// Create a distributor with the given display window in seconds.
    ///
    /// Fails with [`MetricError::InvalidWindow`] unless the window is a
    /// positive, finite number.
    pub fn new(window_secs: f64) -> Result<Self> {
        validate_window(window_secs)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                window_secs,
                series: std::array::from_fn(|_| MetricSeries::new()),
                consumers: Vec::new(),
                latest_timestamp: None,
                closed: false,
                published: 0,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Callbacks cannot leave the critical section by panic (they are
        // caught below), so a poisoned lock only means a prior panic in an
        // unrelated invariant-free spot; the data is still consistent.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Publish one decoded sample.
    ///
    /// Derives six coordinates, appends one to each metric series, prunes
    /// expired entries, then notifies every registered consumer exactly
    /// once. Publishing to a closed distributor is a logged no-op.
    pub fn publish(&self, sample: &Sample) {
        let mut inner = self.lock();
        if inner.closed {
            debug!(timestamp = sample.timestamp, "publish after close ignored");
            return;
        }

        let now = match inner.latest_timestamp {
            Some(latest) => latest.max(sample.timestamp),
            None => sample.timestamp,
        };

        let window = inner.window_secs;
        for metric in Metric::ALL {
            let series = &mut inner.series[metric.index()];
            series.append(sample.coordinate(metric));
            series.prune(now, window);
        }
        inner.latest_timestamp = Some(now);
        inner.published += 1;
        trace!(timestamp = sample.timestamp, publishes = inner.published, "sample buffered");

        // Snapshot the windows once per publish, only if someone wants them.
        let windows: Option<[Vec<Coordinate>; 6]> =
            if inner.consumers.iter().any(|c| matches!(c, Consumer::Series(_))) {
                Some(std::array::from_fn(|i| inner.series[i].snapshot()))
            } else {
                None
            };

        for consumer in &inner.consumers {
            let outcome = match consumer {
                Consumer::Samples(c) => catch_unwind(AssertUnwindSafe(|| c.on_sample(sample))),
                Consumer::Series(c) => catch_unwind(AssertUnwindSafe(|| {
                    let Some(windows) = &windows else { return Ok(()) };
                    for metric in Metric::ALL {
                        c.on_series(metric, &windows[metric.index()])?;
                    }
                    Ok(())
                })),
            };

            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(kind = consumer.kind(), error = %err, "consumer callback failed");
                }
                Err(_) => {
                    warn!(kind = consumer.kind(), "consumer callback panicked");
                }
            }
        }
    }

    /// Change the display window, immediately expiring entries older than
    /// the new value. Previously pruned data is never re-added.
    ///
    /// Fails with [`MetricError::InvalidWindow`] and changes nothing unless
    /// the window is a positive, finite number.
    pub fn set_window_duration(&self, seconds: f64) -> Result<()> {
        validate_window(seconds)?;

        let mut inner = self.lock();
        let previous = inner.window_secs;
        inner.window_secs = seconds;
        if let Some(now) = inner.latest_timestamp {
            let mut expired = 0;
            for series in &mut inner.series {
                expired += series.prune(now, seconds);
            }
            debug!(previous, seconds, expired, "display window changed");
        } else {
            debug!(previous, seconds, "display window changed on empty history");
        }
        Ok(())
    }

    /// Current display window in seconds.
    pub fn window_duration(&self) -> f64 {
        self.lock().window_secs
    }

    /// Register a consumer. Registering the same consumer twice has no
    /// additional effect.
    pub fn register_consumer(&self, consumer: Consumer) {
        let mut inner = self.lock();
        if inner.consumers.iter().any(|c| c.identity() == consumer.identity()) {
            debug!(?consumer, "consumer already registered");
            return;
        }
        debug!(?consumer, "consumer registered");
        inner.consumers.push(consumer);
    }

    /// Unregister a consumer. Unregistering an unknown consumer is a no-op.
    pub fn unregister_consumer(&self, consumer: &Consumer) {
        let mut inner = self.lock();
        let before = inner.consumers.len();
        inner.consumers.retain(|c| c.identity() != consumer.identity());
        if inner.consumers.len() < before {
            debug!(?consumer, "consumer unregistered");
        }
    }

    /// Number of currently registered consumers.
    pub fn consumer_count(&self) -> usize {
        self.lock().consumers.len()
    }

    /// Contents of one metric's window as of call time, oldest first.
    ///
    /// The returned vector is an independent copy; later publishes and
    /// window changes do not mutate it.
    pub fn series_snapshot(&self, metric: Metric) -> Vec<Coordinate> {
        self.lock().series[metric.index()].snapshot()
    }

    /// Subscribe to published samples through a bounded channel.
    ///
    /// The hand-off never blocks the publisher: a subscriber that falls
    /// `capacity` samples behind starts losing newer samples (with a
    /// warning) until it drains. Dropping the stream unregisters it.
    pub fn subscribe(self: Arc<Self>, capacity: usize) -> SampleStream {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let consumer = Consumer::Samples(Arc::new(ChannelConsumer::new(tx)));
        self.register_consumer(consumer.clone());
        SampleStream::new(rx, consumer, Arc::downgrade(&self))
    }

    /// Stop accepting publishes. Buffered history stays readable and
    /// registered consumers may still take snapshots.
    pub fn close(&self) {
        let mut inner = self.lock();
        if !inner.closed {
            inner.closed = true;
            info!(publishes = inner.published, "distributor closed");
        }
    }

    /// Whether the distributor has been closed.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

fn validate_window(seconds: f64) -> Result<()> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(MetricError::invalid_window(seconds));
    }
    Ok(())
}
