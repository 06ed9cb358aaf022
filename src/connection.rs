//! User-facing connection to a metric source

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use crate::Result;
use crate::distributor::{DEFAULT_WINDOW_SECS, Distributor};
use crate::endpoint::{Endpoint, EndpointHandle, EndpointState};
use crate::stream::ThrottleExt;
use crate::transport::Transport;
use crate::types::{Coordinate, Metric, RenderRate, Sample};

/// Samples buffered per subscriber before a lagging reader starts losing
/// newer ones.
const SUBSCRIBE_CAPACITY: usize = 64;

/// A running pipeline: one endpoint feeding one distributor.
///
/// Dropping the connection closes the session. The distributor keeps its
/// buffered history, so snapshots taken through an [`Arc`] obtained from
/// [`Connection::distributor`] outlive the connection itself.
pub struct Connection {
    distributor: Arc<Distributor>,
    handle: EndpointHandle,
    source_hz: f64,
}

impl Connection {
    /// Wire a fresh distributor to the given transport and start streaming.
    pub(crate) fn spawn<T>(transport: T, source_hz: f64) -> Result<Self>
    where
        T: Transport,
    {
        let distributor = Arc::new(Distributor::new(DEFAULT_WINDOW_SECS)?);
        let handle = Endpoint::spawn(transport, Arc::clone(&distributor));
        Ok(Self { distributor, handle, source_hz })
    }

    /// The distribution hub behind this connection.
    ///
    /// Use it to register callback consumers or adjust the display window.
    pub fn distributor(&self) -> &Arc<Distributor> {
        &self.distributor
    }

    /// Current endpoint state.
    pub fn state(&self) -> EndpointState {
        self.handle.state()
    }

    /// Watch receiver for endpoint state transitions.
    pub fn state_changes(&self) -> watch::Receiver<EndpointState> {
        self.handle.state_changes()
    }

    /// Endpoint state transitions as a stream.
    ///
    /// Yields the current state immediately, then every transition, so a
    /// status indicator can subscribe at any point in the session lifetime.
    pub fn state_stream(&self) -> impl Stream<Item = EndpointState> + 'static {
        WatchStream::new(self.handle.state_changes())
    }

    /// Wait until the session ends and return the terminal state.
    pub async fn wait_terminal(&self) -> EndpointState {
        self.handle.wait_terminal().await
    }

    /// Subscribe to decoded samples at the requested display cadence.
    pub fn samples(&self, rate: RenderRate) -> impl Stream<Item = Sample> + 'static {
        let stream = Arc::clone(&self.distributor).subscribe(SUBSCRIBE_CAPACITY);
        match rate.throttle_interval(self.source_hz) {
            None => stream.boxed(),
            Some(period) => stream.throttle(period).boxed(),
        }
    }

    /// Contents of one metric's display window as of call time.
    pub fn series_snapshot(&self, metric: Metric) -> Vec<Coordinate> {
        self.distributor.series_snapshot(metric)
    }

    /// Change the display window (seconds); see
    /// [`Distributor::set_window_duration`].
    pub fn set_window_duration(&self, seconds: f64) -> Result<()> {
        self.distributor.set_window_duration(seconds)
    }

    /// Current display window in seconds.
    pub fn window_duration(&self) -> f64 {
        self.distributor.window_duration()
    }

    /// Cadence of the underlying source in samples per second.
    pub fn source_hz(&self) -> f64 {
        self.source_hz
    }

    /// Close the session. Idempotent.
    pub fn close(&self) {
        self.handle.close();
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        debug!("dropping connection");
        self.handle.close();
    }
}
