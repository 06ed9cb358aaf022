//! Streaming distribution pipeline for biometric performance metrics.
//!
//! Mindstream receives framed six-metric samples (interest, engagement,
//! stress, relaxation, excitement, focus) from a measurement source, fans
//! them out to any number of independent consumers, and keeps a bounded,
//! time-windowed history per metric for display.
//!
//! # Features
//!
//! - **Live streaming**: line-delimited JSON over TCP
//! - **Session replay**: paced playback of `.jsonl` recordings
//! - **Windowed history**: per-metric series with a runtime-adjustable window
//! - **Fan-out isolation**: a failing consumer never breaks the others
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use mindstream::{Metric, Mindstream, RenderRate};
//!
//! #[tokio::main]
//! async fn main() -> mindstream::Result<()> {
//!     let connection = Mindstream::connect("127.0.0.1:1337").await?;
//!     let mut samples = Box::pin(connection.samples(RenderRate::Max(10)));
//!
//!     while let Some(sample) = samples.next().await {
//!         println!("focus: {:.1}", sample.focus);
//!         let window = connection.series_snapshot(Metric::Focus);
//!         println!("{} points in window", window.len());
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod codec;
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Stream-based pipeline architecture
pub mod connection;
pub mod consumer;
pub mod distributor;
pub mod endpoint;
pub mod series;
pub mod stream;
pub mod transport;
pub mod transports;

// Core exports
pub use error::*;
pub use types::*;

// Pipeline exports
pub use connection::Connection;
pub use consumer::{Consumer, SampleConsumer, SampleStream, SeriesConsumer};
pub use distributor::{DEFAULT_WINDOW_SECS, Distributor};
pub use endpoint::{Endpoint, EndpointHandle, EndpointState};
pub use series::MetricSeries;
pub use transport::Transport;
pub use transports::{ReplayTransport, TcpTransport};

use transports::DEFAULT_REPLAY_HZ;

/// Nominal cadence of a live headset feed, used to normalize render rates.
const NOMINAL_SOURCE_HZ: f64 = 5.0;

/// Unified entry point for metric pipeline connections.
///
/// The factory wires a transport session, a connection endpoint, and a
/// fresh distributor together: one distributor per connection, passed by
/// reference to anyone who needs to publish or consume.
///
/// # Examples
///
/// ## Live source
/// ```rust,no_run
/// use mindstream::Mindstream;
///
/// #[tokio::main]
/// async fn main() -> mindstream::Result<()> {
///     let connection = Mindstream::connect("127.0.0.1:1337").await?;
///     // Use connection...
///     Ok(())
/// }
/// ```
///
/// ## Recorded session
/// ```rust,no_run
/// use mindstream::Mindstream;
///
/// #[tokio::main]
/// async fn main() -> mindstream::Result<()> {
///     let connection = Mindstream::open("session.jsonl").await?;
///     // Use connection...
///     Ok(())
/// }
/// ```
pub struct Mindstream;

impl Mindstream {
    /// Connect to a live metric source at `host:port`.
    ///
    /// # Errors
    ///
    /// Returns an error if the peer is unreachable or the connect deadline
    /// elapses.
    pub async fn connect(addr: &str) -> Result<Connection> {
        let transport = TcpTransport::connect(addr).await?;
        Connection::spawn(transport, NOMINAL_SOURCE_HZ)
    }

    /// Open a recorded session for replay at the default cadence.
    ///
    /// The recording plays back as if it were live: same endpoint states,
    /// same distributor behavior, same consumer API.
    ///
    /// # Errors
    ///
    /// Returns an error if the recording does not exist or is unreadable.
    pub async fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Connection> {
        Self::open_at(path, DEFAULT_REPLAY_HZ).await
    }

    /// Open a recorded session, pacing playback at `rate_hz` frames per
    /// second.
    pub async fn open_at<P: AsRef<std::path::Path>>(path: P, rate_hz: f64) -> Result<Connection> {
        let transport = ReplayTransport::open(path, rate_hz).await?;
        let source_hz = transport.rate_hz();
        Connection::spawn(transport, source_hz)
    }
}
