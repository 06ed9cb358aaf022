//! Transport trait for wire sessions

use crate::Result;

/// Trait for transport sessions that carry metric frames.
///
/// Transports abstract over different sources (live TCP, recorded replay)
/// and handle their own timing internally. They are the only components in
/// the pipeline allowed to block on I/O; reconnection, if any, is the
/// responsibility of whoever constructs them.
#[async_trait::async_trait]
pub trait Transport: Send + 'static {
    /// Receive the next raw frame.
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - a frame arrived
    /// - `Ok(None)` - the peer closed the session cleanly
    /// - `Err(e)` - the session failed; terminal for this transport
    async fn recv(&mut self) -> Result<Option<String>>;

    /// Send one line to the peer (used for the liveness probe).
    async fn send(&mut self, line: &str) -> Result<()>;

    /// Human-readable description of the session for logging.
    fn describe(&self) -> String;
}
