//! Display cadence control for sample streams

use serde::{Deserialize, Serialize};

/// Delivery cadence for a consumer-facing sample stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RenderRate {
    /// Every sample, at the cadence the source produces them.
    Native,

    /// Coalesced to at most this many updates per second.
    /// Requesting a rate at or above the source cadence falls back to Native.
    Max(u32),
}

impl RenderRate {
    /// Normalize the rate against the source cadence.
    /// Returns the effective rate to use.
    pub fn normalize(self, source_hz: f64) -> Self {
        match self {
            RenderRate::Native => RenderRate::Native,
            RenderRate::Max(hz) if hz as f64 >= source_hz => RenderRate::Native,
            RenderRate::Max(hz) => RenderRate::Max(hz),
        }
    }

    /// Interval between emitted samples, if the stream needs coalescing.
    pub fn throttle_interval(self, source_hz: f64) -> Option<std::time::Duration> {
        match self.normalize(source_hz) {
            RenderRate::Native => None,
            RenderRate::Max(hz) => Some(std::time::Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}
