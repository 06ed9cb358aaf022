//! Stream utilities for consumer-facing sample delivery

mod throttle;

pub use throttle::{Throttle, ThrottleExt};
