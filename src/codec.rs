//! Wire codec for performance metric frames.
//!
//! The wire protocol carries one message type: a JSON object with a
//! `timestamp` and one numeric field per metric, one frame per line.
//! Encoding and decoding are symmetric, so anything this module emits can be
//! decoded back into an identical [`Sample`].
//!
//! Both functions are pure and stateless; they are safe to call repeatedly
//! and from any number of threads.

use crate::types::Sample;
use crate::{MetricError, Result};

/// Context string used in malformed-frame errors from this codec.
const FRAME_CONTEXT: &str = "performance metric frame";

/// Decode a raw wire frame into a [`Sample`].
///
/// Fails with [`MetricError::MalformedFrame`] when the frame is not a JSON
/// object of the expected seven-field shape: a missing field, a wrong type,
/// or a value that is not a finite number. A failed decode never produces a
/// partially populated sample.
pub fn decode(frame: &str) -> Result<Sample> {
    let sample: Sample = serde_json::from_str(frame.trim())
        .map_err(|err| MetricError::malformed_frame(FRAME_CONTEXT, err.to_string()))?;

    // serde_json maps out-of-range literals like 1e999 to infinity rather
    // than rejecting them, so finiteness is checked separately.
    if !sample.is_finite() {
        return Err(MetricError::malformed_frame(FRAME_CONTEXT, "non-finite numeric value"));
    }

    Ok(sample)
}

/// Encode a [`Sample`] as one wire frame (no trailing newline).
///
/// Fails with [`MetricError::MalformedFrame`] if the sample contains a
/// non-finite value, which JSON cannot represent.
pub fn encode(sample: &Sample) -> Result<String> {
    if !sample.is_finite() {
        return Err(MetricError::malformed_frame(FRAME_CONTEXT, "non-finite numeric value"));
    }

    serde_json::to_string(sample)
        .map_err(|err| MetricError::malformed_frame(FRAME_CONTEXT, err.to_string()))
}
