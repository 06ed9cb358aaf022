//! Error types for the metric distribution pipeline.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context for debugging. The taxonomy follows the pipeline layers:
//!
//! - **Malformed frames**: wire data that cannot be decoded into a sample;
//!   recovered locally by dropping the frame
//! - **Transport errors**: session-level failures; terminal for the endpoint
//! - **Invalid window**: rejected reconfiguration of the display window
//! - **File errors**: problems opening or reading a replay recording
//! - **Timeouts**: connect deadlines that elapsed
//!
//! ## Recovery
//!
//! Errors classify their own retryability so outer layers can decide whether
//! reconnecting is worthwhile:
//!
//! ```rust
//! use mindstream::MetricError;
//!
//! let error = MetricError::transport("peer reset the session");
//! assert!(error.is_retryable());
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T, E = MetricError> = std::result::Result<T, E>;

/// Main error type for the metric pipeline.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MetricError {
    /// A wire frame could not be decoded into a sample.
    ///
    /// The offending frame is dropped and the pipeline continues; this error
    /// never tears down the connection.
    #[error("malformed frame in {context}: {details}")]
    MalformedFrame { context: String, details: String },

    /// The transport session failed.
    ///
    /// Terminal for the endpoint that observed it; reconnection is the
    /// responsibility of whoever owns the connection.
    #[error("transport error: {reason}")]
    Transport {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A window duration that is not a positive, finite number of seconds.
    ///
    /// Rejected synchronously; the existing window and all buffered series
    /// are left untouched.
    #[error("invalid window duration: {seconds} seconds (must be positive and finite)")]
    InvalidWindow { seconds: f64 },

    /// A replay recording could not be opened or read.
    #[error("recording error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An operation did not complete within its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },
}

impl MetricError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            MetricError::Transport { .. } => true,
            MetricError::Timeout { .. } => true,
            MetricError::MalformedFrame { .. } => false,
            MetricError::InvalidWindow { .. } => false,
            MetricError::File { .. } => false,
        }
    }

    /// Helper constructor for malformed frame errors.
    pub fn malformed_frame(context: impl Into<String>, details: impl Into<String>) -> Self {
        MetricError::MalformedFrame { context: context.into(), details: details.into() }
    }

    /// Helper constructor for transport errors.
    pub fn transport(reason: impl Into<String>) -> Self {
        MetricError::Transport { reason: reason.into(), source: None }
    }

    /// Helper constructor for transport errors with an underlying cause.
    pub fn transport_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        MetricError::Transport { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for invalid window durations.
    pub fn invalid_window(seconds: f64) -> Self {
        MetricError::InvalidWindow { seconds }
    }

    /// Helper constructor for recording errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        MetricError::File { path, source }
    }
}

impl From<std::io::Error> for MetricError {
    fn from(err: std::io::Error) -> Self {
        MetricError::Transport { reason: err.kind().to_string(), source: Some(Box::new(err)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[cfg(test)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn error_messages_contain_their_context(
                context in "[a-zA-Z ]+",
                details in "[a-zA-Z0-9 ]+",
                reason in "[a-zA-Z ]+",
                seconds in -1000.0f64..0.0f64
            ) {
                let frame_err = MetricError::malformed_frame(context.clone(), details.clone());
                let frame_msg = frame_err.to_string();
                prop_assert!(frame_msg.contains(&context));
                prop_assert!(frame_msg.contains(&details));

                let transport_err = MetricError::transport(reason.clone());
                prop_assert!(transport_err.to_string().contains(&reason));

                let window_err = MetricError::invalid_window(seconds);
                prop_assert!(window_err.to_string().contains(&seconds.to_string()));
            }

            #[test]
            fn source_chaining_preserves_the_base_cause(base_message in "[a-zA-Z ]+") {
                let io_err = std::io::Error::other(base_message.clone());
                let err = MetricError::transport_with_source("session dropped", Box::new(io_err));

                let source = std::error::Error::source(&err)
                    .expect("transport error with source must expose it");
                prop_assert!(source.to_string().contains(&base_message));
            }
        }
    }

    #[test]
    fn retryability_classification() {
        assert!(MetricError::transport("reset").is_retryable());
        assert!(MetricError::Timeout { duration: Duration::from_secs(5) }.is_retryable());

        assert!(!MetricError::malformed_frame("frame", "missing field").is_retryable());
        assert!(!MetricError::invalid_window(-5.0).is_retryable());
        assert!(
            !MetricError::file_error(
                PathBuf::from("/session.jsonl"),
                std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            )
            .is_retryable()
        );
    }

    #[test]
    fn error_traits_validation() {
        // Compile-time check: MetricError must be Send + Sync + 'static
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<MetricError>();

        let error = MetricError::transport("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn io_conversion_becomes_transport() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let converted: MetricError = io_err.into();

        match converted {
            MetricError::Transport { source, .. } => {
                let source = source.expect("converted io error should carry its source");
                assert_eq!(source.to_string(), "reset by peer");
            }
            other => panic!("expected Transport variant, got {other:?}"),
        }
    }
}
