//! Core types for performance metric data representation.
//!
//! The type system mirrors the shape of the wire protocol:
//! - [`Sample`] is a complete timestamped measurement of all six metrics
//! - [`Metric`] names one metric and fixes the canonical metric order
//! - [`Coordinate`] is a sample projected onto a single metric, the unit the
//!   windowed series and graph consumers work with
//! - [`RenderRate`] controls how fast a consumer-facing stream emits
//!
//! Samples are immutable once decoded; six coordinates are derived per
//! sample, one per metric, all preserving the sample's timestamp.

mod metric;
mod render_rate;
mod sample;

pub use metric::Metric;
pub use render_rate::RenderRate;
pub use sample::{Coordinate, Sample};
