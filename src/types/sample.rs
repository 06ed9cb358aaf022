//! Sample and coordinate types for the stream-based architecture

use serde::{Deserialize, Serialize};

use super::Metric;

/// One timestamped six-metric measurement.
///
/// This is the fundamental data unit that flows through the system. Samples
/// are produced by the wire codec and never mutated afterwards; everything
/// downstream (coordinates, windowed series) is derived from them.
///
/// The timestamp is in seconds of source time and is non-decreasing across
/// samples from a single session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: f64,
    pub interest: f64,
    pub engagement: f64,
    pub stress: f64,
    pub relaxation: f64,
    pub excitement: f64,
    pub focus: f64,
}

impl Sample {
    /// Value of a single metric in this sample.
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Interest => self.interest,
            Metric::Engagement => self.engagement,
            Metric::Stress => self.stress,
            Metric::Relaxation => self.relaxation,
            Metric::Excitement => self.excitement,
            Metric::Focus => self.focus,
        }
    }

    /// Derive the coordinate for one metric, preserving the sample timestamp.
    pub fn coordinate(&self, metric: Metric) -> Coordinate {
        Coordinate { timestamp: self.timestamp, value: self.value(metric) }
    }

    /// Whether the timestamp and every metric value are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.timestamp.is_finite() && Metric::ALL.iter().all(|m| self.value(*m).is_finite())
    }
}

/// A single metric's point: one sample projected onto one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub timestamp: f64,
    pub value: f64,
}

impl Coordinate {
    pub fn new(timestamp: f64, value: f64) -> Self {
        Self { timestamp, value }
    }
}
