//! Time-windowed history for a single metric.
//!
//! A [`MetricSeries`] holds the coordinates of one metric inside the display
//! window. Samples from a single session arrive in non-decreasing timestamp
//! order, so expired entries are always a contiguous prefix and pruning only
//! ever advances from the front: O(k) in the number of expired entries,
//! never a full scan.
//!
//! ## Window boundary
//!
//! An entry is retained iff its age is strictly less than the window:
//! `timestamp > now - window`. An entry exactly `window` seconds old is
//! dropped. "Now" is source time, supplied by the caller as the largest
//! timestamp seen so far.

use std::collections::VecDeque;

use crate::types::Coordinate;

/// Bounded, time-windowed ordered history of one metric's coordinates.
#[derive(Debug, Default, Clone)]
pub struct MetricSeries {
    points: VecDeque<Coordinate>,
}

impl MetricSeries {
    pub fn new() -> Self {
        Self { points: VecDeque::new() }
    }

    /// Append a coordinate at the tail.
    ///
    /// Callers must append in non-decreasing timestamp order; the windowing
    /// invariants rely on it.
    pub fn append(&mut self, coordinate: Coordinate) {
        self.points.push_back(coordinate);
    }

    /// Drop the expired prefix: every entry with `timestamp <= now - window`.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self, now: f64, window_secs: f64) -> usize {
        let cutoff = now - window_secs;
        let mut removed = 0;
        while let Some(front) = self.points.front() {
            if front.timestamp > cutoff {
                break;
            }
            self.points.pop_front();
            removed += 1;
        }
        removed
    }

    /// Timestamp of the newest entry, if any.
    pub fn latest_timestamp(&self) -> Option<f64> {
        self.points.back().map(|c| c.timestamp)
    }

    /// Current window contents, oldest first, as an independent copy.
    pub fn snapshot(&self) -> Vec<Coordinate> {
        self.points.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
