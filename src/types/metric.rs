//! The six performance metrics carried by every sample

use serde::{Deserialize, Serialize};

/// One of the six performance metrics reported by the measurement source.
///
/// The variant order is the canonical metric order used everywhere a sample
/// is decomposed into per-metric coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Interest,
    Engagement,
    Stress,
    Relaxation,
    Excitement,
    Focus,
}

impl Metric {
    /// All metrics in canonical order.
    pub const ALL: [Metric; 6] = [
        Metric::Interest,
        Metric::Engagement,
        Metric::Stress,
        Metric::Relaxation,
        Metric::Excitement,
        Metric::Focus,
    ];

    /// Wire/display name of the metric, matching the frame field names.
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Interest => "interest",
            Metric::Engagement => "engagement",
            Metric::Stress => "stress",
            Metric::Relaxation => "relaxation",
            Metric::Excitement => "excitement",
            Metric::Focus => "focus",
        }
    }

    /// Position of the metric in [`Metric::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_matches_indices() {
        for (position, metric) in Metric::ALL.iter().enumerate() {
            assert_eq!(metric.index(), position);
        }
    }

    #[test]
    fn wire_names_are_lowercase_field_names() {
        assert_eq!(Metric::Interest.as_str(), "interest");
        assert_eq!(Metric::Focus.as_str(), "focus");
        for metric in Metric::ALL {
            assert_eq!(metric.to_string(), metric.as_str());
        }
    }
}
