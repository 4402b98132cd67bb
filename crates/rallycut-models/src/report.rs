//! The segmentation engine's output contract.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{HitPoint, Rally};

/// Why synthetic segments were produced instead of detected ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    /// Too few motion samples to threshold
    DegenerateSignal { samples: usize },
    /// The boundary detector found no rallies
    EmptyDetection,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::DegenerateSignal { samples } => {
                write!(f, "degenerate motion signal ({} samples)", samples)
            }
            FallbackReason::EmptyDetection => f.write_str("no rallies detected"),
        }
    }
}

impl FallbackReason {
    /// Short label for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::DegenerateSignal { .. } => "degenerate_signal",
            FallbackReason::EmptyDetection => "empty_detection",
        }
    }
}

/// Adaptive thresholds derived from the smoothed motion series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ThresholdSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub active: f64,
    pub idle: f64,
}

/// A rally together with its estimated hit points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentedRally {
    #[serde(flatten)]
    pub rally: Rally,
    pub hit_points: Vec<HitPoint>,
}

/// Result of one segmentation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentationReport {
    /// Source description (usually the video path)
    pub source: String,
    /// Frame rate used for all time conversions
    pub fps: f64,
    /// Frames available for segmentation (clipped on truncation)
    pub frame_count: u64,
    pub width: u32,
    pub height: u32,
    /// Duration in seconds derived from `frame_count / fps`
    pub duration: f64,
    /// Number of motion samples extracted
    pub sample_count: usize,
    /// Seed driving fallback and hit-point jitter, if randomness was seeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<ThresholdSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    /// Frame at which the source stopped early, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated_at_frame: Option<u64>,
    pub rallies: Vec<SegmentedRally>,
}

impl SegmentationReport {
    /// Whether the rallies came from the fallback segmenter.
    pub fn used_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }

    pub fn rally_count(&self) -> usize {
        self.rallies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_reason_display() {
        let reason = FallbackReason::DegenerateSignal { samples: 4 };
        assert_eq!(reason.to_string(), "degenerate motion signal (4 samples)");
        assert_eq!(reason.as_str(), "degenerate_signal");
        assert_eq!(FallbackReason::EmptyDetection.as_str(), "empty_detection");
    }

    #[test]
    fn test_fallback_reason_tagged() {
        let json = serde_json::to_value(FallbackReason::DegenerateSignal { samples: 3 }).unwrap();
        assert_eq!(json["kind"], "degenerate_signal");
        assert_eq!(json["samples"], 3);
    }
}
