//! Metrics recorded by segmentation runs.
//!
//! Recording goes through the `metrics` facade. No recorder is installed
//! here; without one every call is a no-op.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const ANALYSES_TOTAL: &str = "rallycut_analyses_total";
    pub const FALLBACK_TOTAL: &str = "rallycut_fallback_total";
    pub const RALLIES_DETECTED: &str = "rallycut_rallies_detected";
    pub const MOTION_SAMPLES: &str = "rallycut_motion_samples";
    pub const ANALYSIS_DURATION_SECONDS: &str = "rallycut_analysis_duration_seconds";
}

/// Record a finished (or failed) analysis.
pub fn record_analysis(outcome: &str, duration_secs: f64) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::ANALYSES_TOTAL, &labels).increment(1);
    histogram!(names::ANALYSIS_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record that synthetic segments replaced detection.
pub fn record_fallback(reason: &str) {
    let labels = [("reason", reason.to_string())];
    counter!(names::FALLBACK_TOTAL, &labels).increment(1);
}

/// Record the size of a run's output and input signal.
pub fn record_segmentation(rallies: usize, samples: usize) {
    histogram!(names::RALLIES_DETECTED).record(rallies as f64);
    histogram!(names::MOTION_SAMPLES).record(samples as f64);
}
