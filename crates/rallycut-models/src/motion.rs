//! Motion samples.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One sampled frame's motion magnitude inside the court region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MotionSample {
    /// Index of the sampled frame in the source video
    pub frame_index: u64,
    /// Presentation time of the sampled frame in seconds
    pub time_seconds: f64,
    /// Number of changed pixels in the region of interest
    pub motion_score: f64,
}

impl MotionSample {
    pub fn new(frame_index: u64, fps: f64, motion_score: f64) -> Self {
        Self {
            frame_index,
            time_seconds: frame_index as f64 / fps,
            motion_score: motion_score.max(0.0),
        }
    }
}
