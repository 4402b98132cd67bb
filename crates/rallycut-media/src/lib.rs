#![deny(unreachable_patterns)]
//! Rally boundary detection for badminton match videos.
//!
//! This crate provides:
//! - Frame sources over FFmpeg (and optionally OpenCV) with scoped handles
//! - Motion signal extraction over a court region of interest
//! - Centered smoothing and adaptive hysteresis thresholds
//! - A tagged-state boundary detector with idle debounce
//! - Deterministic-capable fallback segmentation and hit point estimates
//! - Scene change detection
//! - Non-blocking progress and cooperative cancellation via tokio

pub mod boundary;
pub mod config;
pub mod error;
pub mod fallback;
pub mod frame;
pub mod hit_points;
pub mod jitter;
pub mod metrics;
pub mod motion;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod scene_change;
pub mod seed;
pub mod smoother;
pub mod threshold;

pub use boundary::{detect_rallies, split_long_rallies, BoundaryDetector, DetectorState};
pub use config::{
    CancelPolicy, FallbackConfig, HitPointConfig, Randomness, RegionOfInterest,
    SegmentationConfig, DEFAULT_FPS, IDLE_THRESHOLD, MAX_RALLY_DURATION, MIN_RALLY_DURATION,
};
pub use error::{MediaError, MediaResult};
pub use fallback::fallback_segments;
pub use frame::{FfmpegFrameSource, Frame, FrameSource, MemoryFrameSource};
pub use hit_points::estimate_hit_points;
pub use jitter::JitterSource;
pub use motion::{motion_score, MotionExtraction, MotionExtractor, MotionSeries};
pub use pipeline::{analyze_video, plan_segments, RallySegmenter, SegmentPlan};
pub use probe::{probe_video, VideoInfo};
pub use progress::{ProgressReceiver, ProgressSender};
pub use scene_change::{detect_scene_changes, SceneChange, SceneChangeConfig};
pub use seed::content_seed;
pub use smoother::{moving_average, smoothing_window};
pub use threshold::{Classification, Thresholds};
