//! Shared data models for RallyCut.
//!
//! This crate provides Serde-serializable types for:
//! - Motion samples produced by the signal extractor
//! - Rally segments and the rallies collaborators enrich from them
//! - Estimated hit points
//! - Progress events and the final segmentation report

pub mod hit_point;
pub mod motion;
pub mod progress;
pub mod rally;
pub mod report;

// Re-export common types
pub use hit_point::{HitPoint, Player};
pub use motion::MotionSample;
pub use progress::ProgressEvent;
pub use rally::{EndReason, Rally, RallySegment, SegmentError};
pub use report::{FallbackReason, SegmentedRally, SegmentationReport, ThresholdSummary};
