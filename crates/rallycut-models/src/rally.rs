//! Rally segments and rallies.
//!
//! A [`RallySegment`] is created exactly once, either by the boundary detector
//! or by the fallback segmenter, and is never mutated afterwards. Downstream
//! collaborators (shot classification, mistake analysis, narration) build a
//! [`Rally`] around it and own the fields they populate.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a segment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentError {
    #[error("segment end frame {end} must be after start frame {start}")]
    EmptySpan { start: u64, end: u64 },

    #[error("invalid frame rate: {0}")]
    InvalidFps(f64),
}

/// A contiguous interval of active play.
///
/// Deserialization goes through the same checks as [`RallySegment::new`];
/// times are rebuilt from the frame span and the rate implied by `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "RallySegmentFields")]
pub struct RallySegment {
    start_frame: u64,
    end_frame: u64,
    start_time: f64,
    end_time: f64,
    duration: f64,
}

/// Wire form of [`RallySegment`] before validation.
#[derive(Deserialize)]
struct RallySegmentFields {
    start_frame: u64,
    end_frame: u64,
    duration: f64,
}

impl TryFrom<RallySegmentFields> for RallySegment {
    type Error = SegmentError;

    fn try_from(fields: RallySegmentFields) -> Result<Self, Self::Error> {
        if fields.end_frame <= fields.start_frame {
            return Err(SegmentError::EmptySpan {
                start: fields.start_frame,
                end: fields.end_frame,
            });
        }
        let fps = (fields.end_frame - fields.start_frame) as f64 / fields.duration;
        RallySegment::new(fields.start_frame, fields.end_frame, fps)
    }
}

impl RallySegment {
    /// Build a segment from a frame span, deriving times from `fps`.
    pub fn new(start_frame: u64, end_frame: u64, fps: f64) -> Result<Self, SegmentError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(SegmentError::InvalidFps(fps));
        }
        if end_frame <= start_frame {
            return Err(SegmentError::EmptySpan {
                start: start_frame,
                end: end_frame,
            });
        }

        Ok(Self {
            start_frame,
            end_frame,
            start_time: start_frame as f64 / fps,
            end_time: end_frame as f64 / fps,
            duration: (end_frame - start_frame) as f64 / fps,
        })
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    pub fn end_frame(&self) -> u64 {
        self.end_frame
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Number of frames spanned.
    pub fn frame_span(&self) -> u64 {
        self.end_frame - self.start_frame
    }

    /// Whether this segment ends at or before `other` starts.
    pub fn precedes(&self, other: &RallySegment) -> bool {
        self.end_frame <= other.start_frame
    }
}

/// How a rally ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Shuttle landed inside the court
    InCourt,
    /// Shot went into the net
    Net,
    /// Shot landed out of bounds
    Out,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::InCourt => "in_court",
            EndReason::Net => "net",
            EndReason::Out => "out",
        }
    }
}

/// A rally segment plus the fields collaborators fill in later.
///
/// The segmentation engine only sets `rally_number` and `segment`; every other
/// field starts empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rally {
    /// 1-based position of the rally in the match
    pub rally_number: u32,
    #[serde(flatten)]
    pub segment: RallySegment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<EndReason>,
    #[serde(default)]
    pub shots: Vec<serde_json::Value>,
    #[serde(default)]
    pub mistakes: Vec<serde_json::Value>,
    #[serde(default)]
    pub narrative: String,
}

impl Rally {
    pub fn from_segment(rally_number: u32, segment: RallySegment) -> Self {
        Self {
            rally_number,
            segment,
            winner: None,
            end_reason: None,
            shots: Vec::new(),
            mistakes: Vec::new(),
            narrative: String::new(),
        }
    }
}
