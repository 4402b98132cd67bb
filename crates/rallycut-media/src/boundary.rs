//! Two-state machine turning classified motion samples into rally spans.
//!
//! # State Machine
//!
//! ```text
//!                          active sample
//!     ┌──────────────────────────────────────────────────┐
//!     │                                                  ▼
//! ┌────────────────┐                          ┌──────────────────────┐
//! │ BetweenRallies │                          │ InRally              │
//! │                │◄─────────────────────────│ { rally_start,       │
//! └────────────────┘  idle for > idle_gap     │   idle_since }       │
//!                     (emit if long enough)   └──────────────────────┘
//!                                                 │ non-idle sample:
//!                                                 └─ clear idle_since
//! ```
//!
//! A rally's emitted span ends where the idle run began, not where the
//! idle run was confirmed.

use rallycut_models::{MotionSample, RallySegment};
use tracing::{debug, warn};

use crate::config::SegmentationConfig;
use crate::threshold::Classification;

/// Detector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    BetweenRallies,
    InRally {
        rally_start: u64,
        /// First frame of the current idle run, if one is in progress.
        idle_since: Option<u64>,
    },
}

/// Walks classified samples and collects `(start_frame, end_frame)` spans.
#[derive(Debug, Clone)]
pub struct BoundaryDetector {
    state: DetectorState,
    min_rally_frames: u64,
    idle_gap_frames: u64,
    spans: Vec<(u64, u64)>,
}

impl BoundaryDetector {
    /// Create a detector with thresholds given in frames.
    pub fn new(min_rally_frames: u64, idle_gap_frames: u64) -> Self {
        Self {
            state: DetectorState::BetweenRallies,
            min_rally_frames,
            idle_gap_frames,
            spans: Vec::new(),
        }
    }

    /// Create a detector converting the configured durations at `fps`.
    pub fn from_config(config: &SegmentationConfig, fps: f64) -> Self {
        Self::new(
            (config.min_rally_secs * fps) as u64,
            (config.idle_threshold_secs * fps) as u64,
        )
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Process one classified sample at `frame`.
    pub fn ingest(&mut self, frame: u64, class: Classification) {
        match (self.state, class) {
            (DetectorState::BetweenRallies, Classification::Active) => {
                self.state = DetectorState::InRally {
                    rally_start: frame,
                    idle_since: None,
                };
            }

            (DetectorState::BetweenRallies, _) => {}

            (
                DetectorState::InRally {
                    rally_start,
                    idle_since,
                },
                Classification::Idle,
            ) => {
                let idle_start = idle_since.unwrap_or(frame);
                if frame.saturating_sub(idle_start) > self.idle_gap_frames {
                    self.close_rally(rally_start, idle_start);
                    self.state = DetectorState::BetweenRallies;
                } else {
                    self.state = DetectorState::InRally {
                        rally_start,
                        idle_since: Some(idle_start),
                    };
                }
            }

            // Idle run did not persist long enough
            (DetectorState::InRally { rally_start, .. }, _) => {
                self.state = DetectorState::InRally {
                    rally_start,
                    idle_since: None,
                };
            }
        }
    }

    fn close_rally(&mut self, start: u64, end: u64) {
        if end.saturating_sub(start) > self.min_rally_frames {
            self.spans.push((start, end));
        } else {
            debug!(start, end, "Discarding rally shorter than minimum duration");
        }
    }

    /// Close any open rally at `last_frame` and return all spans.
    pub fn finish(mut self, last_frame: u64) -> Vec<(u64, u64)> {
        if let DetectorState::InRally { rally_start, .. } = self.state {
            self.close_rally(rally_start, last_frame);
        }
        self.spans
    }
}

/// Run the detector over a classified series and build segments.
pub fn detect_rallies(
    samples: &[MotionSample],
    classes: &[Classification],
    fps: f64,
    config: &SegmentationConfig,
) -> Vec<RallySegment> {
    debug_assert_eq!(samples.len(), classes.len());

    let mut detector = BoundaryDetector::from_config(config, fps);
    for (sample, class) in samples.iter().zip(classes) {
        detector.ingest(sample.frame_index, *class);
    }

    let Some(last) = samples.last() else {
        return Vec::new();
    };

    let segments: Vec<RallySegment> = detector
        .finish(last.frame_index)
        .into_iter()
        .filter_map(|(start, end)| match RallySegment::new(start, end, fps) {
            Ok(segment) => Some(segment),
            Err(e) => {
                warn!(start, end, "Dropping invalid rally span: {}", e);
                None
            }
        })
        .collect();

    if config.split_long_rallies {
        split_long_rallies(&segments, fps, config.max_rally_secs, config.min_rally_secs)
    } else {
        segments
    }
}

/// Split segments longer than `max_secs` into equal consecutive parts.
///
/// No part is made shorter than `min_secs`: when both bounds cannot hold, a
/// segment gets fewer, longer parts (possibly staying whole).
pub fn split_long_rallies(
    segments: &[RallySegment],
    fps: f64,
    max_secs: f64,
    min_secs: f64,
) -> Vec<RallySegment> {
    let min_frames = ((min_secs.max(0.0) * fps).ceil() as u64).max(1);

    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.duration() <= max_secs || max_secs <= 0.0 {
            out.push(*segment);
            continue;
        }

        let span = segment.frame_span();
        let wanted = (segment.duration() / max_secs).ceil() as u64;
        let parts = wanted.min(span / min_frames).max(1);
        if parts < wanted {
            debug!(
                start = segment.start_frame(),
                end = segment.end_frame(),
                wanted,
                parts,
                "Long rally split limited by minimum rally duration"
            );
        }

        let mut start = segment.start_frame();
        for part in 1..=parts {
            let end = if part == parts {
                segment.end_frame()
            } else {
                segment.start_frame() + span * part / parts
            };
            if let Ok(piece) = RallySegment::new(start, end, fps) {
                out.push(piece);
            }
            start = end;
        }
    }
    out
}
