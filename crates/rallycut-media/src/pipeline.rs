//! Rally segmentation pipeline.
//!
//! One [`RallySegmenter`] drives one analysis run. It owns its frame source,
//! so the source's handle is released when the run ends on any path:
//! success, error or cancellation.
//!
//! Stages:
//! 1. Motion extraction (0-50%)
//! 2. Smoothing, thresholding and boundary detection (50%)
//! 3. Fallback segmentation when detection is unusable
//! 4. Rally assembly with hit point estimates (75%)
//!
//! [`plan_segments`] is the pure part of stage 2 and carries the decision of
//! whether detection results are used or the fallback segmenter takes over.

use std::path::Path;
use std::time::Instant;

use rallycut_models::{
    FallbackReason, Rally, RallySegment, SegmentationReport, SegmentedRally,
};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::boundary::detect_rallies;
use crate::config::{Randomness, SegmentationConfig};
use crate::error::{MediaError, MediaResult};
use crate::fallback::fallback_segments;
use crate::frame::{FfmpegFrameSource, FrameSource};
use crate::hit_points::estimate_hit_points;
use crate::jitter::JitterSource;
use crate::metrics;
use crate::motion::{MotionExtractor, MotionSeries};
use crate::progress::ProgressSender;
use crate::seed::content_seed;
use crate::smoother::{moving_average, smoothing_window};
use crate::threshold::Thresholds;

/// Where a run's segments come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentPlan {
    /// The boundary detector produced at least one rally.
    Detected(Vec<RallySegment>),
    /// Detection is unusable; synthesize segments instead.
    FallbackNeeded(FallbackReason),
}

impl SegmentPlan {
    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            SegmentPlan::Detected(_) => None,
            SegmentPlan::FallbackNeeded(reason) => Some(*reason),
        }
    }
}

/// Smooth, threshold and walk a motion series.
///
/// Returns the plan together with the thresholds used, when the series was
/// long enough to derive them.
pub fn plan_segments(
    series: &MotionSeries,
    config: &SegmentationConfig,
) -> (SegmentPlan, Option<Thresholds>) {
    if series.len() < config.min_motion_samples {
        return (
            SegmentPlan::FallbackNeeded(FallbackReason::DegenerateSignal {
                samples: series.len(),
            }),
            None,
        );
    }

    let window = smoothing_window(
        series.sample_rate(),
        config.smoothing_window_secs,
        config.min_smoothing_window,
    );
    let smoothed = moving_average(&series.scores(), window);

    let Some(thresholds) = Thresholds::from_smoothed(&smoothed, config) else {
        return (
            SegmentPlan::FallbackNeeded(FallbackReason::DegenerateSignal {
                samples: series.len(),
            }),
            None,
        );
    };

    debug!(
        window,
        mean = thresholds.mean,
        std_dev = thresholds.std_dev,
        active = thresholds.active,
        idle = thresholds.idle,
        "Derived motion thresholds"
    );

    let classes = thresholds.classify_all(&smoothed);
    let segments = detect_rallies(series.samples(), &classes, series.fps(), config);

    if segments.is_empty() {
        (
            SegmentPlan::FallbackNeeded(FallbackReason::EmptyDetection),
            Some(thresholds),
        )
    } else {
        (SegmentPlan::Detected(segments), Some(thresholds))
    }
}

/// A single segmentation run over an owned frame source.
pub struct RallySegmenter<S: FrameSource> {
    source: S,
    config: SegmentationConfig,
    progress: Option<ProgressSender>,
    cancel_rx: Option<watch::Receiver<bool>>,
    content_seed: Option<u64>,
}

impl<S: FrameSource> RallySegmenter<S> {
    pub fn new(source: S, config: SegmentationConfig) -> Self {
        Self {
            source,
            config,
            progress: None,
            cancel_rx: None,
            content_seed: None,
        }
    }

    pub fn with_progress(mut self, progress: Option<ProgressSender>) -> Self {
        self.progress = progress;
        self
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: Option<watch::Receiver<bool>>) -> Self {
        self.cancel_rx = cancel_rx;
        self
    }

    /// Seed used when the config asks for [`Randomness::ContentSeed`].
    pub fn with_content_seed(mut self, seed: Option<u64>) -> Self {
        self.content_seed = seed;
        self
    }

    /// Run the analysis, consuming the segmenter and its source.
    #[instrument(skip(self), fields(source = %self.source.describe()))]
    pub fn run(mut self) -> MediaResult<SegmentationReport> {
        let started = Instant::now();
        let result = self.segment();
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(report) => {
                metrics::record_analysis("success", elapsed);
                metrics::record_segmentation(report.rally_count(), report.sample_count);
                info!(
                    rallies = report.rally_count(),
                    fallback = report.used_fallback(),
                    elapsed_secs = elapsed,
                    "Rally segmentation complete"
                );
            }
            Err(e) => {
                let outcome = if e.is_cancelled() { "cancelled" } else { "error" };
                metrics::record_analysis(outcome, elapsed);
                if let Some(ref progress) = self.progress {
                    progress.failed(e.to_string());
                }
            }
        }

        result
    }

    fn update(&self, percent: u8, message: impl Into<String>) {
        if let Some(ref progress) = self.progress {
            progress.update(percent, message);
        }
    }

    fn segment(&mut self) -> MediaResult<SegmentationReport> {
        self.config.validate()?;
        self.update(0, "Starting motion analysis...");

        let fps = self.config.effective_fps(self.source.fps());
        let (width, height) = self.source.dimensions();
        let reported_frames = self.source.frame_count();
        let source_name = self.source.describe();

        info!(
            fps,
            width,
            height,
            frames = reported_frames,
            "Starting rally segmentation"
        );

        let extraction = MotionExtractor::new(&self.config)
            .with_progress(self.progress.clone())
            .with_cancel(self.cancel_rx.clone())
            .extract(&mut self.source)?;

        // Segments may only cover frames that were actually read
        let frame_count = if extraction.truncated_at_frame.is_some() || extraction.cancelled {
            extraction.frames_read
        } else {
            reported_frames.max(extraction.frames_read)
        };

        self.update(50, "Detecting rally boundaries...");
        let (plan, thresholds) = plan_segments(&extraction.series, &self.config);

        let (mut jitter, seed) = JitterSource::from_mode(self.config.randomness, self.content_seed);
        if self.config.randomness == Randomness::ContentSeed && seed.is_none() {
            debug!("No content seed available, heuristic jitter disabled");
        }

        let fallback_reason = plan.fallback_reason();
        let segments = match plan {
            SegmentPlan::Detected(segments) => {
                info!(count = segments.len(), "Detected rally segments");
                segments
            }
            SegmentPlan::FallbackNeeded(reason) => {
                warn!(reason = %reason, "Motion detection unusable, using fallback segmentation");
                metrics::record_fallback(reason.as_str());
                fallback_segments(
                    frame_count,
                    fps,
                    &self.config.fallback,
                    self.config.min_rally_secs,
                    &mut jitter,
                )
            }
        };

        self.update(75, format!("Building {} rallies...", segments.len()));

        let rallies: Vec<SegmentedRally> = segments
            .into_iter()
            .enumerate()
            .map(|(i, segment)| {
                let hit_points = estimate_hit_points(
                    &segment,
                    fps,
                    (width, height),
                    &self.config.hit_points,
                    &mut jitter,
                );
                SegmentedRally {
                    rally: Rally::from_segment(i as u32 + 1, segment),
                    hit_points,
                }
            })
            .collect();

        if let Some(ref progress) = self.progress {
            progress.complete(format!("Found {} rallies", rallies.len()));
        }

        Ok(SegmentationReport {
            source: source_name,
            fps,
            frame_count,
            width,
            height,
            duration: frame_count as f64 / fps,
            sample_count: extraction.series.len(),
            seed,
            thresholds: thresholds.map(|t| t.summary()),
            fallback_reason,
            truncated_at_frame: extraction.truncated_at_frame,
            rallies,
        })
    }
}

/// Analyze a video file on a blocking thread.
///
/// Opens the file through FFmpeg, derives the content seed when the config
/// asks for one, and runs a [`RallySegmenter`] to completion.
pub async fn analyze_video(
    path: impl AsRef<Path>,
    config: SegmentationConfig,
    progress: Option<ProgressSender>,
    cancel_rx: Option<watch::Receiver<bool>>,
) -> MediaResult<SegmentationReport> {
    let path = path.as_ref().to_path_buf();

    tokio::task::spawn_blocking(move || {
        let seed = if config.randomness == Randomness::ContentSeed {
            match content_seed(&path) {
                Ok(seed) => Some(seed),
                Err(e) => {
                    warn!(path = %path.display(), "Could not derive content seed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let source = match FfmpegFrameSource::open(&path) {
            Ok(source) => source,
            Err(e) => {
                if let Some(ref progress) = progress {
                    progress.failed(e.to_string());
                }
                return Err(e);
            }
        };

        RallySegmenter::new(source, config)
            .with_progress(progress)
            .with_cancel(cancel_rx)
            .with_content_seed(seed)
            .run()
    })
    .await
    .map_err(|e| MediaError::internal(format!("Analysis task failed: {}", e)))?
}
