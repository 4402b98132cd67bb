//! Motion signal extraction.
//!
//! Samples the frame source at ~`samples_per_second`, blurs each sampled
//! luma frame, and scores it by the number of pixels inside the court region
//! that changed by more than `diff_threshold` since the previous sample.
//!
//! Only the most recent blurred sample is kept in memory. Frames between
//! samples are consumed from the source and discarded.

use image::{imageops, GrayImage};
use rallycut_models::MotionSample;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::{CancelPolicy, RegionOfInterest, SegmentationConfig};
use crate::error::{MediaError, MediaResult};
use crate::frame::{FrameSource, ReadStep, SequentialReader};
use crate::progress::ProgressSender;

/// Upper bound of the progress band used by extraction.
const EXTRACTION_PROGRESS_MAX: f64 = 50.0;

/// Motion samples in temporal order.
///
/// Owned by one analysis run and dropped once boundaries are detected.
#[derive(Debug, Clone, Default)]
pub struct MotionSeries {
    samples: Vec<MotionSample>,
    /// Frames between consecutive samples.
    sample_interval: u64,
    /// Frame rate used for time conversion.
    fps: f64,
}

impl MotionSeries {
    pub fn new(fps: f64, sample_interval: u64) -> Self {
        Self {
            samples: Vec::new(),
            sample_interval: sample_interval.max(1),
            fps,
        }
    }

    /// Build a series from precomputed scores at `frame_indices`.
    pub fn from_scores(fps: f64, sample_interval: u64, points: &[(u64, f64)]) -> Self {
        let mut series = Self::new(fps, sample_interval);
        for &(frame, score) in points {
            series.push(MotionSample::new(frame, fps, score));
        }
        series
    }

    /// Append a sample. Samples must arrive in increasing frame order.
    pub fn push(&mut self, sample: MotionSample) {
        debug_assert!(
            self.samples
                .last()
                .map_or(true, |last| last.frame_index < sample.frame_index),
            "motion samples must be strictly increasing"
        );
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[MotionSample] {
        &self.samples
    }

    pub fn scores(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.motion_score).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn sample_interval(&self) -> u64 {
        self.sample_interval
    }

    /// Samples per second of video.
    pub fn sample_rate(&self) -> f64 {
        self.fps / self.sample_interval as f64
    }

    pub fn last_frame(&self) -> Option<u64> {
        self.samples.last().map(|s| s.frame_index)
    }
}

/// Result of the extraction pass.
#[derive(Debug, Clone)]
pub struct MotionExtraction {
    pub series: MotionSeries,
    /// Frames consumed from the source.
    pub frames_read: u64,
    /// Set when the source ended before its reported frame count.
    pub truncated_at_frame: Option<u64>,
    /// Set when the pass stopped on a cancellation request.
    pub cancelled: bool,
}

/// Computes per-sample motion scores from a frame source.
pub struct MotionExtractor<'a> {
    config: &'a SegmentationConfig,
    progress: Option<ProgressSender>,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl<'a> MotionExtractor<'a> {
    pub fn new(config: &'a SegmentationConfig) -> Self {
        Self {
            config,
            progress: None,
            cancel_rx: None,
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

    /// Run the single decode-and-diff pass.
    pub fn extract<S: FrameSource + ?Sized>(&self, source: &mut S) -> MediaResult<MotionExtraction> {
        let fps = self.config.effective_fps(source.fps());
        if fps != source.fps() {
            warn!(
                reported = source.fps(),
                substituted = fps,
                "Source reported unusable fps, using default"
            );
        }

        let interval = self.config.sample_interval(fps);
        let total_frames = source.frame_count();
        let sigma = self.config.blur_sigma();
        let progress_stride = interval * self.config.progress_every_samples.max(1);

        debug!(fps, interval, total_frames, sigma, "Starting motion extraction");

        let mut series = MotionSeries::new(fps, interval);
        let mut prev: Option<GrayImage> = None;
        let mut cancelled = false;
        let mut next_progress = progress_stride;

        let mut reader = SequentialReader::new(source, interval).with_cancel(self.cancel_rx.clone());
        loop {
            let frame = match reader.advance()? {
                ReadStep::Frame(frame) => frame,
                ReadStep::End => break,
                ReadStep::Cancelled => {
                    cancelled = true;
                    break;
                }
            };

            let blurred = imageops::blur(&frame.image, sigma);
            if let Some(ref previous) = prev {
                let score = motion_score(
                    previous,
                    &blurred,
                    self.config.diff_threshold,
                    &self.config.roi,
                )?;
                series.push(MotionSample::new(frame.index, fps, score as f64));
            }
            prev = Some(blurred);

            if reader.position() >= next_progress {
                next_progress += progress_stride;
                self.report_progress(reader.position(), total_frames);
            }
        }

        let frames_read = reader.position();

        if cancelled {
            info!(frames_read, samples = series.len(), "Motion extraction cancelled");
            if self.config.cancel_policy == CancelPolicy::Fail {
                return Err(MediaError::Cancelled);
            }
        }

        let truncated_at_frame = if !cancelled && frames_read < total_frames {
            warn!(
                frames_read,
                reported = total_frames,
                "Frame source ended early, clipping to truncation point"
            );
            Some(frames_read)
        } else {
            None
        };

        info!(
            samples = series.len(),
            frames_read,
            interval,
            "Motion extraction complete"
        );

        Ok(MotionExtraction {
            series,
            frames_read,
            truncated_at_frame,
            cancelled,
        })
    }

    fn report_progress(&self, frames_read: u64, total_frames: u64) {
        let Some(ref progress) = self.progress else {
            return;
        };
        let fraction = if total_frames > 0 {
            (frames_read as f64 / total_frames as f64).min(1.0)
        } else {
            0.0
        };
        progress.update(
            (fraction * EXTRACTION_PROGRESS_MAX) as u8,
            format!("Analyzing motion: {}/{} frames", frames_read, total_frames),
        );
    }
}

/// Count pixels inside `roi` whose absolute difference exceeds `threshold`.
pub fn motion_score(
    prev: &GrayImage,
    curr: &GrayImage,
    threshold: u8,
    roi: &RegionOfInterest,
) -> MediaResult<u64> {
    if prev.dimensions() != curr.dimensions() {
        return Err(MediaError::frame_decode(format!(
            "frame size changed from {:?} to {:?}",
            prev.dimensions(),
            curr.dimensions()
        )));
    }

    let (width, height) = curr.dimensions();
    let (row_start, row_end, col_start, col_end) = roi.pixel_bounds(width, height);
    let stride = width as usize;
    let a = prev.as_raw();
    let b = curr.as_raw();

    let mut count = 0u64;
    for row in row_start..row_end {
        let offset = row * stride;
        let prev_row = &a[offset + col_start..offset + col_end];
        let curr_row = &b[offset + col_start..offset + col_end];
        count += prev_row
            .iter()
            .zip(curr_row)
            .filter(|(p, c)| p.abs_diff(**c) > threshold)
            .count() as u64;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MemoryFrameSource;
    use image::Luma;

    fn flat(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    #[test]
    fn test_motion_score_counts_roi_only() {
        let prev = flat(10, 10, 0);
        let curr = flat(10, 10, 200);

        // ROI rows 1..9, cols 2..8 -> 8 * 6 pixels
        let score = motion_score(&prev, &curr, 25, &RegionOfInterest::default()).unwrap();
        assert_eq!(score, 48);
    }

    #[test]
    fn test_motion_score_ignores_small_changes() {
        let prev = flat(10, 10, 100);
        let curr = flat(10, 10, 125);
        assert_eq!(
            motion_score(&prev, &curr, 25, &RegionOfInterest::default()).unwrap(),
            0
        );
    }

    #[test]
    fn test_motion_score_ignores_changes_outside_roi() {
        let prev = flat(10, 10, 0);
        let mut curr = flat(10, 10, 0);
        curr.put_pixel(0, 0, Luma([255]));
        curr.put_pixel(9, 9, Luma([255]));
        assert_eq!(
            motion_score(&prev, &curr, 25, &RegionOfInterest::default()).unwrap(),
            0
        );
    }

    #[test]
    fn test_motion_score_rejects_size_change() {
        let err = motion_score(&flat(4, 4, 0), &flat(5, 4, 0), 25, &RegionOfInterest::default());
        assert!(matches!(err, Err(MediaError::FrameDecode(_))));
    }

    #[test]
    fn test_extract_drops_first_sample() {
        let config = SegmentationConfig::default();
        let mut source = MemoryFrameSource::from_fn(60, 30.0, 16, 16, |i| flat(16, 16, (i * 4) as u8));

        let extraction = MotionExtractor::new(&config).extract(&mut source).unwrap();
        let frames: Vec<u64> = extraction
            .series
            .samples()
            .iter()
            .map(|s| s.frame_index)
            .collect();

        // Sampled at 0, 6, ..., 54; frame 0 has no predecessor
        assert_eq!(frames, vec![6, 12, 18, 24, 30, 36, 42, 48, 54]);
        assert_eq!(extraction.frames_read, 60);
        assert!(extraction.truncated_at_frame.is_none());
    }

    #[test]
    fn test_extract_substitutes_default_fps() {
        let config = SegmentationConfig::default();
        let mut source = MemoryFrameSource::from_fn(30, 0.0, 8, 8, |_| flat(8, 8, 0));

        let extraction = MotionExtractor::new(&config).extract(&mut source).unwrap();
        assert_eq!(extraction.series.fps(), 30.0);
        assert_eq!(extraction.series.sample_interval(), 6);
        let first = extraction.series.samples()[0];
        assert!((first.time_seconds - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_extract_scores_moving_content() {
        let config = SegmentationConfig::default();
        // Alternate black and white frames so every sample differs from the last
        let mut source = MemoryFrameSource::from_fn(36, 30.0, 40, 40, |i| {
            flat(40, 40, if (i / 6) % 2 == 0 { 0 } else { 255 })
        });

        let extraction = MotionExtractor::new(&config).extract(&mut source).unwrap();
        assert!(extraction.series.samples().iter().all(|s| s.motion_score > 0.0));
    }

    #[test]
    fn test_extract_reports_truncation() {
        let config = SegmentationConfig::default();
        let mut source = MemoryFrameSource::from_fn(30, 30.0, 8, 8, |_| flat(8, 8, 0))
            .with_reported_frame_count(90);

        let extraction = MotionExtractor::new(&config).extract(&mut source).unwrap();
        assert_eq!(extraction.truncated_at_frame, Some(30));
    }

    #[test]
    fn test_extract_cancel_fails_by_default() {
        let config = SegmentationConfig::default();
        let mut source = MemoryFrameSource::from_fn(30, 30.0, 8, 8, |_| flat(8, 8, 0));
        let (_tx, rx) = watch::channel(true);

        let result = MotionExtractor::new(&config)
            .with_cancel(Some(rx))
            .extract(&mut source);
        assert!(matches!(result, Err(MediaError::Cancelled)));
    }

    #[test]
    fn test_extract_cancel_can_return_partial() {
        let config = SegmentationConfig::default().with_cancel_policy(CancelPolicy::ReturnPartial);
        let mut source = MemoryFrameSource::from_fn(30, 30.0, 8, 8, |_| flat(8, 8, 0));
        let (_tx, rx) = watch::channel(true);

        let extraction = MotionExtractor::new(&config)
            .with_cancel(Some(rx))
            .extract(&mut source)
            .unwrap();
        assert!(extraction.cancelled);
        assert!(extraction.series.is_empty());
        assert!(extraction.truncated_at_frame.is_none());
    }

    #[test]
    fn test_series_sample_rate() {
        let series = MotionSeries::from_scores(30.0, 6, &[(6, 1.0), (12, 2.0)]);
        assert!((series.sample_rate() - 5.0).abs() < 1e-9);
        assert_eq!(series.scores(), vec![1.0, 2.0]);
        assert_eq!(series.last_frame(), Some(12));
    }
}
