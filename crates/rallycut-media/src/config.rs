//! Configuration for rally segmentation.
//!
//! The defaults reproduce the tuned badminton behaviour: ~5 motion samples per
//! second, a half-second smoothing window, rallies of at least 2 s that end
//! after 3 s of idle court.

use serde::{Deserialize, Serialize};

use crate::error::{MediaError, MediaResult};

/// Frame rate substituted when a source reports zero or an unusable value.
pub const DEFAULT_FPS: f64 = 30.0;

/// `reported` if it is a finite positive rate, otherwise `fallback`.
///
/// Containers without a frame rate report 0, and some report NaN.
pub fn usable_fps(reported: f64, fallback: f64) -> f64 {
    if reported.is_finite() && reported > 0.0 {
        reported
    } else {
        fallback
    }
}

/// Minimum seconds for a valid rally.
pub const MIN_RALLY_DURATION: f64 = 2.0;

/// Advisory maximum rally length in seconds.
pub const MAX_RALLY_DURATION: f64 = 120.0;

/// Seconds of low motion that end a rally.
pub const IDLE_THRESHOLD: f64 = 3.0;

/// Central sub-rectangle of the frame assumed to contain the court.
///
/// All bounds are fractions of the frame size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Default for RegionOfInterest {
    fn default() -> Self {
        Self {
            top: 0.1,
            bottom: 0.9,
            left: 0.2,
            right: 0.8,
        }
    }
}

impl RegionOfInterest {
    /// Pixel bounds `(row_start, row_end, col_start, col_end)`, end-exclusive.
    pub fn pixel_bounds(&self, width: u32, height: u32) -> (usize, usize, usize, usize) {
        let h = height as f64;
        let w = width as f64;
        let row_start = (h * self.top) as usize;
        let row_end = ((h * self.bottom) as usize).min(height as usize);
        let col_start = (w * self.left) as usize;
        let col_end = ((w * self.right) as usize).min(width as usize);
        (row_start, row_end.max(row_start), col_start, col_end.max(col_start))
    }

    fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.top)
            && (0.0..=1.0).contains(&self.bottom)
            && (0.0..=1.0).contains(&self.left)
            && (0.0..=1.0).contains(&self.right)
            && self.top < self.bottom
            && self.left < self.right
    }
}

/// Parameters of the synthetic fallback segmenter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Seconds skipped at the start of the video.
    pub lead_in_secs: f64,
    /// Seconds left uncovered at the end of the video.
    pub tail_secs: f64,
    /// Videos shorter than this use `short_avg_secs` as the target length.
    pub short_video_secs: f64,
    pub short_avg_secs: f64,
    pub long_avg_secs: f64,
    /// Segment length range is `[avg - spread_below, avg + spread_above]`...
    pub spread_below: f64,
    pub spread_above: f64,
    /// ...clamped to `[min_len_secs, max_len_secs]`.
    pub min_len_secs: f64,
    pub max_len_secs: f64,
    pub min_gap_secs: f64,
    pub max_gap_secs: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            lead_in_secs: 2.0,
            tail_secs: 5.0,
            short_video_secs: 300.0,
            short_avg_secs: 15.0,
            long_avg_secs: 25.0,
            spread_below: 10.0,
            spread_above: 15.0,
            min_len_secs: 5.0,
            max_len_secs: 45.0,
            min_gap_secs: 3.0,
            max_gap_secs: 10.0,
        }
    }
}

impl FallbackConfig {
    /// Segment length range for a video of `duration` seconds.
    pub fn length_range(&self, duration: f64) -> (f64, f64) {
        let avg = if duration < self.short_video_secs {
            self.short_avg_secs
        } else {
            self.long_avg_secs
        };
        (
            (avg - self.spread_below).max(self.min_len_secs),
            (avg + self.spread_above).min(self.max_len_secs),
        )
    }
}

/// Parameters of the hit point heuristic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitPointConfig {
    /// Shot rate range in events per second.
    pub min_rate: f64,
    pub max_rate: f64,
    /// Lower bound on estimated events per rally.
    pub min_hits: usize,
    /// Maximum +/- frame offset applied to each event.
    pub frame_jitter: i64,
    /// Horizontal band (fraction of width) for both players.
    pub x_band: (f64, f64),
    /// Vertical band (fraction of height) for the near player.
    pub near_band: (f64, f64),
    /// Vertical band (fraction of height) for the far player.
    pub far_band: (f64, f64),
}

impl Default for HitPointConfig {
    fn default() -> Self {
        Self {
            min_rate: 0.5,
            max_rate: 1.2,
            min_hits: 2,
            frame_jitter: 5,
            x_band: (0.25, 0.75),
            near_band: (0.6, 0.85),
            far_band: (0.15, 0.4),
        }
    }
}

/// Source of the jitter used by fallback segmentation and hit estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "seed", rename_all = "snake_case")]
pub enum Randomness {
    /// Seed derived from the video's content; the same file always yields the
    /// same segments.
    #[default]
    ContentSeed,
    /// Fixed seed.
    Seed(u64),
    /// Fresh OS entropy on every run.
    Entropy,
    /// No jitter at all: every random draw takes the midpoint of its range.
    Disabled,
}

/// What the extractor does when the caller cancels mid-pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
    /// Abort the run with [`MediaError::Cancelled`].
    #[default]
    Fail,
    /// Segment whatever was sampled before cancellation.
    ReturnPartial,
}

/// Configuration for a segmentation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Target motion samples per second of video.
    pub samples_per_second: f64,
    /// Smoothing window length in seconds of samples.
    pub smoothing_window_secs: f64,
    /// Smoothing window floor in samples.
    pub min_smoothing_window: usize,
    /// `active = mean + active_std_factor * std`
    pub active_std_factor: f64,
    /// `idle = mean - idle_std_factor * std`
    pub idle_std_factor: f64,
    pub min_rally_secs: f64,
    pub max_rally_secs: f64,
    /// Split detected rallies longer than `max_rally_secs` into equal parts.
    pub split_long_rallies: bool,
    pub idle_threshold_secs: f64,
    /// Below this many motion samples the fallback segmenter is used.
    pub min_motion_samples: usize,
    /// Per-pixel difference that counts as motion (0-255).
    pub diff_threshold: u8,
    /// Gaussian blur kernel size in pixels (odd).
    pub blur_kernel: u32,
    pub roi: RegionOfInterest,
    /// Frame rate substituted for sources reporting zero.
    pub default_fps: f64,
    /// Emit a progress event every this many samples.
    pub progress_every_samples: u64,
    pub fallback: FallbackConfig,
    pub hit_points: HitPointConfig,
    pub randomness: Randomness,
    pub cancel_policy: CancelPolicy,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            samples_per_second: 5.0,
            smoothing_window_secs: 0.5,
            min_smoothing_window: 5,
            active_std_factor: 0.5,
            idle_std_factor: 0.3,
            min_rally_secs: MIN_RALLY_DURATION,
            max_rally_secs: MAX_RALLY_DURATION,
            split_long_rallies: false,
            idle_threshold_secs: IDLE_THRESHOLD,
            min_motion_samples: 10,
            diff_threshold: 25,
            blur_kernel: 21,
            roi: RegionOfInterest::default(),
            default_fps: DEFAULT_FPS,
            progress_every_samples: 50,
            fallback: FallbackConfig::default(),
            hit_points: HitPointConfig::default(),
            randomness: Randomness::default(),
            cancel_policy: CancelPolicy::default(),
        }
    }
}

impl SegmentationConfig {
    /// Builder-style setter for the sampling rate.
    pub fn with_samples_per_second(mut self, rate: f64) -> Self {
        self.samples_per_second = rate;
        self
    }

    /// Builder-style setter for the idle gap that ends a rally.
    pub fn with_idle_threshold_secs(mut self, secs: f64) -> Self {
        self.idle_threshold_secs = secs;
        self
    }

    /// Builder-style setter for the minimum rally duration.
    pub fn with_min_rally_secs(mut self, secs: f64) -> Self {
        self.min_rally_secs = secs;
        self
    }

    /// Builder-style setter for splitting over-long rallies.
    pub fn with_split_long_rallies(mut self, split: bool) -> Self {
        self.split_long_rallies = split;
        self
    }

    pub fn with_randomness(mut self, randomness: Randomness) -> Self {
        self.randomness = randomness;
        self
    }

    pub fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.cancel_policy = policy;
        self
    }

    /// Replace an unusable source frame rate with `default_fps`.
    pub fn effective_fps(&self, reported: f64) -> f64 {
        usable_fps(reported, self.default_fps)
    }

    /// Frames between consecutive motion samples (at least 1).
    pub fn sample_interval(&self, fps: f64) -> u64 {
        ((fps / self.samples_per_second) as u64).max(1)
    }

    /// Gaussian sigma matching the blur kernel size.
    pub fn blur_sigma(&self) -> f32 {
        let k = self.blur_kernel.max(1) as f32;
        0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
    }

    /// Check that all values are usable.
    pub fn validate(&self) -> MediaResult<()> {
        if !(self.samples_per_second > 0.0) {
            return Err(MediaError::invalid_config("samples_per_second must be positive"));
        }
        if !(self.default_fps > 0.0) {
            return Err(MediaError::invalid_config("default_fps must be positive"));
        }
        if self.min_rally_secs < 0.0 || self.idle_threshold_secs < 0.0 {
            return Err(MediaError::invalid_config(
                "rally and idle durations must not be negative",
            ));
        }
        if self.max_rally_secs < self.min_rally_secs {
            return Err(MediaError::invalid_config(
                "max_rally_secs must be at least min_rally_secs",
            ));
        }
        if self.active_std_factor < 0.0 || self.idle_std_factor < 0.0 {
            return Err(MediaError::invalid_config("threshold factors must not be negative"));
        }
        if !self.roi.is_valid() {
            return Err(MediaError::invalid_config(format!(
                "region of interest out of range: {:?}",
                self.roi
            )));
        }
        let fb = &self.fallback;
        if fb.min_gap_secs > fb.max_gap_secs || fb.min_len_secs > fb.max_len_secs {
            return Err(MediaError::invalid_config("fallback ranges are inverted"));
        }
        if fb.min_len_secs <= 0.0 {
            return Err(MediaError::invalid_config("fallback min_len_secs must be positive"));
        }
        let hp = &self.hit_points;
        if hp.min_rate > hp.max_rate || hp.frame_jitter < 0 {
            return Err(MediaError::invalid_config("hit point ranges are inverted"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SegmentationConfig::default();
        assert!((config.min_rally_secs - 2.0).abs() < f64::EPSILON);
        assert!((config.idle_threshold_secs - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.min_motion_samples, 10);
        assert_eq!(config.randomness, Randomness::ContentSeed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_effective_fps_substitutes_default() {
        let config = SegmentationConfig::default();
        assert_eq!(config.effective_fps(0.0), 30.0);
        assert_eq!(config.effective_fps(f64::NAN), 30.0);
        assert_eq!(config.effective_fps(25.0), 25.0);
        assert_eq!(config.effective_fps(f64::INFINITY), 30.0);
        assert_eq!(config.effective_fps(-25.0), 30.0);
    }

    #[test]
    fn test_sample_interval() {
        let config = SegmentationConfig::default();
        assert_eq!(config.sample_interval(30.0), 6);
        assert_eq!(config.sample_interval(60.0), 12);
        assert_eq!(config.sample_interval(24.0), 4);
        assert_eq!(config.sample_interval(3.0), 1);
    }

    #[test]
    fn test_blur_sigma_for_21_kernel() {
        let config = SegmentationConfig::default();
        assert!((config.blur_sigma() - 3.5).abs() < 1e-6);
    }

    #[test]
    fn test_roi_pixel_bounds() {
        let roi = RegionOfInterest::default();
        assert_eq!(roi.pixel_bounds(100, 50), (5, 45, 20, 80));
    }

    #[test]
    fn test_fallback_length_range() {
        let fb = FallbackConfig::default();
        assert_eq!(fb.length_range(120.0), (5.0, 30.0));
        assert_eq!(fb.length_range(600.0), (15.0, 40.0));
    }

    #[test]
    fn test_validate_rejects_bad_roi() {
        let mut config = SegmentationConfig::default();
        config.roi.top = 0.95;
        assert!(matches!(config.validate(), Err(MediaError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_pattern() {
        let config = SegmentationConfig::default()
            .with_idle_threshold_secs(1.5)
            .with_randomness(Randomness::Seed(7))
            .with_cancel_policy(CancelPolicy::ReturnPartial);

        assert!((config.idle_threshold_secs - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.randomness, Randomness::Seed(7));
        assert_eq!(config.cancel_policy, CancelPolicy::ReturnPartial);
    }

    #[test]
    fn test_randomness_serde() {
        let json = serde_json::to_string(&Randomness::Seed(42)).unwrap();
        assert_eq!(json, r#"{"mode":"seed","seed":42}"#);
        let mode: Randomness = serde_json::from_str(r#"{"mode":"disabled"}"#).unwrap();
        assert_eq!(mode, Randomness::Disabled);
    }
}
