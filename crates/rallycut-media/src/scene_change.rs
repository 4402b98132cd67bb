//! Hard cut detection.
//!
//! Broadcast footage interleaves replays, crowd shots and graphics with the
//! court view. A large mean luma difference between sparse samples marks a
//! cut; callers use these to explain gaps or discard off-court sections.

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::config::{usable_fps, DEFAULT_FPS};
use crate::error::{MediaError, MediaResult};
use crate::frame::{FrameSource, ReadStep, SequentialReader};

/// Default mean absolute difference that counts as a cut.
pub const DEFAULT_SCENE_THRESHOLD: f64 = 30.0;

/// Frames skipped between compared samples.
pub const DEFAULT_SCENE_SKIP: u64 = 5;

/// A detected scene change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneChange {
    pub frame_index: u64,
    pub time_seconds: f64,
    /// Mean absolute luma difference to the previous sample.
    pub difference: f64,
}

/// Scene change detection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneChangeConfig {
    pub threshold: f64,
    pub skip_frames: u64,
}

impl Default for SceneChangeConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SCENE_THRESHOLD,
            skip_frames: DEFAULT_SCENE_SKIP,
        }
    }
}

/// Scan a source for hard cuts, comparing every `skip_frames + 1`-th frame.
///
/// Returns [`MediaError::Cancelled`] if the signal fires mid-scan.
pub fn detect_scene_changes<S: FrameSource + ?Sized>(
    source: &mut S,
    config: &SceneChangeConfig,
    cancel_rx: Option<watch::Receiver<bool>>,
) -> MediaResult<Vec<SceneChange>> {
    let fps = usable_fps(source.fps(), DEFAULT_FPS);
    let mut reader = SequentialReader::new(source, config.skip_frames + 1).with_cancel(cancel_rx);

    let mut changes = Vec::new();
    let mut prev: Option<GrayImage> = None;

    loop {
        let frame = match reader.advance()? {
            ReadStep::Frame(frame) => frame,
            ReadStep::End => break,
            ReadStep::Cancelled => return Err(MediaError::Cancelled),
        };

        if let Some(ref previous) = prev {
            let difference = mean_abs_diff(previous, &frame.image)?;
            if difference > config.threshold {
                debug!(frame = frame.index, difference, "Scene change");
                changes.push(SceneChange {
                    frame_index: frame.index,
                    time_seconds: frame.index as f64 / fps,
                    difference,
                });
            }
        }
        prev = Some(frame.image);
    }

    Ok(changes)
}

fn mean_abs_diff(a: &GrayImage, b: &GrayImage) -> MediaResult<f64> {
    if a.dimensions() != b.dimensions() {
        return Err(MediaError::frame_decode(format!(
            "frame size changed from {:?} to {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }
    let pixels = a.as_raw().len();
    if pixels == 0 {
        return Ok(0.0);
    }
    let total: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(x, y)| x.abs_diff(*y) as u64)
        .sum();
    Ok(total as f64 / pixels as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MemoryFrameSource;
    use image::Luma;

    #[test]
    fn test_detects_single_cut() {
        // Dark court for 60 frames, then a bright replay graphic
        let mut source = MemoryFrameSource::from_fn(120, 30.0, 8, 8, |i| {
            GrayImage::from_pixel(8, 8, Luma([if i < 60 { 20 } else { 200 }]))
        });

        let changes = detect_scene_changes(&mut source, &SceneChangeConfig::default(), None).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].frame_index, 60);
        assert!((changes[0].time_seconds - 2.0).abs() < 1e-9);
        assert!((changes[0].difference - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_unusable_fps_times_at_default_rate() {
        for fps in [0.0, f64::NAN, f64::INFINITY] {
            let mut source = MemoryFrameSource::from_fn(120, fps, 8, 8, |i| {
                GrayImage::from_pixel(8, 8, Luma([if i < 60 { 20 } else { 200 }]))
            });
            let changes =
                detect_scene_changes(&mut source, &SceneChangeConfig::default(), None).unwrap();
            assert_eq!(changes.len(), 1);
            assert!((changes[0].time_seconds - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_small_changes_ignored() {
        let mut source = MemoryFrameSource::from_fn(60, 30.0, 8, 8, |i| {
            GrayImage::from_pixel(8, 8, Luma([100 + (i % 20) as u8]))
        });
        let changes = detect_scene_changes(&mut source, &SceneChangeConfig::default(), None).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_cancelled_scan() {
        let mut source = MemoryFrameSource::from_fn(60, 30.0, 8, 8, |_| GrayImage::new(8, 8));
        let (_tx, rx) = watch::channel(true);
        let err = detect_scene_changes(&mut source, &SceneChangeConfig::default(), Some(rx)).unwrap_err();
        assert!(err.is_cancelled());
    }
}
