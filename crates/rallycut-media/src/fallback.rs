//! Synthetic rally segmentation from video duration alone.
//!
//! Used when the motion signal is missing, too short, or yields no rallies.
//! Segments cover `[lead_in, duration - tail)`: each has a length drawn
//! around an average target and is followed by a random gap.

use rallycut_models::RallySegment;
use tracing::debug;

use crate::config::FallbackConfig;
use crate::jitter::JitterSource;

/// Generate evenly spread synthetic segments for `frame_count` frames.
///
/// A candidate that runs past the coverage end is clipped to it and kept only
/// if it still lasts `min_rally_secs`; generation stops there.
pub fn fallback_segments(
    frame_count: u64,
    fps: f64,
    config: &FallbackConfig,
    min_rally_secs: f64,
    jitter: &mut JitterSource,
) -> Vec<RallySegment> {
    if frame_count == 0 || !(fps > 0.0) {
        return Vec::new();
    }

    let duration = frame_count as f64 / fps;
    let coverage_end = duration - config.tail_secs;
    let (min_len, max_len) = config.length_range(duration);

    let mut segments = Vec::new();
    let mut current = config.lead_in_secs;

    while current < coverage_end {
        let length = jitter.uniform(min_len, max_len);
        let clipped = current + length > coverage_end;
        let end_time = if clipped { coverage_end } else { current + length };

        let start_frame = (current * fps) as u64;
        let end_frame = (end_time * fps) as u64;
        if end_frame >= frame_count {
            break;
        }

        match RallySegment::new(start_frame, end_frame, fps) {
            Ok(segment) if segment.duration() >= min_rally_secs => segments.push(segment),
            _ => {}
        }
        if clipped {
            break;
        }

        current = end_time + jitter.uniform(config.min_gap_secs, config.max_gap_secs);
    }

    debug!(
        duration,
        count = segments.len(),
        "Generated fallback rally segments"
    );
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    const FPS: f64 = 30.0;

    fn generate(duration_secs: f64, jitter: &mut JitterSource) -> Vec<RallySegment> {
        let frames = (duration_secs * FPS) as u64;
        fallback_segments(frames, FPS, &FallbackConfig::default(), 2.0, jitter)
    }

    #[test]
    fn test_disabled_jitter_is_regular() {
        let segments = generate(120.0, &mut JitterSource::disabled());

        // Length midpoint 17.5 s, gap midpoint 6.5 s
        assert_eq!(segments[0].start_frame(), 60);
        assert_eq!(segments[0].end_frame(), (19.5 * FPS) as u64);
        assert_eq!(segments[1].start_frame(), (26.0 * FPS) as u64);
        assert!(segments.len() >= 4);
    }

    #[test]
    fn test_segments_cover_video_without_overlap() {
        for seed in 0..20 {
            let mut jitter = JitterSource::seeded(seed);
            let duration = 600.0;
            let segments = generate(duration, &mut jitter);
            let config = FallbackConfig::default();

            assert!(!segments.is_empty());
            assert!((segments[0].start_time() - config.lead_in_secs).abs() < 0.05);
            for pair in segments.windows(2) {
                assert!(pair[0].precedes(&pair[1]));
                let gap = pair[1].start_time() - pair[0].end_time();
                assert!(gap <= config.max_gap_secs + 0.05, "gap {gap} too large");
            }
            let last = segments.last().unwrap();
            assert!(last.end_time() <= duration - config.tail_secs + 0.05);
            // A clipped final candidate under the rally minimum is dropped
            let earliest_end = duration - config.tail_secs - config.max_gap_secs - 2.0;
            assert!(last.end_time() >= earliest_end - 0.05);
        }
    }

    #[test]
    fn test_long_video_uses_longer_segments() {
        let segments = generate(1200.0, &mut JitterSource::seeded(3));
        // Long-video range is [15, 40] s; only a clipped final piece may be shorter
        assert!(segments[..segments.len() - 1]
            .iter()
            .all(|s| s.duration() >= 15.0 - 0.05 && s.duration() <= 40.0 + 0.05));
    }

    #[test]
    fn test_very_short_video_has_no_segments() {
        assert!(generate(6.0, &mut JitterSource::disabled()).is_empty());
        assert!(fallback_segments(0, FPS, &FallbackConfig::default(), 2.0, &mut JitterSource::disabled()).is_empty());
    }

    #[test]
    fn test_clipped_tail_respects_minimum() {
        // Coverage is [2, 15): one clipped 13 s segment
        let segments = generate(20.0, &mut JitterSource::disabled());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_frame(), 60);
        assert_eq!(segments[0].end_frame(), 450);
    }

    #[test]
    fn test_same_seed_same_segments() {
        let a = generate(900.0, &mut JitterSource::seeded(42));
        let b = generate(900.0, &mut JitterSource::seeded(42));
        assert_eq!(a, b);
    }
}
