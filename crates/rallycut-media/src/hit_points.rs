//! Placeholder shot-event estimation.
//!
//! **This is not a detector.** Hit points are spread evenly across a rally at
//! a plausible shot rate, with small frame jitter, alternating players and
//! positions drawn from each player's half of the frame. Shot classification
//! consumes them as rough anchors; nothing here reflects where the shuttle
//! actually was.

use rallycut_models::{HitPoint, Player, RallySegment};

use crate::config::HitPointConfig;
use crate::jitter::JitterSource;

/// Estimate hit points for one rally.
pub fn estimate_hit_points(
    segment: &RallySegment,
    fps: f64,
    dimensions: (u32, u32),
    config: &HitPointConfig,
    jitter: &mut JitterSource,
) -> Vec<HitPoint> {
    let (width, height) = (dimensions.0 as f64, dimensions.1 as f64);
    let start = segment.start_frame() as i64;
    let end = segment.end_frame() as i64;

    let rate = jitter.uniform(config.min_rate, config.max_rate);
    let count = ((segment.duration() * rate) as usize).max(config.min_hits);
    let spacing = segment.frame_span() as f64 / (count + 1) as f64;

    (0..count)
        .map(|i| {
            let base = (start as f64 + spacing * (i + 1) as f64) as i64;
            let frame = (base + jitter.int_inclusive(-config.frame_jitter, config.frame_jitter))
                .clamp(start, end) as u64;

            let player = Player::for_shot(i);
            let band = match player {
                Player::A => config.near_band,
                Player::B => config.far_band,
            };
            let x = width * jitter.uniform(config.x_band.0, config.x_band.1);
            let y = height * jitter.uniform(band.0, band.1);

            HitPoint {
                frame_index: frame,
                time_seconds: frame as f64 / fps,
                x,
                y,
                player_label: player,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start_secs: f64, end_secs: f64) -> RallySegment {
        RallySegment::new((start_secs * 30.0) as u64, (end_secs * 30.0) as u64, 30.0).unwrap()
    }

    #[test]
    fn test_disabled_jitter_spacing() {
        let seg = segment(10.0, 20.0); // frames 300..600
        let hits = estimate_hit_points(
            &seg,
            30.0,
            (1280, 720),
            &HitPointConfig::default(),
            &mut JitterSource::disabled(),
        );

        // Rate midpoint 0.85/s over 10 s -> 8 events, 300/9 frames apart
        assert_eq!(hits.len(), 8);
        assert_eq!(hits[0].frame_index, 333);
        assert_eq!(hits[0].player_label, Player::A);
        assert_eq!(hits[1].player_label, Player::B);
        assert!((hits[0].x - 640.0).abs() < 1e-9);
        assert!((hits[0].y - 720.0 * 0.725).abs() < 1e-9);
        assert!((hits[1].y - 720.0 * 0.275).abs() < 1e-9);
    }

    #[test]
    fn test_minimum_two_hits() {
        let seg = segment(0.0, 2.1);
        let hits = estimate_hit_points(
            &seg,
            30.0,
            (640, 360),
            &HitPointConfig::default(),
            &mut JitterSource::seeded(5),
        );
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_hits_stay_inside_rally_and_bands() {
        let config = HitPointConfig::default();
        let seg = segment(1.0, 41.0);
        for seed in 0..10 {
            let hits = estimate_hit_points(&seg, 30.0, (1000, 1000), &config, &mut JitterSource::seeded(seed));
            assert!(hits.len() >= 20 && hits.len() <= 48);
            for hit in &hits {
                assert!(hit.frame_index >= seg.start_frame() && hit.frame_index <= seg.end_frame());
                assert!((250.0..750.0).contains(&hit.x));
                match hit.player_label {
                    Player::A => assert!((600.0..850.0).contains(&hit.y)),
                    Player::B => assert!((150.0..400.0).contains(&hit.y)),
                }
            }
        }
    }
}
