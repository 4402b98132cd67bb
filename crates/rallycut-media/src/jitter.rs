//! Randomness used by the heuristic stages.
//!
//! Fallback segmentation and hit point estimation are the only places where
//! randomness shapes the output. Both draw from a [`JitterSource`] so a run
//! can be made reproducible (seeded) or fully deterministic (disabled).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Randomness;

/// Uniform draws from a seeded RNG, or range midpoints when disabled.
#[derive(Debug, Clone)]
pub struct JitterSource {
    rng: Option<StdRng>,
}

impl JitterSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn entropy() -> Self {
        Self {
            rng: Some(StdRng::from_os_rng()),
        }
    }

    /// Every draw returns the midpoint of its range.
    pub fn disabled() -> Self {
        Self { rng: None }
    }

    /// Resolve a [`Randomness`] mode. `content_seed` is used for
    /// [`Randomness::ContentSeed`]; without one the source is disabled.
    ///
    /// Returns the source and the seed it was built from, if any.
    pub fn from_mode(mode: Randomness, content_seed: Option<u64>) -> (Self, Option<u64>) {
        match mode {
            Randomness::Seed(seed) => (Self::seeded(seed), Some(seed)),
            Randomness::ContentSeed => match content_seed {
                Some(seed) => (Self::seeded(seed), Some(seed)),
                None => (Self::disabled(), None),
            },
            Randomness::Entropy => (Self::entropy(), None),
            Randomness::Disabled => (Self::disabled(), None),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.rng.is_none()
    }

    /// Uniform float in `[low, high)`.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        match self.rng.as_mut() {
            Some(rng) => rng.random_range(low..high),
            None => (low + high) / 2.0,
        }
    }

    /// Uniform integer in `[low, high]`.
    pub fn int_inclusive(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        match self.rng.as_mut() {
            Some(rng) => rng.random_range(low..=high),
            None => low + (high - low) / 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_returns_midpoints() {
        let mut jitter = JitterSource::disabled();
        assert_eq!(jitter.uniform(3.0, 10.0), 6.5);
        assert_eq!(jitter.int_inclusive(-5, 5), 0);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = JitterSource::seeded(1234);
        let mut b = JitterSource::seeded(1234);
        let xs: Vec<f64> = (0..10).map(|_| a.uniform(0.0, 1.0)).collect();
        let ys: Vec<f64> = (0..10).map(|_| b.uniform(0.0, 1.0)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_draws_stay_in_range() {
        let mut jitter = JitterSource::seeded(7);
        for _ in 0..200 {
            let x = jitter.uniform(5.0, 30.0);
            assert!((5.0..30.0).contains(&x));
            let n = jitter.int_inclusive(-5, 5);
            assert!((-5..=5).contains(&n));
        }
    }

    #[test]
    fn test_empty_range() {
        let mut jitter = JitterSource::seeded(7);
        assert_eq!(jitter.uniform(4.0, 4.0), 4.0);
        assert_eq!(jitter.int_inclusive(2, 2), 2);
    }

    #[test]
    fn test_content_seed_without_seed_is_disabled() {
        let (jitter, seed) = JitterSource::from_mode(Randomness::ContentSeed, None);
        assert!(jitter.is_disabled());
        assert!(seed.is_none());

        let (jitter, seed) = JitterSource::from_mode(Randomness::ContentSeed, Some(99));
        assert!(!jitter.is_disabled());
        assert_eq!(seed, Some(99));
    }
}
