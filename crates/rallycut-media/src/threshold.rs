//! Adaptive active/idle thresholds.
//!
//! Thresholds sit above and below the mean of the smoothed series by a
//! multiple of its population standard deviation. Samples between them are
//! neither active nor idle, which keeps the boundary state machine from
//! flapping on borderline motion.

use rallycut_models::ThresholdSummary;

use crate::config::SegmentationConfig;

/// Per-sample motion class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Active,
    Idle,
    /// Inside the hysteresis band.
    Neutral,
}

/// Thresholds derived from one smoothed series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub mean: f64,
    pub std_dev: f64,
    pub active: f64,
    pub idle: f64,
}

impl Thresholds {
    /// Derive thresholds, or `None` for an empty series.
    pub fn from_smoothed(values: &[f64], config: &SegmentationConfig) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mean = mean(values);
        let std_dev = population_std(values, mean);

        Some(Self {
            mean,
            std_dev,
            active: mean + config.active_std_factor * std_dev,
            idle: mean - config.idle_std_factor * std_dev,
        })
    }

    pub fn classify(&self, value: f64) -> Classification {
        if value > self.active {
            Classification::Active
        } else if value < self.idle {
            Classification::Idle
        } else {
            Classification::Neutral
        }
    }

    pub fn classify_all(&self, values: &[f64]) -> Vec<Classification> {
        values.iter().map(|v| self.classify(*v)).collect()
    }

    pub fn summary(&self) -> ThresholdSummary {
        ThresholdSummary {
            mean: self.mean,
            std_dev: self.std_dev,
            active: self.active,
            idle: self.idle,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64], mean: f64) -> f64 {
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_statistics() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let t = Thresholds::from_smoothed(&values, &SegmentationConfig::default()).unwrap();

        assert!((t.mean - 5.0).abs() < 1e-12);
        assert!((t.std_dev - 2.0).abs() < 1e-12);
        assert!((t.active - 6.0).abs() < 1e-12);
        assert!((t.idle - 4.4).abs() < 1e-12);
    }

    #[test]
    fn test_hysteresis_band() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let t = Thresholds::from_smoothed(&values, &SegmentationConfig::default()).unwrap();

        assert_eq!(t.classify(6.5), Classification::Active);
        assert_eq!(t.classify(6.0), Classification::Neutral);
        assert_eq!(t.classify(5.0), Classification::Neutral);
        assert_eq!(t.classify(4.4), Classification::Neutral);
        assert_eq!(t.classify(4.0), Classification::Idle);
    }

    #[test]
    fn test_flat_series_has_no_active_samples() {
        let values = vec![3.0; 20];
        let t = Thresholds::from_smoothed(&values, &SegmentationConfig::default()).unwrap();
        assert!(t
            .classify_all(&values)
            .iter()
            .all(|c| *c == Classification::Neutral));
    }

    #[test]
    fn test_empty_series() {
        assert!(Thresholds::from_smoothed(&[], &SegmentationConfig::default()).is_none());
    }
}
