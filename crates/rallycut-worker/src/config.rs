//! Worker configuration.

use rallycut_media::config::{
    CancelPolicy, Randomness, SegmentationConfig, IDLE_THRESHOLD, MIN_RALLY_DURATION,
};
use rallycut_media::progress::DEFAULT_CAPACITY;

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Engine settings for each analysis
    pub segmentation: SegmentationConfig,
    /// Progress channel capacity; events beyond it are dropped
    pub progress_capacity: usize,
    /// Also scan for scene changes after segmentation
    pub scene_changes: bool,
    /// Pretty-print the JSON report
    pub pretty_output: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            segmentation: SegmentationConfig::default(),
            progress_capacity: DEFAULT_CAPACITY,
            scene_changes: false,
            pretty_output: false,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> WorkerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SegmentationConfig::default();

        let mut segmentation = defaults
            .clone()
            .with_samples_per_second(
                lookup("RALLYCUT_SAMPLES_PER_SECOND")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.samples_per_second),
            )
            .with_min_rally_secs(
                lookup("RALLYCUT_MIN_RALLY_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(MIN_RALLY_DURATION),
            )
            .with_idle_threshold_secs(
                lookup("RALLYCUT_IDLE_THRESHOLD_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(IDLE_THRESHOLD),
            )
            .with_split_long_rallies(
                lookup("RALLYCUT_SPLIT_LONG_RALLIES")
                    .map(|s| parse_flag(&s))
                    .unwrap_or(false),
            )
            .with_randomness(parse_randomness(
                lookup("RALLYCUT_RANDOMNESS").as_deref(),
                lookup("RALLYCUT_SEED").as_deref(),
            )?);

        if let Some(policy) = lookup("RALLYCUT_CANCEL_POLICY") {
            segmentation = segmentation.with_cancel_policy(parse_cancel_policy(&policy)?);
        }

        segmentation
            .validate()
            .map_err(|e| WorkerError::config_error(e.to_string()))?;

        Ok(Self {
            segmentation,
            progress_capacity: lookup("RALLYCUT_PROGRESS_CAPACITY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
            scene_changes: lookup("RALLYCUT_SCENE_CHANGES")
                .map(|s| parse_flag(&s))
                .unwrap_or(false),
            pretty_output: lookup("RALLYCUT_PRETTY")
                .map(|s| parse_flag(&s))
                .unwrap_or(false),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// A seed on its own implies seeded mode.
fn parse_randomness(mode: Option<&str>, seed: Option<&str>) -> WorkerResult<Randomness> {
    let seed = seed
        .map(|s| {
            s.trim()
                .parse::<u64>()
                .map_err(|_| WorkerError::config_error(format!("RALLYCUT_SEED is not a u64: {}", s)))
        })
        .transpose()?;

    match (mode.map(|m| m.trim().to_lowercase()), seed) {
        (None, None) => Ok(Randomness::default()),
        (None, Some(seed)) => Ok(Randomness::Seed(seed)),
        (Some(mode), seed) => match mode.as_str() {
            "content" | "content_seed" => Ok(Randomness::ContentSeed),
            "entropy" => Ok(Randomness::Entropy),
            "disabled" | "off" => Ok(Randomness::Disabled),
            "seed" => seed.map(Randomness::Seed).ok_or_else(|| {
                WorkerError::config_error("RALLYCUT_RANDOMNESS=seed requires RALLYCUT_SEED")
            }),
            other => Err(WorkerError::config_error(format!(
                "unknown RALLYCUT_RANDOMNESS mode: {}",
                other
            ))),
        },
    }
}

fn parse_cancel_policy(value: &str) -> WorkerResult<CancelPolicy> {
    match value.trim().to_lowercase().as_str() {
        "fail" => Ok(CancelPolicy::Fail),
        "partial" | "return_partial" => Ok(CancelPolicy::ReturnPartial),
        other => Err(WorkerError::config_error(format!(
            "unknown RALLYCUT_CANCEL_POLICY: {}",
            other
        ))),
    }
}
