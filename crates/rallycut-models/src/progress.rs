//! Progress events streamed to UI/transport collaborators.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A progress notification.
///
/// Percent values are non-decreasing over one analysis; the stream ends with a
/// `Progress` at 100 or a `Failed` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Progress update (0-100)
    Progress { percent: u8, message: String },

    /// Analysis failed
    Failed {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl ProgressEvent {
    pub fn progress(percent: u8, message: impl Into<String>) -> Self {
        Self::Progress {
            percent: percent.min(100),
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn percent(&self) -> Option<u8> {
        match self {
            ProgressEvent::Progress { percent, .. } => Some(*percent),
            ProgressEvent::Failed { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ProgressEvent::Progress { message, .. } | ProgressEvent::Failed { message, .. } => {
                message
            }
        }
    }

    /// Whether no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        match self {
            ProgressEvent::Progress { percent, .. } => *percent >= 100,
            ProgressEvent::Failed { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_clamped() {
        assert_eq!(ProgressEvent::progress(140, "x").percent(), Some(100));
    }

    #[test]
    fn test_terminal_events() {
        assert!(!ProgressEvent::progress(50, "half").is_terminal());
        assert!(ProgressEvent::progress(100, "done").is_terminal());
        assert!(ProgressEvent::failed("boom").is_terminal());
    }

    #[test]
    fn test_tagged_serialization() {
        let json = serde_json::to_value(ProgressEvent::progress(40, "Motion analysis complete")).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["percent"], 40);
    }
}
