//! Structured analysis logging.
//!
//! Lifecycle log lines for one analysis run, carrying the run's identifier
//! and operation as tracing fields.

use rallycut_models::ProgressEvent;
use tracing::{error, info, warn, Span};
use uuid::Uuid;

/// Logger bound to one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisLogger {
    analysis_id: String,
    operation: String,
}

impl AnalysisLogger {
    /// Create a logger for a specific run and operation.
    ///
    /// # Arguments
    /// * `analysis_id` - The unique identifier for the run
    /// * `operation` - The type of operation (e.g., "rally_segmentation")
    pub fn new(analysis_id: &Uuid, operation: &str) -> Self {
        Self {
            analysis_id: analysis_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn from_string(analysis_id: &str, operation: &str) -> Self {
        Self {
            analysis_id: analysis_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            "Analysis started: {}", message
        );
    }

    pub fn log_progress(&self, percent: u8, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            percent,
            "Analysis progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            "Analysis warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            "Analysis error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            "Analysis completed: {}", message
        );
    }

    /// Log one engine progress event at the matching level.
    pub fn log_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Progress { percent, message } => self.log_progress(*percent, message),
            ProgressEvent::Failed { message, .. } => self.log_error(message),
        }
    }

    pub fn analysis_id(&self) -> &str {
        &self.analysis_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "analysis",
            analysis_id = %self.analysis_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_creation() {
        let id = Uuid::new_v4();
        let logger = AnalysisLogger::new(&id, "rally_segmentation");

        assert_eq!(logger.analysis_id(), id.to_string());
        assert_eq!(logger.operation(), "rally_segmentation");
    }

    #[test]
    fn test_logger_from_string() {
        let logger = AnalysisLogger::from_string("match-42", "scene_changes");

        assert_eq!(logger.analysis_id(), "match-42");
        assert_eq!(logger.operation(), "scene_changes");
        logger.log_event(&ProgressEvent::progress(10, "Analyzing motion"));
    }
}
