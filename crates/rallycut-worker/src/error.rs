//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Analysis task failed: {0}")]
    TaskFailed(String),

    #[error("Media error: {0}")]
    Media(#[from] rallycut_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Check if the analysis stopped because the caller cancelled it.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WorkerError::Media(e) if e.is_cancelled())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkerError::ConfigError(_) | WorkerError::InvalidArgument(_) => 2,
            _ if self.is_cancelled() => 130,
            _ => 1,
        }
    }
}
