//! Rally segmentation worker.
//!
//! This crate provides:
//! - Environment-driven configuration
//! - A single analysis run with progress forwarded to the log
//! - Cooperative cancellation
//! - Structured lifecycle logging

pub mod analysis;
pub mod config;
pub mod error;
pub mod logging;

pub use analysis::{run_analysis, AnalysisOutput};
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::AnalysisLogger;
