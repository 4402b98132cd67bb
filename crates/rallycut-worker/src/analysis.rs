//! One analysis run: segmentation plus optional scene change scan.

use std::path::{Path, PathBuf};

use rallycut_media::{
    analyze_video, detect_scene_changes, progress, FfmpegFrameSource, SceneChange,
    SceneChangeConfig,
};
use rallycut_models::SegmentationReport;
use serde::Serialize;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::AnalysisLogger;

/// Everything the worker prints for one video.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub analysis_id: Uuid,
    pub video: PathBuf,
    pub report: SegmentationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_changes: Option<Vec<SceneChange>>,
}

/// Analyze `path`, forwarding engine progress to the log.
pub async fn run_analysis(
    path: impl AsRef<Path>,
    config: &WorkerConfig,
    cancel_rx: Option<watch::Receiver<bool>>,
) -> WorkerResult<AnalysisOutput> {
    let path = path.as_ref().to_path_buf();
    if path.as_os_str().is_empty() {
        return Err(WorkerError::invalid_argument("video path is empty"));
    }

    let analysis_id = Uuid::new_v4();
    let logger = AnalysisLogger::new(&analysis_id, "rally_segmentation");
    let span = logger.create_span();
    logger.log_start(&path.display().to_string());

    let (sender, mut receiver) = progress::channel(config.progress_capacity);
    let forward_logger = logger.clone();
    let forwarder = tokio::spawn(
        async move {
            while let Some(event) = receiver.recv().await {
                forward_logger.log_event(&event);
            }
        }
        .instrument(span.clone()),
    );

    let result = analyze_video(
        &path,
        config.segmentation.clone(),
        Some(sender),
        cancel_rx.clone(),
    )
    .instrument(span.clone())
    .await;

    // All senders are gone once the run returns
    let _ = forwarder.await;

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            logger.log_error(&e.to_string());
            return Err(e.into());
        }
    };

    if let Some(reason) = report.fallback_reason {
        logger.log_warning(&format!("used fallback segmentation: {}", reason));
    }
    if let Some(frame) = report.truncated_at_frame {
        logger.log_warning(&format!("video ended early at frame {}", frame));
    }

    let scene_changes = if config.scene_changes {
        Some(scan_scene_changes(path.clone(), cancel_rx).instrument(span).await?)
    } else {
        None
    };

    logger.log_completion(&format!(
        "{} rallies over {:.1}s",
        report.rally_count(),
        report.duration
    ));

    Ok(AnalysisOutput {
        analysis_id,
        video: path,
        report,
        scene_changes,
    })
}

async fn scan_scene_changes(
    path: PathBuf,
    cancel_rx: Option<watch::Receiver<bool>>,
) -> WorkerResult<Vec<SceneChange>> {
    tokio::task::spawn_blocking(move || {
        let mut source = FfmpegFrameSource::open(&path)?;
        detect_scene_changes(&mut source, &SceneChangeConfig::default(), cancel_rx)
    })
    .await
    .map_err(|e| WorkerError::TaskFailed(e.to_string()))?
    .map_err(WorkerError::from)
}
