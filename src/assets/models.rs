use std::path::PathBuf;

use common::{BasePath, MaterializeResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use tracking::{RunId, Tracker};

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainSummary {
    pub run_id: RunId,
    pub status: String,
}

/// Placeholder training step: one run with a fixed parameter and metric.
///
/// A JSON summary is attached as an artifact when the tracker supports it.
/// Artifact failures are logged and do not fail the asset.
pub async fn train_model_stub(
    tracker: &dyn Tracker,
    base_path: &BasePath,
) -> Result<MaterializeResult<TrainSummary>, PipelineError> {
    let run = tracker.start_run().await?;
    tracker.log_param(&run, "n_estimators", json!(10)).await?;
    tracker.log_metric(&run, "rmse", 0.123).await?;
    log_summary_artifact(tracker, base_path, &run).await;
    tracker.close_run(&run).await?;
    info!(run_id = %run, "completed train_model_stub");

    let summary = TrainSummary {
        run_id: run.clone(),
        status: "ok".to_string(),
    };
    Ok(MaterializeResult::new(summary).with_metadata("run_id", run.to_string()))
}

async fn log_summary_artifact(tracker: &dyn Tracker, base_path: &BasePath, run: &RunId) {
    let Some(logger) = tracker.artifacts() else {
        debug!(run_id = %run, "tracker does not log artifacts");
        return;
    };
    let path = match write_summary(base_path, run) {
        Ok(path) => path,
        Err(err) => {
            warn!(run_id = %run, error = %err, "could not write run summary");
            return;
        }
    };
    if let Err(err) = logger.log_artifact(run, &path).await {
        warn!(run_id = %run, error = %err, "artifact upload skipped");
    }
}

fn write_summary(base_path: &BasePath, run: &RunId) -> std::io::Result<PathBuf> {
    let dir = base_path.ensure_dir(["artifacts", run.as_str()])?;
    let path = dir.join("summary.json");
    let body = json!({ "model": "stub", "n_estimators": 10, "rmse": 0.123 });
    std::fs::write(&path, body.to_string())?;
    Ok(path)
}
