use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use common::HttpError;

use crate::config::TrackingConfig;
use crate::error::TrackingError;
use crate::mlflow::client::MlflowClient;
use crate::run::{ArtifactLogger, RunId, Tracker};

struct Binding {
    client: MlflowClient,
    experiment_id: String,
}

/// [`Tracker`] that forwards every call to an MLflow server.
///
/// Nothing is contacted until the first operation. Binding then resolves the
/// configured experiment, creating it if the server does not know it, and the
/// experiment id is reused for every later run.
pub struct MlflowTracker {
    config: TrackingConfig,
    binding: OnceCell<Binding>,
    /// Runs started here, mapped to whether they are still active.
    runs: RwLock<HashMap<RunId, bool>>,
}

impl MlflowTracker {
    pub fn new(config: TrackingConfig) -> Result<Self, TrackingError> {
        if !(config.timeout.is_finite() && config.timeout > 0.0) {
            return Err(TrackingError::InvalidConfig(format!(
                "timeout must be positive, got {}",
                config.timeout
            )));
        }
        Ok(Self {
            config,
            binding: OnceCell::new(),
            runs: RwLock::default(),
        })
    }

    pub fn experiment_name(&self) -> &str {
        &self.config.experiment_name
    }

    /// Experiment id, once the tracker has bound.
    pub fn experiment_id(&self) -> Option<&str> {
        self.binding.get().map(|b| b.experiment_id.as_str())
    }

    async fn bind(&self) -> Result<&Binding, TrackingError> {
        self.binding
            .get_or_try_init(|| async {
                let uri = self.config.tracking_uri().ok_or_else(|| {
                    TrackingError::ClientUnavailable("no tracking_uri configured".into())
                })?;
                let client = MlflowClient::new(uri, self.config.timeout)?;
                let experiment_id = resolve_experiment(&client, &self.config.experiment_name)
                    .await
                    .map_err(unavailable_on_connect)?;
                info!(
                    tracking_uri = uri,
                    experiment = %self.config.experiment_name,
                    experiment_id = %experiment_id,
                    "bound to mlflow"
                );
                Ok::<_, TrackingError>(Binding {
                    client,
                    experiment_id,
                })
            })
            .await
    }

    fn is_active(&self, run: &RunId) -> bool {
        self.runs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(run)
            .copied()
            .unwrap_or(false)
    }

    fn require_active(&self, run: &RunId) -> Result<(), TrackingError> {
        if self.is_active(run) {
            Ok(())
        } else {
            Err(TrackingError::NoActiveRun(run.clone()))
        }
    }

    fn set_active(&self, run: &RunId, active: bool) {
        self.runs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(run.clone(), active);
    }
}

async fn resolve_experiment(client: &MlflowClient, name: &str) -> Result<String, TrackingError> {
    if let Some(experiment) = client.get_experiment_by_name(name).await? {
        return Ok(experiment.experiment_id);
    }
    debug!(experiment = name, "experiment not found, creating");
    client.create_experiment(name).await
}

fn unavailable_on_connect(err: TrackingError) -> TrackingError {
    match err {
        TrackingError::Http(HttpError::Connection(reason)) => TrackingError::ClientUnavailable(reason),
        other => other,
    }
}

#[async_trait]
impl Tracker for MlflowTracker {
    async fn start_run(&self) -> Result<RunId, TrackingError> {
        let binding = self.bind().await?;
        let run = binding.client.create_run(&binding.experiment_id).await?;
        self.set_active(&run, true);
        debug!(run_id = %run, "mlflow run started");
        Ok(run)
    }

    async fn log_param(&self, run: &RunId, name: &str, value: Value) -> Result<(), TrackingError> {
        self.require_active(run)?;
        let binding = self.bind().await?;
        binding.client.log_parameter(run, name, &value).await
    }

    async fn log_metric(&self, run: &RunId, name: &str, value: f64) -> Result<(), TrackingError> {
        self.require_active(run)?;
        let binding = self.bind().await?;
        binding.client.log_metric(run, name, value).await
    }

    async fn close_run(&self, run: &RunId) -> Result<(), TrackingError> {
        let known = self
            .runs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(run)
            .copied();
        match known {
            None => Err(TrackingError::UnknownRun(run.clone())),
            Some(false) => Ok(()),
            Some(true) => {
                let binding = self.bind().await?;
                binding.client.finish_run(run).await?;
                self.set_active(run, false);
                debug!(run_id = %run, "mlflow run finished");
                Ok(())
            }
        }
    }

    fn artifacts(&self) -> Option<&dyn ArtifactLogger> {
        Some(self)
    }

    fn tracking_uri(&self) -> Option<&str> {
        self.config.tracking_uri()
    }
}

#[async_trait]
impl ArtifactLogger for MlflowTracker {
    async fn log_artifact(&self, run: &RunId, path: &Path) -> Result<(), TrackingError> {
        self.require_active(run)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| TrackingError::InvalidArtifact(path.to_path_buf()))?;
        let contents = tokio::fs::read(path).await?;
        let binding = self.bind().await?;
        binding
            .client
            .upload_artifact(&binding.experiment_id, run, file_name, contents)
            .await
    }
}
