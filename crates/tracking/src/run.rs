use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TrackingError;

/// Handle for one tracked run, returned by [`Tracker::start_run`].
///
/// Every logging call names the run it targets, so overlapping runs never
/// compete for an implicit "current" run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        RunId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(id: &str) -> Self {
        RunId::new(id)
    }
}

impl From<String> for RunId {
    fn from(id: String) -> Self {
        RunId(id)
    }
}

/// Experiment tracking backend.
#[async_trait]
pub trait Tracker: Send + Sync {
    async fn start_run(&self) -> Result<RunId, TrackingError>;

    async fn log_param(&self, run: &RunId, name: &str, value: Value) -> Result<(), TrackingError>;

    async fn log_metric(&self, run: &RunId, name: &str, value: f64) -> Result<(), TrackingError>;

    /// Mark `run` finished. Closing an already closed run is a no-op.
    async fn close_run(&self, run: &RunId) -> Result<(), TrackingError>;

    /// Artifact upload, for backends that support it.
    fn artifacts(&self) -> Option<&dyn ArtifactLogger> {
        None
    }

    /// Where the backend lives, for display only.
    fn tracking_uri(&self) -> Option<&str> {
        None
    }
}

/// Optional [`Tracker`] capability for attaching files to a run.
#[async_trait]
pub trait ArtifactLogger: Send + Sync {
    async fn log_artifact(&self, run: &RunId, path: &Path) -> Result<(), TrackingError>;
}
