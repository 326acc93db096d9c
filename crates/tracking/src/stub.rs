use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::TrackingError;
use crate::run::{ArtifactLogger, RunId, Tracker};

/// Everything recorded against one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedRun {
    pub run_id: RunId,
    pub params: BTreeMap<String, Value>,
    pub metrics: BTreeMap<String, f64>,
    pub artifacts: Vec<PathBuf>,
    pub active: bool,
}

impl TrackedRun {
    fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            artifacts: Vec::new(),
            active: true,
        }
    }
}

/// In-memory tracker used when no tracking server is configured.
///
/// Run ids are `run-1`, `run-2`, ... in start order. Artifacts are recorded by
/// path; the file itself is never read.
#[derive(Debug, Default)]
pub struct StubTracker {
    tracking_uri: Option<String>,
    runs: RwLock<Vec<TrackedRun>>,
}

impl StubTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stub that reports `uri` as its location. Nothing connects to it.
    pub fn with_tracking_uri(uri: Option<String>) -> Self {
        Self {
            tracking_uri: uri,
            runs: RwLock::default(),
        }
    }

    /// Snapshot of every run in start order.
    pub fn runs(&self) -> Vec<TrackedRun> {
        self.read().clone()
    }

    pub fn run(&self, run: &RunId) -> Option<TrackedRun> {
        self.read().iter().find(|r| &r.run_id == run).cloned()
    }

    /// The most recently started run that is still active.
    pub fn active_run(&self) -> Option<TrackedRun> {
        self.read().iter().rev().find(|r| r.active).cloned()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<TrackedRun>> {
        self.runs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<TrackedRun>> {
        self.runs.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_active<F>(&self, run: &RunId, update: F) -> Result<(), TrackingError>
    where
        F: FnOnce(&mut TrackedRun),
    {
        let mut runs = self.write();
        match runs.iter_mut().find(|r| &r.run_id == run && r.active) {
            Some(tracked) => {
                update(tracked);
                Ok(())
            }
            None => Err(TrackingError::NoActiveRun(run.clone())),
        }
    }
}

#[async_trait]
impl Tracker for StubTracker {
    async fn start_run(&self) -> Result<RunId, TrackingError> {
        let mut runs = self.write();
        let run_id = RunId::new(format!("run-{}", runs.len() + 1));
        runs.push(TrackedRun::new(run_id.clone()));
        debug!(run_id = %run_id, "stub run started");
        Ok(run_id)
    }

    async fn log_param(&self, run: &RunId, name: &str, value: Value) -> Result<(), TrackingError> {
        self.with_active(run, |tracked| {
            tracked.params.insert(name.to_string(), value);
        })
    }

    async fn log_metric(&self, run: &RunId, name: &str, value: f64) -> Result<(), TrackingError> {
        self.with_active(run, |tracked| {
            tracked.metrics.insert(name.to_string(), value);
        })
    }

    async fn close_run(&self, run: &RunId) -> Result<(), TrackingError> {
        let mut runs = self.write();
        let tracked = runs
            .iter_mut()
            .find(|r| &r.run_id == run)
            .ok_or_else(|| TrackingError::UnknownRun(run.clone()))?;
        tracked.active = false;
        debug!(run_id = %run, "stub run closed");
        Ok(())
    }

    fn artifacts(&self) -> Option<&dyn ArtifactLogger> {
        Some(self)
    }

    fn tracking_uri(&self) -> Option<&str> {
        self.tracking_uri.as_deref()
    }
}

#[async_trait]
impl ArtifactLogger for StubTracker {
    async fn log_artifact(&self, run: &RunId, path: &Path) -> Result<(), TrackingError> {
        self.with_active(run, |tracked| tracked.artifacts.push(path.to_path_buf()))
    }
}
