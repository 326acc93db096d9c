//! Experiment tracking for pipeline runs.
//!
//! Callers hold a [`RunId`] from [`Tracker::start_run`] and pass it to every
//! later call. Two implementations ship here:
//!
//! - [`StubTracker`] - in-memory bookkeeping, the default
//! - [`MlflowTracker`] - forwards to an MLflow server over REST
//!
//! [`build_tracker`] picks one from a [`TrackingConfig`].

use std::sync::Arc;

mod config;
mod error;
pub mod mlflow;
mod run;
mod stub;

pub use crate::config::TrackingConfig;
pub use crate::error::TrackingError;
pub use crate::mlflow::{Experiment, MlflowClient, MlflowTracker};
pub use crate::run::{ArtifactLogger, RunId, Tracker};
pub use crate::stub::{StubTracker, TrackedRun};

/// MLflow when `use_tracking` is set, the in-memory stub otherwise.
pub fn build_tracker(config: &TrackingConfig) -> Result<Arc<dyn Tracker>, TrackingError> {
    if config.use_tracking {
        Ok(Arc::new(MlflowTracker::new(config.clone())?))
    } else {
        Ok(Arc::new(StubTracker::with_tracking_uri(
            config.tracking_uri.clone(),
        )))
    }
}
