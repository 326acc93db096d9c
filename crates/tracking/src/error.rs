use std::path::PathBuf;

use common::HttpError;
use thiserror::Error;

use crate::run::RunId;

#[derive(Debug, Error)]
pub enum TrackingError {
    /// Logged against a run that is closed or was not started by this tracker.
    #[error("run {0} is not active")]
    NoActiveRun(RunId),
    /// Closed a run this tracker has never seen.
    #[error("unknown run {0}")]
    UnknownRun(RunId),
    /// The tracking backend could not be reached or is not configured.
    #[error("tracking client unavailable: {0}")]
    ClientUnavailable(String),
    #[error("unexpected tracking response: {0}")]
    UnexpectedResponse(String),
    #[error("invalid tracking configuration: {0}")]
    InvalidConfig(String),
    #[error("artifact path has no file name: {}", .0.display())]
    InvalidArtifact(PathBuf),
    #[error("tracking request failed: {0}")]
    Http(#[from] HttpError),
    #[error("artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
