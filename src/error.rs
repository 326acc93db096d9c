use flow::FlowError;
use thiserror::Error;
use tracking::TrackingError;
use vector::VectorError;

use crate::config::ConfigLoadError;
use crate::definitions::AssetKey;

/// Errors raised while building definitions or materializing assets.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("vector store: {0}")]
    Vector(#[from] VectorError),

    #[error("flow service: {0}")]
    Flow(#[from] FlowError),

    #[error("tracking: {0}")]
    Tracking(#[from] TrackingError),

    #[error("unknown asset: {0}")]
    UnknownAsset(String),

    #[error("unknown job: {0}")]
    UnknownJob(String),

    /// A selected asset depends on one that is not part of the same run.
    #[error("asset {asset} needs {upstream}, which is not selected")]
    MissingUpstream { asset: AssetKey, upstream: AssetKey },

    #[error("asset value encoding failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("configuration: {0}")]
    Config(#[from] ConfigLoadError),
}
