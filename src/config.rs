//! Environment configuration.
//!
//! Each backend reads its own prefix. Every key is optional and falls back to
//! the default documented on the section's struct.
//!
//! ```text
//! QDRANT_HOST=qdrant
//! QDRANT_PORT=6333
//! QDRANT_USE_HTTPS=false
//! QDRANT_COLLECTION=embeddings
//! QDRANT_UPSERT_SHAPES=points_post,batch_put
//!
//! LANGFLOW_BASE_URL=http://langflow:7860
//! LANGFLOW_DEFAULT_FLOW_ID=2f1c...
//!
//! MLFLOW_USE_TRACKING=1
//! MLFLOW_TRACKING_URI=http://mlflow:5000
//! MLFLOW_EXPERIMENT_NAME=dagma
//!
//! DAGMA_BASE_PATH=.dagma_data
//! DAGMA_DASHBOARD_DIR=.dagma_dash
//! DAGMA_LOG=info,vector=debug
//! ```
//!
//! A `.env` file in the working directory is read first when present.

use std::collections::HashMap;
use std::path::PathBuf;

use config::{Config, Environment};
use flow::LangflowConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracking::TrackingConfig;
use vector::QdrantConfig;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read {section} settings: {source}")]
    Source {
        section: &'static str,
        #[source]
        source: config::ConfigError,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Settings that belong to the pipeline itself rather than a backend
/// (`DAGMA_*`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,
    #[serde(default = "default_dashboard_dir")]
    pub dashboard_dir: PathBuf,
    /// `tracing` filter directive used by the binary.
    #[serde(default = "default_log")]
    pub log: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            dashboard_dir: default_dashboard_dir(),
            log: default_log(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DagmaConfig {
    pub qdrant: QdrantConfig,
    pub langflow: LangflowConfig,
    pub tracking: TrackingConfig,
    pub runtime: RuntimeConfig,
}

impl DagmaConfig {
    /// Read the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::load(None)
    }

    /// Read settings from `vars` instead of the process environment.
    pub fn from_map(vars: HashMap<String, String>) -> Result<Self, ConfigLoadError> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigLoadError> {
        let qdrant = section(
            "QDRANT",
            Environment::with_prefix("QDRANT").source(vars.clone()),
        )?;
        let langflow = section(
            "LANGFLOW",
            Environment::with_prefix("LANGFLOW").source(vars.clone()),
        )?;
        let tracking = section(
            "MLFLOW",
            Environment::with_prefix("MLFLOW").source(vars.clone()),
        )?;
        let runtime = section("DAGMA", Environment::with_prefix("DAGMA").source(vars))?;

        let config = Self {
            qdrant,
            langflow,
            tracking,
            runtime,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.qdrant.upsert_shapes.is_empty() {
            return Err(ConfigLoadError::Validation(
                "QDRANT_UPSERT_SHAPES must name at least one shape".into(),
            ));
        }
        if self.tracking.use_tracking && self.tracking.tracking_uri.is_none() {
            tracing::warn!("MLFLOW_USE_TRACKING is set without MLFLOW_TRACKING_URI");
        }
        Ok(())
    }
}

fn section<T: DeserializeOwned>(
    name: &'static str,
    source: Environment,
) -> Result<T, ConfigLoadError> {
    Config::builder()
        .add_source(source)
        .build()
        .and_then(Config::try_deserialize)
        .map_err(|source| ConfigLoadError::Source {
            section: name,
            source,
        })
}

fn default_base_path() -> PathBuf {
    PathBuf::from(".dagma_data")
}

fn default_dashboard_dir() -> PathBuf {
    PathBuf::from(".dagma_dash")
}

fn default_log() -> String {
    "info".to_string()
}
