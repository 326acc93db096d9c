use common::flags::deserialize_flag;
use serde::{Deserialize, Serialize};

/// Tracking settings (`MLFLOW_*`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Talk to MLflow instead of recording runs in memory.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub use_tracking: bool,
    #[serde(default)]
    pub tracking_uri: Option<String>,
    #[serde(default = "default_experiment_name")]
    pub experiment_name: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            use_tracking: false,
            tracking_uri: None,
            experiment_name: default_experiment_name(),
            timeout: default_timeout(),
        }
    }
}

impl TrackingConfig {
    pub(crate) fn tracking_uri(&self) -> Option<&str> {
        self.tracking_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
    }
}

fn default_experiment_name() -> String {
    "Default".to_string()
}

fn default_timeout() -> f64 {
    30.0
}
