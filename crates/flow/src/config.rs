use serde::{Deserialize, Serialize};

/// Connection settings for a LangFlow server (`LANGFLOW_*`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LangflowConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sent as `x-api-key` when set and non-empty.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Flow used when a request does not name one.
    #[serde(default)]
    pub default_flow_id: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: f64,
}

impl Default for LangflowConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            default_flow_id: None,
            timeout: default_timeout(),
        }
    }
}

impl LangflowConfig {
    pub(crate) fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    pub(crate) fn default_flow_id(&self) -> Option<&str> {
        self.default_flow_id.as_deref().filter(|id| !id.is_empty())
    }
}

fn default_base_url() -> String {
    "http://localhost:7860".to_string()
}

fn default_timeout() -> f64 {
    30.0
}
