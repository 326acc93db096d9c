use std::path::PathBuf;
use std::sync::Arc;

use common::BasePath;
use flow::LangflowClient;
use serde::{Deserialize, Serialize};
use tracking::{build_tracker, Tracker};
use vector::QdrantClient;

use crate::config::DagmaConfig;
use crate::error::PipelineError;

/// Placeholder dashboard publisher. Computes where the page would go and
/// writes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStub {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for DashboardStub {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl DashboardStub {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Path of the page `payload` would be published to.
    pub fn publish<T: Serialize + ?Sized>(&self, _payload: &T) -> String {
        format!("{}/index.html", self.output_dir.display())
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".dagma_dash")
}

/// Offline language-model stand-in that answers with the prompt it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoLlm {
    /// Service the real model would be reached at. Unused.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl EchoLlm {
    pub fn invoke(&self, prompt: &str) -> String {
        format!("LLM-ECHO: {prompt}")
    }
}

/// The named resources assets draw on.
pub struct Resources {
    pub base_path: BasePath,
    pub mlflow: Arc<dyn Tracker>,
    /// Vector store backing the retrieval assets.
    pub llm: QdrantClient,
    pub langflow: LangflowClient,
    pub dashboard: DashboardStub,
}

impl Resources {
    pub fn from_config(config: &DagmaConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            base_path: BasePath::new(&config.runtime.base_path),
            mlflow: build_tracker(&config.tracking)?,
            llm: QdrantClient::new(config.qdrant.clone())?,
            langflow: LangflowClient::new(config.langflow.clone())?,
            dashboard: DashboardStub::new(&config.runtime.dashboard_dir),
        })
    }

    /// Replace the tracker, keeping every other resource.
    pub fn with_tracker(mut self, tracker: Arc<dyn Tracker>) -> Self {
        self.mlflow = tracker;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn publish_returns_index_path() {
        let dashboard = DashboardStub::default();
        assert_eq!(
            dashboard.publish(&json!({ "sum": 6 })),
            ".dagma_dash/index.html"
        );
        assert_eq!(
            DashboardStub::new("/tmp/dash").publish(&()),
            "/tmp/dash/index.html"
        );
    }

    #[test]
    fn echo_llm_repeats_prompt() {
        let llm: EchoLlm =
            serde_json::from_value(json!({ "endpoint": "http://llm:8080" })).unwrap();
        assert_eq!(llm.endpoint.as_deref(), Some("http://llm:8080"));
        assert_eq!(llm.invoke("hi"), "LLM-ECHO: hi");
        assert_eq!(EchoLlm::default().invoke(""), "LLM-ECHO: ");
    }

    #[test]
    fn default_config_builds_offline_resources() {
        let resources = Resources::from_config(&DagmaConfig::default()).unwrap();
        assert_eq!(resources.llm.collection(), "embeddings");
        assert_eq!(resources.langflow.ui_url(), "http://localhost:7860");
        assert_eq!(resources.base_path.root(), std::path::Path::new(".dagma_data"));
    }
}
