use reqwest::{Client, RequestBuilder};
use tracing::{debug, info};

use common::http::{build_client, send_json};

use crate::config::LangflowConfig;
use crate::error::FlowError;
use crate::types::{FlowOutcome, FlowRequest};

/// REST client for a LangFlow server's run endpoint.
pub struct LangflowClient {
    config: LangflowConfig,
    http: Client,
}

impl LangflowClient {
    pub fn new(config: LangflowConfig) -> Result<Self, FlowError> {
        let http = build_client(config.timeout)?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &LangflowConfig {
        &self.config
    }

    /// Configured base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Where the LangFlow web UI lives. Same as [`base_url`](Self::base_url).
    pub fn ui_url(&self) -> &str {
        self.base_url()
    }

    pub fn default_flow_id(&self) -> Option<&str> {
        self.config.default_flow_id()
    }

    pub fn run_url(&self, flow_id: &str) -> String {
        format!("{}/api/v1/run/{}", self.base_url(), flow_id)
    }

    fn post(&self, url: &str) -> RequestBuilder {
        let request = self.http.post(url);
        match self.config.api_key() {
            Some(key) => request.header("x-api-key", key),
            None => request,
        }
    }

    /// Run a flow and return its decoded response.
    ///
    /// The request's `flow_id` wins over the configured default. With neither
    /// set nothing is sent and the outcome is [`FlowOutcome::Skipped`].
    pub async fn run_flow(&self, request: &FlowRequest) -> Result<FlowOutcome, FlowError> {
        let flow_id = request
            .flow_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.default_flow_id());
        let Some(flow_id) = flow_id else {
            debug!("no flow id configured, skipping run");
            return Ok(FlowOutcome::skipped());
        };

        let stream = if request.stream { "true" } else { "false" };
        let builder = self
            .post(&self.run_url(flow_id))
            .query(&[("stream", stream)])
            .json(&request.body());
        let response = send_json(builder).await?;
        info!(flow_id, "flow run completed");
        Ok(FlowOutcome::Completed(response))
    }
}
