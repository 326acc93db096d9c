use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use common::http::{build_client, send_json};

use crate::error::TrackingError;
use crate::run::RunId;

/// An MLflow experiment as returned by the experiments endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Experiment {
    pub experiment_id: String,
    pub name: String,
    #[serde(default)]
    pub artifact_location: Option<String>,
    #[serde(default)]
    pub lifecycle_stage: Option<String>,
}

/// Thin client over the MLflow 2.0 REST API.
pub struct MlflowClient {
    tracking_uri: String,
    http: Client,
}

impl MlflowClient {
    pub fn new(tracking_uri: &str, timeout_secs: f64) -> Result<Self, TrackingError> {
        let http = build_client(timeout_secs)?;
        Ok(Self {
            tracking_uri: tracking_uri.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn tracking_uri(&self) -> &str {
        &self.tracking_uri
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api/2.0/mlflow/{}", self.tracking_uri, path)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, TrackingError> {
        debug!(endpoint = path, "mlflow request");
        Ok(send_json(self.http.post(self.api(path)).json(&body)).await?)
    }

    pub async fn create_experiment(&self, name: &str) -> Result<String, TrackingError> {
        let response = self
            .post("experiments/create", json!({ "name": name }))
            .await?;
        string_at(&response, &["experiment_id"])
    }

    /// Look up an experiment; `None` when the server answers 404.
    pub async fn get_experiment_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Experiment>, TrackingError> {
        let request = self
            .http
            .get(self.api("experiments/get-by-name"))
            .query(&[("experiment_name", name)]);
        let mut response = match send_json(request).await {
            Ok(response) => response,
            Err(err) if err.status() == Some(404) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let experiment = response
            .get_mut("experiment")
            .map(Value::take)
            .ok_or_else(|| TrackingError::UnexpectedResponse("missing experiment".into()))?;
        serde_json::from_value(experiment)
            .map(Some)
            .map_err(|e| TrackingError::UnexpectedResponse(e.to_string()))
    }

    pub async fn search_experiments(
        &self,
        max_results: u32,
    ) -> Result<Vec<Experiment>, TrackingError> {
        let mut response = self
            .post("experiments/search", json!({ "max_results": max_results }))
            .await?;
        match response.get_mut("experiments").map(Value::take) {
            Some(experiments) => serde_json::from_value(experiments)
                .map_err(|e| TrackingError::UnexpectedResponse(e.to_string())),
            None => Ok(Vec::new()),
        }
    }

    pub async fn create_run(&self, experiment_id: &str) -> Result<RunId, TrackingError> {
        let response = self
            .post(
                "runs/create",
                json!({ "experiment_id": experiment_id, "start_time": now_millis() }),
            )
            .await?;
        string_at(&response, &["run", "info", "run_id"]).map(RunId::from)
    }

    /// MLflow stores parameters as strings; JSON strings are sent unquoted.
    pub async fn log_parameter(
        &self,
        run: &RunId,
        key: &str,
        value: &Value,
    ) -> Result<(), TrackingError> {
        let value = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        self.post(
            "runs/log-parameter",
            json!({ "run_id": run.as_str(), "key": key, "value": value }),
        )
        .await?;
        Ok(())
    }

    pub async fn log_metric(&self, run: &RunId, key: &str, value: f64) -> Result<(), TrackingError> {
        self.post(
            "runs/log-metric",
            json!({
                "run_id": run.as_str(),
                "key": key,
                "value": value,
                "timestamp": now_millis(),
                "step": 0,
            }),
        )
        .await?;
        Ok(())
    }

    pub async fn finish_run(&self, run: &RunId) -> Result<(), TrackingError> {
        self.post(
            "runs/update",
            json!({
                "run_id": run.as_str(),
                "status": "FINISHED",
                "end_time": now_millis(),
            }),
        )
        .await?;
        Ok(())
    }

    /// Upload `contents` as `file_name` through the artifact proxy.
    pub async fn upload_artifact(
        &self,
        experiment_id: &str,
        run: &RunId,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<(), TrackingError> {
        let url = format!(
            "{}/api/2.0/mlflow-artifacts/artifacts/{}/{}/artifacts/{}",
            self.tracking_uri, experiment_id, run, file_name
        );
        send_json(self.http.put(url).body(contents)).await?;
        Ok(())
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn string_at(value: &Value, path: &[&str]) -> Result<String, TrackingError> {
    path.iter()
        .try_fold(value, |node, key| node.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TrackingError::UnexpectedResponse(format!("missing {}", path.join("."))))
}
