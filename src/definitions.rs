//! Declarative pipeline definitions and a sequential materializer.
//!
//! [`Definitions`] lists the assets, resources, jobs and schedules a hosting
//! framework would load. [`Definitions::materialize`] runs a selection of
//! assets in declaration order within a single task, handing each asset the
//! outputs of its upstream assets from the same run. Schedules are recorded
//! for the host and never fired here.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use common::Metadata;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::assets::{data, llm, models, viz};
use crate::config::DagmaConfig;
use crate::error::PipelineError;
use crate::resources::Resources;

/// Every asset the pipeline defines.
///
/// Variants are declared in dependency order: an asset's upstreams always
/// come before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKey {
    RawNumbers,
    SumNumbers,
    VizReadyData,
    DashboardPublish,
    TrainModelStub,
    LlmPlaceholder,
    EmbedTextsStub,
    QdrantUpsert,
    QdrantSearch,
    LangflowRunFlow,
}

impl AssetKey {
    pub const ALL: [AssetKey; 10] = [
        AssetKey::RawNumbers,
        AssetKey::SumNumbers,
        AssetKey::VizReadyData,
        AssetKey::DashboardPublish,
        AssetKey::TrainModelStub,
        AssetKey::LlmPlaceholder,
        AssetKey::EmbedTextsStub,
        AssetKey::QdrantUpsert,
        AssetKey::QdrantSearch,
        AssetKey::LangflowRunFlow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AssetKey::RawNumbers => "raw_numbers",
            AssetKey::SumNumbers => "sum_numbers",
            AssetKey::VizReadyData => "viz_ready_data",
            AssetKey::DashboardPublish => "dashboard_publish",
            AssetKey::TrainModelStub => "train_model_stub",
            AssetKey::LlmPlaceholder => "llm_placeholder",
            AssetKey::EmbedTextsStub => "embed_texts_stub",
            AssetKey::QdrantUpsert => "qdrant_upsert",
            AssetKey::QdrantSearch => "qdrant_search",
            AssetKey::LangflowRunFlow => "langflow_run_flow",
        }
    }

    pub fn group(self) -> &'static str {
        match self {
            AssetKey::RawNumbers | AssetKey::SumNumbers => "data",
            AssetKey::VizReadyData | AssetKey::DashboardPublish => "viz",
            AssetKey::TrainModelStub => "models",
            AssetKey::LlmPlaceholder
            | AssetKey::EmbedTextsStub
            | AssetKey::QdrantUpsert
            | AssetKey::QdrantSearch
            | AssetKey::LangflowRunFlow => "llm",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AssetKey::RawNumbers => "Minimal example dataset: a list of integers.",
            AssetKey::SumNumbers => "Sum of the integer list, demonstrating an asset dependency.",
            AssetKey::VizReadyData => "Upstream summary wrapped for a visualization.",
            AssetKey::DashboardPublish => "Publish the visualization payload to the dashboard stub.",
            AssetKey::TrainModelStub => "Placeholder training run logging a parameter and a metric.",
            AssetKey::LlmPlaceholder => "LLM placeholder; makes no calls.",
            AssetKey::EmbedTextsStub => "Character-code embeddings of sample texts, dimension 8.",
            AssetKey::QdrantUpsert => "Write the embeddings to Qdrant over REST.",
            AssetKey::QdrantSearch => "Nearest-neighbour search with the first vector, top 3.",
            AssetKey::LangflowRunFlow => "Run the configured LangFlow flow over REST.",
        }
    }

    /// Assets whose outputs this asset consumes.
    pub fn deps(self) -> &'static [AssetKey] {
        match self {
            AssetKey::SumNumbers => &[AssetKey::RawNumbers],
            AssetKey::VizReadyData => &[AssetKey::SumNumbers],
            AssetKey::DashboardPublish => &[AssetKey::VizReadyData],
            AssetKey::QdrantUpsert => &[AssetKey::EmbedTextsStub],
            AssetKey::QdrantSearch => &[AssetKey::QdrantUpsert, AssetKey::EmbedTextsStub],
            AssetKey::RawNumbers
            | AssetKey::TrainModelStub
            | AssetKey::LlmPlaceholder
            | AssetKey::EmbedTextsStub
            | AssetKey::LangflowRunFlow => &[],
        }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetKey {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetKey::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| PipelineError::UnknownAsset(s.to_string()))
    }
}

/// A named selection of assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDefinition {
    pub name: &'static str,
    pub selection: Vec<AssetKey>,
}

/// A cron trigger for a job. Declared for the host; nothing here fires it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleDefinition {
    pub name: &'static str,
    pub job: &'static str,
    pub cron_schedule: &'static str,
}

/// A fixed set of partition keys. Declared for the host; no asset here is
/// partitioned by it yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionsDefinition {
    pub name: &'static str,
    pub keys: Vec<&'static str>,
}

impl PartitionsDefinition {
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| *k == key)
    }
}

/// One asset's value and metadata from a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetMaterialization {
    pub asset: AssetKey,
    pub value: Value,
    pub metadata: Metadata,
}

/// Outcome of [`Definitions::materialize`].
///
/// The run stops at the first asset that fails; assets before it keep their
/// outputs.
#[derive(Debug, Default)]
pub struct Materialization {
    outputs: BTreeMap<AssetKey, AssetMaterialization>,
    failure: Option<(AssetKey, PipelineError)>,
}

impl Materialization {
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn failure(&self) -> Option<(AssetKey, &PipelineError)> {
        self.failure.as_ref().map(|(key, err)| (*key, err))
    }

    pub fn output_for(&self, name: &str) -> Option<&Value> {
        self.get(name).map(|m| &m.value)
    }

    pub fn metadata_for(&self, name: &str) -> Option<&Metadata> {
        self.get(name).map(|m| &m.metadata)
    }

    /// Materialized assets in run order.
    pub fn materialized(&self) -> impl Iterator<Item = &AssetMaterialization> {
        self.outputs.values()
    }

    /// The error that stopped the run, if any.
    pub fn into_result(mut self) -> Result<Self, PipelineError> {
        match self.failure.take() {
            Some((_, err)) => Err(err),
            None => Ok(self),
        }
    }

    fn get(&self, name: &str) -> Option<&AssetMaterialization> {
        let key = AssetKey::from_str(name).ok()?;
        self.outputs.get(&key)
    }

    fn input<T: DeserializeOwned>(
        &self,
        asset: AssetKey,
        upstream: AssetKey,
    ) -> Result<T, PipelineError> {
        let materialized = self
            .outputs
            .get(&upstream)
            .ok_or(PipelineError::MissingUpstream { asset, upstream })?;
        Ok(serde_json::from_value(materialized.value.clone())?)
    }

    fn record<T: Serialize>(
        &mut self,
        asset: AssetKey,
        result: common::MaterializeResult<T>,
    ) -> Result<(), PipelineError> {
        let value = serde_json::to_value(&result.value)?;
        self.outputs.insert(
            asset,
            AssetMaterialization {
                asset,
                value,
                metadata: result.metadata,
            },
        );
        Ok(())
    }
}

/// Assets, resources, jobs, schedules and partitions of the pipeline.
pub struct Definitions {
    pub assets: Vec<AssetKey>,
    pub resources: Resources,
    pub jobs: Vec<JobDefinition>,
    pub schedules: Vec<ScheduleDefinition>,
    pub partitions: Vec<PartitionsDefinition>,
}

impl Definitions {
    pub fn new(resources: Resources) -> Self {
        let run_langflow_job = JobDefinition {
            name: "run_langflow_job",
            selection: vec![AssetKey::LangflowRunFlow],
        };
        let run_llm_rag_job = JobDefinition {
            name: "run_llm_rag_job",
            selection: vec![
                AssetKey::EmbedTextsStub,
                AssetKey::QdrantUpsert,
                AssetKey::QdrantSearch,
            ],
        };
        let run_models_train_job = JobDefinition {
            name: "run_models_train_job",
            selection: vec![AssetKey::TrainModelStub],
        };
        let run_langflow_daily = ScheduleDefinition {
            name: "run_langflow_daily",
            job: run_langflow_job.name,
            cron_schedule: "0 2 * * *",
        };
        let small_static_partitions = PartitionsDefinition {
            name: "small_static_partitions",
            keys: vec!["train", "test"],
        };

        Self {
            assets: AssetKey::ALL.to_vec(),
            resources,
            jobs: vec![run_langflow_job, run_llm_rag_job, run_models_train_job],
            schedules: vec![run_langflow_daily],
            partitions: vec![small_static_partitions],
        }
    }

    pub fn from_config(config: &DagmaConfig) -> Result<Self, PipelineError> {
        Ok(Self::new(Resources::from_config(config)?))
    }

    pub fn job(&self, name: &str) -> Option<&JobDefinition> {
        self.jobs.iter().find(|job| job.name == name)
    }

    pub fn schedule(&self, name: &str) -> Option<&ScheduleDefinition> {
        self.schedules.iter().find(|schedule| schedule.name == name)
    }

    pub fn partitions(&self, name: &str) -> Option<&PartitionsDefinition> {
        self.partitions.iter().find(|partitions| partitions.name == name)
    }

    /// Materialize every asset.
    pub async fn materialize_all(&self) -> Result<Materialization, PipelineError> {
        self.materialize(&AssetKey::ALL).await
    }

    pub async fn materialize_job(&self, name: &str) -> Result<Materialization, PipelineError> {
        let job = self
            .job(name)
            .ok_or_else(|| PipelineError::UnknownJob(name.to_string()))?;
        info!(job = job.name, assets = job.selection.len(), "running job");
        self.materialize(&job.selection).await
    }

    /// Run `selection` in declaration order.
    ///
    /// Fails before running anything if a selected asset depends on one that
    /// is not selected. Failures while running are recorded in the returned
    /// [`Materialization`].
    pub async fn materialize(
        &self,
        selection: &[AssetKey],
    ) -> Result<Materialization, PipelineError> {
        let selected: BTreeSet<AssetKey> = selection.iter().copied().collect();
        for asset in &selected {
            if let Some(upstream) = asset.deps().iter().find(|dep| !selected.contains(*dep)) {
                return Err(PipelineError::MissingUpstream {
                    asset: *asset,
                    upstream: *upstream,
                });
            }
        }

        let mut run = Materialization::default();
        // BTreeSet iterates in declaration order.
        for asset in selected {
            if let Err(err) = self.materialize_one(asset, &mut run).await {
                error!(asset = %asset, error = %err, "asset failed");
                run.failure = Some((asset, err));
                break;
            }
            info!(asset = %asset, group = asset.group(), "materialized");
        }
        Ok(run)
    }

    async fn materialize_one(
        &self,
        asset: AssetKey,
        run: &mut Materialization,
    ) -> Result<(), PipelineError> {
        let res = &self.resources;
        match asset {
            AssetKey::RawNumbers => run.record(asset, data::raw_numbers()),
            AssetKey::SumNumbers => {
                let numbers: Vec<i64> = run.input(asset, AssetKey::RawNumbers)?;
                run.record(asset, data::sum_numbers(&numbers))
            }
            AssetKey::VizReadyData => {
                let sum: i64 = run.input(asset, AssetKey::SumNumbers)?;
                run.record(asset, viz::viz_ready_data(sum))
            }
            AssetKey::DashboardPublish => {
                let viz_data: viz::VizData = run.input(asset, AssetKey::VizReadyData)?;
                run.record(asset, viz::dashboard_publish(&viz_data, &res.dashboard))
            }
            AssetKey::TrainModelStub => {
                let result = models::train_model_stub(res.mlflow.as_ref(), &res.base_path).await?;
                run.record(asset, result)
            }
            AssetKey::LlmPlaceholder => run.record(asset, llm::llm_placeholder()),
            AssetKey::EmbedTextsStub => run.record(asset, llm::embed_texts_stub()),
            AssetKey::QdrantUpsert => {
                let embeddings: llm::Embeddings = run.input(asset, AssetKey::EmbedTextsStub)?;
                let result = llm::qdrant_upsert(&embeddings, &res.llm).await?;
                run.record(asset, result)
            }
            AssetKey::QdrantSearch => {
                let upserted: llm::UpsertSummary = run.input(asset, AssetKey::QdrantUpsert)?;
                let embeddings: llm::Embeddings = run.input(asset, AssetKey::EmbedTextsStub)?;
                let result = llm::qdrant_search(&upserted, &embeddings, &res.llm).await?;
                run.record(asset, result)
            }
            AssetKey::LangflowRunFlow => {
                let result = llm::langflow_run_flow(&res.langflow).await?;
                run.record(asset, result)
            }
        }
    }
}
