//! Pipeline assets over a vector store, a flow service and an experiment
//! tracker.
//!
//! The REST clients live in the workspace crates (`vector`, `flow`,
//! `tracking`); this crate holds the asset functions, the resources they
//! draw on, and [`Definitions`], which runs a selection of assets in order.
//!
//! ```no_run
//! use dagma::{DagmaConfig, Definitions};
//!
//! # async fn run() -> Result<(), dagma::PipelineError> {
//! let config = DagmaConfig::from_env()?;
//! let defs = Definitions::from_config(&config)?;
//! let run = defs.materialize_job("run_llm_rag_job").await?;
//! if let Some(hits) = run.output_for("qdrant_search") {
//!     println!("{hits}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod config;
pub mod definitions;
mod error;
pub mod resources;

pub use crate::config::{ConfigLoadError, DagmaConfig, RuntimeConfig};
pub use crate::definitions::{
    AssetKey, AssetMaterialization, Definitions, JobDefinition, Materialization,
    PartitionsDefinition, ScheduleDefinition,
};
pub use crate::error::PipelineError;
pub use crate::resources::{DashboardStub, EchoLlm, Resources};

pub use common::{BasePath, MaterializeResult, Metadata, MetadataValue};
