//! Minimal Qdrant REST client.
//!
//! Three calls cover everything the pipeline needs:
//!
//! - [`QdrantClient::ensure_collection`] - create a collection, treating
//!   "already exists" as success
//! - [`QdrantClient::upsert`] - write points, tolerating deployments that only
//!   accept some request shapes (see [`UpsertShape`])
//! - [`QdrantClient::search`] - nearest-neighbour query
//!
//! ```no_run
//! use vector::{Distance, QdrantClient, QdrantConfig, VectorPoint};
//!
//! # async fn run() -> Result<(), vector::VectorError> {
//! let client = QdrantClient::new(QdrantConfig::default())?;
//! client.ensure_collection(8, Distance::Cosine).await?;
//! let outcome = client
//!     .upsert(&[VectorPoint::new(1, vec![0.0; 8], Default::default())])
//!     .await?;
//! println!("accepted as {}", outcome.shape);
//! let hits = client.search(&[0.0; 8], 3, true).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod types;

pub use crate::client::QdrantClient;
pub use crate::config::QdrantConfig;
pub use crate::error::VectorError;
pub use crate::types::{
    CollectionStatus, Distance, Payload, PointId, ScoredPoint, UpsertMethod, UpsertOutcome,
    UpsertShape, VectorPoint,
};
