use common::{MaterializeResult, MetadataValue};
use flow::{FlowRequest, LangflowClient};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use vector::{Distance, Payload, QdrantClient, ScoredPoint, VectorPoint};

use crate::error::PipelineError;

/// Dimension of the stub embeddings.
pub const EMBEDDING_DIM: usize = 8;

const SAMPLE_TEXTS: [&str; 4] = ["hello world", "dagma project", "qdrant vector db", "langflow ui"];

/// Vectors and the payloads stored alongside them, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embeddings {
    pub vectors: Vec<Vec<f32>>,
    pub payloads: Vec<Payload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertSummary {
    pub count: usize,
    /// Raw backend response, `null` when nothing was written.
    pub result: Value,
}

pub fn llm_placeholder() -> MaterializeResult<String> {
    MaterializeResult::new("placeholder".to_string())
}

/// Character-code embedding of the first [`EMBEDDING_DIM`] characters.
///
/// Each character maps to `codepoint % 97`, short texts are zero-padded, and
/// the vector is scaled by its largest component (at least 1).
pub fn embed_text(text: &str) -> Vec<f32> {
    let mut values: Vec<u32> = text
        .chars()
        .take(EMBEDDING_DIM)
        .map(|c| u32::from(c) % 97)
        .collect();
    values.resize(EMBEDDING_DIM, 0);
    let max = values.iter().copied().max().unwrap_or(0).max(1) as f32;
    values.into_iter().map(|v| v as f32 / max).collect()
}

pub fn embed_texts_stub() -> MaterializeResult<Embeddings> {
    let mut embeddings = Embeddings::default();
    for text in SAMPLE_TEXTS {
        embeddings.vectors.push(embed_text(text));
        let mut payload = Map::new();
        payload.insert("text".to_string(), json!(text));
        embeddings.payloads.push(payload);
    }
    MaterializeResult::new(embeddings)
}

/// Write the embeddings to the configured collection, creating it first.
pub async fn qdrant_upsert(
    embeddings: &Embeddings,
    llm: &QdrantClient,
) -> Result<MaterializeResult<UpsertSummary>, PipelineError> {
    let points: Vec<VectorPoint> = embeddings
        .vectors
        .iter()
        .zip(&embeddings.payloads)
        .zip(1u64..)
        .map(|((vector, payload), id)| VectorPoint::new(id, vector.clone(), payload.clone()))
        .collect();

    let result = match points.first() {
        Some(first) => {
            llm.ensure_collection(first.vector.len(), Distance::Cosine)
                .await?;
            llm.upsert(&points).await?.response
        }
        None => {
            debug!("no embeddings to upsert");
            Value::Null
        }
    };

    let summary = UpsertSummary {
        count: points.len(),
        result,
    };
    Ok(MaterializeResult::new(summary)
        .with_metadata("points_count", points.len())
        .with_metadata("collection", llm.collection())
        .with_metadata(
            "qdrant_collection_url",
            MetadataValue::url(llm.collection_url()),
        ))
}

/// Top-3 neighbours of the first embedding.
///
/// Runs after [`qdrant_upsert`] so the points are in place.
pub async fn qdrant_search(
    _upserted: &UpsertSummary,
    embeddings: &Embeddings,
    llm: &QdrantClient,
) -> Result<MaterializeResult<Vec<ScoredPoint>>, PipelineError> {
    let Some(query) = embeddings.vectors.first() else {
        return Ok(MaterializeResult::new(Vec::new()));
    };
    let hits = llm.search(query, 3, true).await?;
    info!(returned = hits.len(), collection = llm.collection(), "qdrant_search top3");

    let returned = hits.len();
    Ok(MaterializeResult::new(hits)
        .with_metadata("returned", returned)
        .with_metadata("collection", llm.collection())
        .with_metadata(
            "qdrant_search_endpoint",
            MetadataValue::url(llm.search_endpoint()),
        ))
}

/// Ping the default flow. Without a configured flow the value is the skip
/// sentinel.
pub async fn langflow_run_flow(
    langflow: &LangflowClient,
) -> Result<MaterializeResult<Value>, PipelineError> {
    let request = FlowRequest::new("ping from dagma")
        .with_output_type("chat")
        .with_input_type("chat");
    let response = langflow.run_flow(&request).await?.into_value();

    let value = match response {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().take(8).map(String::as_str).collect();
            info!(
                status = ?map.get("status"),
                id = ?map.get("id"),
                keys = ?keys,
                "langflow_run_flow summary"
            );
            Value::Object(map)
        }
        other => {
            info!(response = %other, "langflow_run_flow returned a non-object");
            Value::Object(Map::new())
        }
    };

    Ok(MaterializeResult::new(value)
        .with_metadata("langflow_ui_url", MetadataValue::url(langflow.ui_url()))
        .with_metadata(
            "default_flow_id",
            langflow.default_flow_id().map(str::to_string),
        ))
}
