use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::UpsertShape;

/// Connection settings for a Qdrant deployment.
///
/// Populated once at startup (usually from `QDRANT_*` variables) and not
/// changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QdrantConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, deserialize_with = "common::flags::deserialize_flag")]
    pub use_https: bool,
    /// Sent as the `api-key` header when set and non-empty.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: f64,
    /// Upsert request shapes to try, in order. Empty is rejected.
    ///
    /// Accepts a list or a comma-separated string such as
    /// `points_post,batch_put`.
    #[serde(default = "UpsertShape::ladder", deserialize_with = "deserialize_shapes")]
    pub upsert_shapes: Vec<UpsertShape>,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            use_https: false,
            api_key: None,
            collection: default_collection(),
            timeout: default_timeout(),
            upsert_shapes: UpsertShape::ladder(),
        }
    }
}

impl QdrantConfig {
    pub fn scheme(&self) -> &'static str {
        if self.use_https {
            "https"
        } else {
            "http"
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.host, self.port)
    }

    pub(crate) fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawShapes {
    List(Vec<UpsertShape>),
    Text(String),
}

fn deserialize_shapes<'de, D>(deserializer: D) -> Result<Vec<UpsertShape>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawShapes::deserialize(deserializer)? {
        RawShapes::List(shapes) => Ok(shapes),
        RawShapes::Text(text) => text
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                UpsertShape::deserialize(IntoDeserializer::<D::Error>::into_deserializer(name))
            })
            .collect(),
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    6333
}

fn default_collection() -> String {
    "embeddings".to_string()
}

fn default_timeout() -> f64 {
    30.0
}
