use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Free-form JSON object stored next to a vector.
pub type Payload = Map<String, Value>;

/// A vector point as written to a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub payload: Payload,
}

impl VectorPoint {
    pub fn new(id: u64, vector: Vec<f32>, payload: Payload) -> Self {
        Self {
            id,
            vector,
            payload,
        }
    }
}

/// Point identifiers as Qdrant reports them: unsigned integers or UUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Num(u64),
    Uuid(String),
}

/// One hit returned by a nearest-neighbour search.
///
/// `id` and `score` are required. Fields this type does not name, such as
/// `vector` or `shard_key`, are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub id: PointId,
    #[serde(default)]
    pub version: u64,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Similarity metric of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Distance {
    #[default]
    Cosine,
    Euclid,
    Dot,
    Manhattan,
}

impl Distance {
    pub fn as_str(self) -> &'static str {
        match self {
            Distance::Cosine => "Cosine",
            Distance::Euclid => "Euclid",
            Distance::Dot => "Dot",
            Distance::Manhattan => "Manhattan",
        }
    }
}

/// Outcome of [`QdrantClient::ensure_collection`](crate::QdrantClient::ensure_collection).
/// Both variants mean the collection is usable.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionStatus {
    /// The backend created the collection; carries its response body.
    Created(Value),
    /// The collection was already there.
    AlreadyExists,
}

impl CollectionStatus {
    pub fn created(&self) -> bool {
        matches!(self, CollectionStatus::Created(_))
    }
}

/// HTTP method used by an upsert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMethod {
    Post,
    Put,
}

/// Request shapes tried by `upsert`, in the order of [`UpsertShape::LADDER`].
///
/// Deployments disagree on which method and body layout the points endpoint
/// accepts, so the client walks a configurable list of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertShape {
    /// `POST` with `{"points": [{id, vector, payload}, ...]}`.
    PointsPost,
    /// `POST` with `{"batch": {"ids": [...], "vectors": [...], "payloads": [...]}}`.
    BatchPost,
    /// `PUT` with the point-list body.
    PointsPut,
    /// `PUT` with the columnar body.
    BatchPut,
}

impl UpsertShape {
    pub const LADDER: [UpsertShape; 4] = [
        UpsertShape::PointsPost,
        UpsertShape::BatchPost,
        UpsertShape::PointsPut,
        UpsertShape::BatchPut,
    ];

    pub fn ladder() -> Vec<UpsertShape> {
        Self::LADDER.to_vec()
    }

    pub fn method(self) -> UpsertMethod {
        match self {
            UpsertShape::PointsPost | UpsertShape::BatchPost => UpsertMethod::Post,
            UpsertShape::PointsPut | UpsertShape::BatchPut => UpsertMethod::Put,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UpsertShape::PointsPost => "points_post",
            UpsertShape::BatchPost => "batch_post",
            UpsertShape::PointsPut => "points_put",
            UpsertShape::BatchPut => "batch_put",
        }
    }

    /// Request body for `points` in this shape.
    pub fn body(self, points: &[VectorPoint]) -> Value {
        match self {
            UpsertShape::PointsPost | UpsertShape::PointsPut => json!({ "points": points }),
            UpsertShape::BatchPost | UpsertShape::BatchPut => {
                let ids: Vec<u64> = points.iter().map(|p| p.id).collect();
                let vectors: Vec<&[f32]> = points.iter().map(|p| p.vector.as_slice()).collect();
                let payloads: Vec<&Payload> = points.iter().map(|p| &p.payload).collect();
                json!({
                    "batch": {
                        "ids": ids,
                        "vectors": vectors,
                        "payloads": payloads,
                    }
                })
            }
        }
    }
}

impl std::fmt::Display for UpsertShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The accepted upsert: which shape the backend took and what it answered.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    pub shape: UpsertShape,
    pub response: Value,
}
