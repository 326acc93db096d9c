use std::sync::{PoisonError, RwLock};

use reqwest::{Client, Method, RequestBuilder};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use common::http::{build_client, send_json};
use common::HttpError;

use crate::config::QdrantConfig;
use crate::error::VectorError;
use crate::types::{
    CollectionStatus, Distance, ScoredPoint, UpsertMethod, UpsertOutcome, UpsertShape, VectorPoint,
};

/// REST client bound to one Qdrant collection.
///
/// Not pooled, not retried. The only repeated requests are the upsert shape
/// ladder, which exists for compatibility between deployments.
pub struct QdrantClient {
    config: QdrantConfig,
    http: Client,
    /// Shape that last succeeded; tried first on the next upsert.
    accepted_shape: RwLock<Option<UpsertShape>>,
}

impl QdrantClient {
    pub fn new(config: QdrantConfig) -> Result<Self, VectorError> {
        if config.upsert_shapes.is_empty() {
            return Err(VectorError::InvalidConfig(
                "upsert_shapes must name at least one request shape".into(),
            ));
        }
        if config.collection.is_empty() {
            return Err(VectorError::InvalidConfig("collection name is empty".into()));
        }
        let http = build_client(config.timeout)?;
        Ok(Self {
            config,
            http,
            accepted_shape: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &QdrantConfig {
        &self.config
    }

    pub fn collection(&self) -> &str {
        &self.config.collection
    }

    pub fn base_url(&self) -> String {
        self.config.base_url()
    }

    pub fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url(), self.config.collection)
    }

    pub fn search_endpoint(&self) -> String {
        format!("{}/points/search", self.collection_url())
    }

    /// The shape the backend accepted most recently, if any upsert succeeded.
    pub fn accepted_shape(&self) -> Option<UpsertShape> {
        *self
            .accepted_shape
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.http.request(method, url);
        match self.config.api_key() {
            Some(key) => request.header("api-key", key),
            None => request,
        }
    }

    /// Create the collection with `size`-dimensional vectors, or confirm it exists.
    ///
    /// A conflict status, or an error body mentioning "already exists", is not
    /// an error.
    pub async fn ensure_collection(
        &self,
        size: usize,
        distance: Distance,
    ) -> Result<CollectionStatus, VectorError> {
        let body = json!({
            "vectors": { "size": size, "distance": distance.as_str() }
        });
        let request = self.request(Method::PUT, &self.collection_url()).json(&body);

        match send_json(request).await {
            Ok(response) => {
                info!(collection = %self.config.collection, size, "created collection");
                Ok(CollectionStatus::Created(response))
            }
            Err(err) if is_already_exists(&err) => {
                debug!(collection = %self.config.collection, "collection already exists");
                Ok(CollectionStatus::AlreadyExists)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Write `points`, walking the configured shape ladder until one is accepted.
    pub async fn upsert(&self, points: &[VectorPoint]) -> Result<UpsertOutcome, VectorError> {
        let url = format!("{}/points", self.collection_url());
        let mut attempts = Vec::new();

        for shape in self.attempt_order() {
            let method = match shape.method() {
                UpsertMethod::Post => Method::POST,
                UpsertMethod::Put => Method::PUT,
            };
            let request = self
                .request(method, &url)
                .query(&[("wait", "true")])
                .json(&shape.body(points));

            match send_json(request).await {
                Ok(response) => {
                    info!(
                        collection = %self.config.collection,
                        points = points.len(),
                        shape = %shape,
                        rejected = attempts.len(),
                        "upsert accepted"
                    );
                    *self
                        .accepted_shape
                        .write()
                        .unwrap_or_else(PoisonError::into_inner) = Some(shape);
                    return Ok(UpsertOutcome { shape, response });
                }
                Err(err) => {
                    warn!(shape = %shape, error = %err, "upsert shape rejected");
                    attempts.push((shape, err));
                }
            }
        }

        Err(VectorError::UpsertExhausted { attempts })
    }

    /// Nearest neighbours of `vector`.
    ///
    /// A response that is not an object, or has no `result` array, yields an
    /// empty list.
    pub async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        with_payload: bool,
    ) -> Result<Vec<ScoredPoint>, VectorError> {
        let body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": with_payload,
        });
        let request = self.request(Method::POST, &self.search_endpoint()).json(&body);
        let response = send_json(request).await?;
        parse_search_result(response)
    }

    fn attempt_order(&self) -> Vec<UpsertShape> {
        let mut order = self.config.upsert_shapes.clone();
        if let Some(preferred) = self.accepted_shape() {
            if let Some(pos) = order.iter().position(|shape| *shape == preferred) {
                let shape = order.remove(pos);
                order.insert(0, shape);
            }
        }
        order
    }
}

fn is_already_exists(err: &HttpError) -> bool {
    match err {
        HttpError::Status { status, body, .. } => {
            *status == 409 || body.to_ascii_lowercase().contains("already exists")
        }
        _ => false,
    }
}

fn parse_search_result(response: Value) -> Result<Vec<ScoredPoint>, VectorError> {
    let Value::Object(mut map) = response else {
        return Ok(Vec::new());
    };
    match map.remove("result") {
        Some(result @ Value::Array(_)) => {
            serde_json::from_value(result).map_err(|e| VectorError::Decode(e.to_string()))
        }
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Payload, PointId};
    use mockito::{Matcher, Server, ServerGuard};

    const POINTS_PATH: &str = r"^/collections/embeddings/points(\?wait=true)?$";

    fn local_config(server: &ServerGuard) -> QdrantConfig {
        let host_port = server.host_with_port();
        let (host, port) = host_port.rsplit_once(':').unwrap();
        QdrantConfig {
            host: host.to_string(),
            port: port.parse().unwrap(),
            timeout: 5.0,
            ..QdrantConfig::default()
        }
    }

    fn client_for(server: &ServerGuard) -> QdrantClient {
        QdrantClient::new(QdrantConfig {
            api_key: Some("secret".into()),
            ..local_config(server)
        })
        .unwrap()
    }

    fn points() -> Vec<VectorPoint> {
        let mut payload = Payload::new();
        payload.insert("text".into(), json!("hello world"));
        vec![VectorPoint::new(1, vec![0.25, 1.0], payload)]
    }

    fn points_mock(server: &mut ServerGuard, method: &str, body_key: &str) -> mockito::Mock {
        server
            .mock(method, Matcher::Regex(POINTS_PATH.into()))
            .match_body(Matcher::Regex(format!("\"{body_key}\"")))
    }

    #[test]
    fn rejects_empty_shape_list() {
        let err = QdrantClient::new(QdrantConfig {
            upsert_shapes: Vec::new(),
            ..QdrantConfig::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, VectorError::InvalidConfig(_)));
    }

    #[test]
    fn urls_follow_config() {
        let client = QdrantClient::new(QdrantConfig {
            host: "qdrant".into(),
            use_https: true,
            collection: "docs".into(),
            ..QdrantConfig::default()
        })
        .unwrap();
        assert_eq!(client.collection_url(), "https://qdrant:6333/collections/docs");
        assert_eq!(
            client.search_endpoint(),
            "https://qdrant:6333/collections/docs/points/search"
        );
    }

    #[test]
    fn search_result_shapes() {
        assert!(parse_search_result(json!([1, 2])).unwrap().is_empty());
        assert!(parse_search_result(json!({ "status": "ok" })).unwrap().is_empty());
        assert!(parse_search_result(json!({ "result": null })).unwrap().is_empty());
        let hits = parse_search_result(json!({
            "result": [{ "id": 3, "score": 0.9, "payload": { "text": "x" } }]
        }))
        .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 0.9);
        assert!(hits[0].extra.is_empty());
        assert!(matches!(
            parse_search_result(json!({ "result": [{ "bogus": true }] })),
            Err(VectorError::Decode(_))
        ));
    }

    #[test]
    fn search_hits_keep_unnamed_fields() {
        let hits = parse_search_result(json!({
            "result": [{
                "id": "5c56c793-69f3-4fbf-87e6-c4bf54c28c26",
                "version": 2,
                "score": 0.5,
                "vector": [0.25, 1.0],
                "shard_key": "eu",
                "order_value": 7
            }]
        }))
        .unwrap();
        let hit = &hits[0];
        assert_eq!(hit.id, PointId::Uuid("5c56c793-69f3-4fbf-87e6-c4bf54c28c26".into()));
        assert!(hit.payload.is_none());
        assert_eq!(hit.extra["vector"], json!([0.25, 1.0]));
        assert_eq!(hit.extra["shard_key"], json!("eu"));

        let written = serde_json::to_value(hit).unwrap();
        assert_eq!(written["order_value"], json!(7));
        assert_eq!(written["version"], json!(2));
    }

    #[test]
    fn already_exists_detection() {
        let conflict = HttpError::Status {
            status: 409,
            reason: "Conflict".into(),
            body: String::new(),
        };
        let message = HttpError::Status {
            status: 400,
            reason: "Bad Request".into(),
            body: r#"{"status":{"error":"Wrong input: Collection `embeddings` Already Exists!"}}"#
                .into(),
        };
        let other = HttpError::Status {
            status: 400,
            reason: "Bad Request".into(),
            body: "vector size mismatch".into(),
        };
        assert!(is_already_exists(&conflict));
        assert!(is_already_exists(&message));
        assert!(!is_already_exists(&other));
        assert!(!is_already_exists(&HttpError::Connection("down".into())));
    }

    #[tokio::test]
    async fn ensure_collection_is_idempotent() {
        let mut server = Server::new_async().await;
        let created = server
            .mock("PUT", "/collections/embeddings")
            .match_header("api-key", "secret")
            .match_body(Matcher::Json(json!({
                "vectors": { "size": 8, "distance": "Cosine" }
            })))
            .with_status(200)
            .with_body(r#"{"result": true, "status": "ok", "time": 0.01}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let first = client.ensure_collection(8, Distance::Cosine).await.unwrap();
        assert!(first.created());
        created.assert_async().await;
        created.remove_async().await;

        let conflict = server
            .mock("PUT", "/collections/embeddings")
            .with_status(409)
            .with_body(r#"{"status": {"error": "Collection `embeddings` already exists!"}}"#)
            .expect(1)
            .create_async()
            .await;

        let second = client.ensure_collection(8, Distance::Cosine).await.unwrap();
        assert_eq!(second, CollectionStatus::AlreadyExists);
        conflict.assert_async().await;
    }

    #[tokio::test]
    async fn ensure_collection_surfaces_other_errors() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/collections/embeddings")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = client_for(&server)
            .ensure_collection(8, Distance::Cosine)
            .await
            .unwrap_err();
        match err {
            VectorError::Http(HttpError::Status { status, body, .. }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn upsert_falls_through_to_fourth_shape() {
        let mut server = Server::new_async().await;
        let points_post = points_mock(&mut server, "POST", "points")
            .with_status(400)
            .with_body("points format not supported")
            .expect(1)
            .create_async()
            .await;
        let batch_post = points_mock(&mut server, "POST", "batch")
            .with_status(405)
            .expect(1)
            .create_async()
            .await;
        let points_put = points_mock(&mut server, "PUT", "points")
            .with_status(422)
            .expect(1)
            .create_async()
            .await;
        let batch_put = points_mock(&mut server, "PUT", "batch")
            .match_header("api-key", "secret")
            .with_status(200)
            .with_body(r#"{"result": {"operation_id": 7, "status": "completed"}, "status": "ok"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let outcome = client.upsert(&points()).await.unwrap();

        assert_eq!(outcome.shape, UpsertShape::BatchPut);
        assert_eq!(outcome.response["result"]["operation_id"], json!(7));
        assert_eq!(client.accepted_shape(), Some(UpsertShape::BatchPut));
        points_post.assert_async().await;
        batch_post.assert_async().await;
        points_put.assert_async().await;
        batch_put.assert_async().await;
    }

    #[tokio::test]
    async fn upsert_tries_accepted_shape_first() {
        let mut server = Server::new_async().await;
        let points_post = points_mock(&mut server, "POST", "points")
            .with_status(400)
            .expect(1)
            .create_async()
            .await;
        let batch_post = points_mock(&mut server, "POST", "batch")
            .with_status(200)
            .with_body(r#"{"result": {"status": "completed"}}"#)
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.upsert(&points()).await.unwrap().shape, UpsertShape::BatchPost);
        assert_eq!(client.upsert(&points()).await.unwrap().shape, UpsertShape::BatchPost);

        points_post.assert_async().await;
        batch_post.assert_async().await;
    }

    #[tokio::test]
    async fn upsert_fails_when_every_shape_fails() {
        let mut server = Server::new_async().await;
        let rejected = server
            .mock("POST", Matcher::Regex(POINTS_PATH.into()))
            .with_status(400)
            .with_body("nope")
            .expect(2)
            .create_async()
            .await;

        let client = QdrantClient::new(QdrantConfig {
            upsert_shapes: vec![UpsertShape::PointsPost, UpsertShape::BatchPost],
            ..local_config(&server)
        })
        .unwrap();

        match client.upsert(&points()).await.unwrap_err() {
            VectorError::UpsertExhausted { attempts } => {
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0].0, UpsertShape::PointsPost);
                assert_eq!(attempts[1].0, UpsertShape::BatchPost);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(client.accepted_shape(), None);
        rejected.assert_async().await;
    }

    #[tokio::test]
    async fn search_returns_hits() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/collections/embeddings/points/search")
            .match_body(Matcher::Json(json!({
                "vector": [0.25, 1.0],
                "limit": 3,
                "with_payload": true
            })))
            .with_status(200)
            .with_body(
                r#"{"result": [{"id": 1, "version": 0, "score": 0.99, "payload": {"text": "hello world"}}], "status": "ok"}"#,
            )
            .create_async()
            .await;

        let hits = client_for(&server).search(&[0.25, 1.0], 3, true).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, crate::types::PointId::Num(1));
        assert_eq!(
            hits[0].payload.as_ref().unwrap()["text"],
            json!("hello world")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn search_without_result_is_empty() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/collections/embeddings/points/search")
            .with_status(200)
            .with_body(r#"{"status": "ok", "time": 0.0}"#)
            .create_async()
            .await;

        let hits = client_for(&server).search(&[1.0], 3, false).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn unreachable_backend_is_connection_error() {
        let client = QdrantClient::new(QdrantConfig {
            host: "127.0.0.1".into(),
            port: 9,
            timeout: 2.0,
            ..QdrantConfig::default()
        })
        .unwrap();
        let err = client.search(&[1.0], 1, false).await.unwrap_err();
        assert!(matches!(err, VectorError::Http(HttpError::Connection(_))));
    }
}
