use common::HttpError;
use thiserror::Error;

use crate::types::UpsertShape;

/// Errors surfaced by [`QdrantClient`](crate::QdrantClient).
#[derive(Debug, Error)]
pub enum VectorError {
    /// Status, connection or decode failure on a single request.
    #[error("qdrant request failed: {0}")]
    Http(#[from] HttpError),
    /// Settings that cannot produce a working client.
    #[error("invalid qdrant config: {0}")]
    InvalidConfig(String),
    /// Every configured upsert shape was rejected.
    #[error("qdrant rejected every upsert shape: {}", describe_attempts(.attempts))]
    UpsertExhausted {
        attempts: Vec<(UpsertShape, HttpError)>,
    },
    /// A search `result` entry did not look like a scored point.
    #[error("unexpected search result: {0}")]
    Decode(String),
}

fn describe_attempts(attempts: &[(UpsertShape, HttpError)]) -> String {
    attempts
        .iter()
        .map(|(shape, err)| format!("{shape}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_lists_every_attempt() {
        let err = VectorError::UpsertExhausted {
            attempts: vec![
                (
                    UpsertShape::PointsPost,
                    HttpError::Status {
                        status: 400,
                        reason: "Bad Request".into(),
                        body: "bad".into(),
                    },
                ),
                (UpsertShape::BatchPut, HttpError::Connection("refused".into())),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("points_post: HTTP 400 Bad Request: bad"));
        assert!(text.contains("batch_put: connection failed: refused"));
    }
}
