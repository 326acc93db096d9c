use common::HttpError;
use thiserror::Error;

/// Errors surfaced by [`LangflowClient`](crate::LangflowClient).
///
/// A missing flow id is not one of them; it yields
/// [`FlowOutcome::Skipped`](crate::FlowOutcome::Skipped).
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("langflow request failed: {0}")]
    Http(#[from] HttpError),
}
