//! LangFlow run client.
//!
//! [`LangflowClient::run_flow`] posts one input to `/api/v1/run/{flow_id}`.
//! When no flow id is known the call is skipped rather than failed, so a
//! pipeline without a configured flow still materializes.

mod client;
mod config;
mod error;
mod types;

pub use crate::client::LangflowClient;
pub use crate::config::LangflowConfig;
pub use crate::error::FlowError;
pub use crate::types::{FlowOutcome, FlowRequest, NO_FLOW_ID};
