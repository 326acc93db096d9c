//! Shared building blocks for the dagma pipeline crates.
//!
//! Nothing in here talks to a particular backend. The crate collects the
//! pieces every resource and asset needs:
//!
//! - [`paths::BasePath`] - the local working-directory resource
//! - [`metadata`] - observability metadata attached to materialized assets
//! - [`http`] - request plumbing and the shared [`HttpError`] taxonomy
//! - [`flags`] - lenient boolean parsing for environment-driven config

pub mod flags;
pub mod http;
pub mod metadata;
pub mod paths;

pub use crate::http::HttpError;
pub use crate::metadata::{MaterializeResult, Metadata, MetadataValue};
pub use crate::paths::BasePath;
