//! MLflow REST pass-through.

mod client;
mod tracker;

pub use client::{Experiment, MlflowClient};
pub use tracker::MlflowTracker;
