//! Asset functions, grouped the way the hosting UI groups them.
//!
//! Each asset is a plain function of its upstream values and the resources it
//! names. They know nothing about scheduling; [`crate::definitions`] wires
//! them together.

pub mod data;
pub mod llm;
pub mod models;
pub mod viz;
