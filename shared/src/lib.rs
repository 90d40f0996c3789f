//! Shared types and utilities for Helicorder
//!
//! This crate contains the data model flowing through the sampling pipeline:
//! kernel launches from the trace, the launches selected for detailed profiling,
//! and the utilization record built from their metrics.

pub mod types;
pub mod utils;

// Re-export commonly used types
pub use types::{events::*, profile::*};
