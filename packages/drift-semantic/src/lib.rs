//! Semantic drift similarity pipeline: feature derivation, adaptive-weighted
//! pairwise scoring, and graph-based clustering over a pre-extracted
//! inventory of code units.

pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infrastructure;

pub use config::PipelineConfig;
pub use errors::{DriftError, Result};
