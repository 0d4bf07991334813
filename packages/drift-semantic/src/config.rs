//! Pipeline configuration, constructed from CLI flags.

use std::path::PathBuf;

pub const DEFAULT_OUTPUT_DIR: &str = ".drift-audit/semantic";
pub const DEFAULT_THRESHOLD: f64 = 0.35;
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub output_dir: PathBuf,
    pub threshold: f64,
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            threshold: DEFAULT_THRESHOLD,
            parallel: true,
        }
    }
}
