//! `run`: execute F, T, C, D, S, K, R in order.

use tracing::info;

use crate::application::{
    callgraph_stage, cluster_stage, depcontext_stage, fingerprint_stage, report_stage,
    score_stage, typesig_stage,
};
use crate::config::PipelineConfig;
use crate::errors::Result;
use crate::infrastructure::artifact_store::ArtifactStore;

pub fn run(store: &ArtifactStore, config: &PipelineConfig, manifest_path: Option<&std::path::Path>) -> Result<()> {
    info!("run: executing full pipeline");
    fingerprint_stage::run(store)?;
    typesig_stage::run(store)?;
    callgraph_stage::run(store)?;
    depcontext_stage::run(store)?;
    score_stage::run(store, config)?;
    cluster_stage::run(store, config)?;
    report_stage::run(store, manifest_path)?;
    info!("run: pipeline complete");
    Ok(())
}
