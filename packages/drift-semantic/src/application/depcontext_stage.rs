//! Stage D entry point.

use tracing::info;

use crate::application::code_units_io::load_code_units;
use crate::domain::dep_context::compute_dep_contexts;
use crate::errors::Result;
use crate::infrastructure::artifact_store::ArtifactStore;

pub fn run(store: &ArtifactStore) -> Result<()> {
    info!("depcontext: starting");
    let units = load_code_units(store)?;
    let contexts = compute_dep_contexts(&units);
    store.write("dependency-context", &contexts)?;
    info!(units = contexts.len(), "depcontext: done");
    Ok(())
}
