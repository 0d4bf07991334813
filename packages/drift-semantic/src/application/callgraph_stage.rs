//! Stage C entry point.

use tracing::info;

use crate::application::code_units_io::load_code_units;
use crate::domain::call_vector::compute_call_vectors;
use crate::errors::Result;
use crate::infrastructure::artifact_store::ArtifactStore;

pub fn run(store: &ArtifactStore) -> Result<()> {
    info!("callgraph: starting");
    let units = load_code_units(store)?;
    let vectors = compute_call_vectors(&units);
    store.write("call-graph", &vectors)?;
    info!(units = vectors.len(), "callgraph: done");
    Ok(())
}
