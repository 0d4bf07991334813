//! Stage F entry point.

use tracing::info;

use crate::application::code_units_io::load_code_units;
use crate::domain::fingerprint::compute_fingerprints;
use crate::errors::Result;
use crate::infrastructure::artifact_store::ArtifactStore;

pub fn run(store: &ArtifactStore) -> Result<()> {
    info!("fingerprint: starting");
    let units = load_code_units(store)?;
    let fingerprints = compute_fingerprints(&units);
    store.write("structural-fingerprints", &fingerprints)?;
    info!(units = fingerprints.len(), "fingerprint: done");
    Ok(())
}
