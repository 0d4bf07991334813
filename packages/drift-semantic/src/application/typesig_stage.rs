//! Stage T entry point.

use rustc_hash::FxHashMap;
use tracing::info;

use crate::application::code_units_io::load_code_units;
use crate::domain::type_signature::compute_type_signature;
use crate::errors::Result;
use crate::infrastructure::artifact_store::ArtifactStore;

pub fn run(store: &ArtifactStore) -> Result<()> {
    info!("typesig: starting");
    let units = load_code_units(store)?;
    let signatures: FxHashMap<String, _> = units
        .iter()
        .map(|u| (u.id.clone(), compute_type_signature(u)))
        .collect();
    store.write("type-signatures", &signatures)?;
    info!(units = signatures.len(), "typesig: done");
    Ok(())
}
