//! `embed`: calls an Ollama-compatible endpoint sequentially per unit to
//! embed its purpose statement. Requires `purpose-statements.json` to
//! already be ingested; units with no purpose statement are skipped.

use rustc_hash::FxHashMap;
use tracing::info;

use crate::domain::finding::PurposeStatement;
use crate::errors::Result;
use crate::infrastructure::artifact_store::ArtifactStore;
use crate::infrastructure::embedding_client::EmbeddingClient;

pub fn run(store: &ArtifactStore, ollama_url: &str, model: &str) -> Result<()> {
    info!(model, "embed: starting");
    let statements: Vec<PurposeStatement> =
        store.read_required("purpose-statements", "ingest-purposes")?;

    let client = EmbeddingClient::new(ollama_url, model);
    let mut embeddings: FxHashMap<String, Vec<f64>> = FxHashMap::default();

    for statement in &statements {
        if let Some(vector) = client.embed(&statement.unit_id, &statement.purpose)? {
            embeddings.insert(statement.unit_id.clone(), vector);
        }
    }

    info!(
        embedded = embeddings.len(),
        total = statements.len(),
        "embed: done"
    );
    store.write("semantic-embeddings", &embeddings)?;
    Ok(())
}
