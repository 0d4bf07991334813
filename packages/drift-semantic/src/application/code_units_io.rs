//! Loads `code-units.json`, tolerating either a bare array or `{units: [...]}`.

use serde_json::Value;
use tracing::info;

use crate::domain::code_unit::CodeUnit;
use crate::errors::{DriftError, Result};
use crate::infrastructure::artifact_store::ArtifactStore;

pub fn load_code_units(store: &ArtifactStore) -> Result<Vec<CodeUnit>> {
    let raw: Value = store.read_required("code-units", "extraction (external)")?;
    let list = match raw {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("units") {
            Some(Value::Array(items)) => items,
            _ => return Err(DriftError::InvalidCodeUnits),
        },
        _ => return Err(DriftError::InvalidCodeUnits),
    };

    let units: Vec<CodeUnit> = list
        .into_iter()
        .map(serde_json::from_value)
        .collect::<std::result::Result<_, _>>()
        .map_err(|source| DriftError::MalformedArtifact {
            path: store.path("code-units").display().to_string(),
            source,
        })?;

    info!(count = units.len(), "loaded code units");
    Ok(units)
}
