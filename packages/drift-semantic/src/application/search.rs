//! `search`: read-only lookups across code units by relationship.

use crate::application::code_units_io::load_code_units;
use crate::domain::type_signature::compute_type_signature;
use crate::errors::{DriftError, Result};
use crate::infrastructure::artifact_store::ArtifactStore;

fn not_found(id: &str) -> DriftError {
    DriftError::Pipeline(format!("unit '{id}' not found"))
}

pub fn calls(store: &ArtifactStore, id: &str) -> Result<String> {
    let units = load_code_units(store)?;
    let unit = units.iter().find(|u| u.id == id).ok_or_else(|| not_found(id))?;
    let targets = unit.callee_targets();
    if targets.is_empty() {
        return Ok(format!("'{id}' calls nothing recorded"));
    }
    let mut out = format!("{id} calls:\n");
    for t in targets {
        out.push_str(&format!("  {t}\n"));
    }
    Ok(out)
}

pub fn called_by(store: &ArtifactStore, target: &str) -> Result<String> {
    let units = load_code_units(store)?;
    let mut callers: Vec<&String> = units
        .iter()
        .filter(|u| u.callee_targets().iter().any(|t| t == target))
        .map(|u| &u.id)
        .collect();
    callers.sort();
    if callers.is_empty() {
        return Ok(format!("nothing calls '{target}'"));
    }
    let mut out = format!("units calling {target}:\n");
    for c in callers {
        out.push_str(&format!("  {c}\n"));
    }
    Ok(out)
}

pub fn co_occurs_with(store: &ArtifactStore, id: &str) -> Result<String> {
    let units = load_code_units(store)?;
    let unit = units.iter().find(|u| u.id == id).ok_or_else(|| not_found(id))?;
    let weights = unit.co_occurrence_weights();
    if weights.is_empty() {
        return Ok(format!("'{id}' has no recorded co-occurrences"));
    }
    let mut sorted: Vec<(&String, &f64)> = weights.iter().collect();
    sorted.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
    let mut out = format!("units co-occurring with {id}:\n");
    for (other, weight) in sorted {
        out.push_str(&format!("  {other}  weight={weight:.4}\n"));
    }
    Ok(out)
}

pub fn type_like(store: &ArtifactStore, id: &str) -> Result<String> {
    let units = load_code_units(store)?;
    let unit = units.iter().find(|u| u.id == id).ok_or_else(|| not_found(id))?;
    let target_sig = compute_type_signature(unit);

    let mut matches: Vec<&String> = units
        .iter()
        .filter(|u| u.id != id)
        .filter(|u| {
            let sig = compute_type_signature(u);
            sig.strict_hash == target_sig.strict_hash || sig.loose_hash == target_sig.loose_hash
        })
        .map(|u| &u.id)
        .collect();
    matches.sort();

    if matches.is_empty() {
        return Ok(format!("no unit shares a type signature with '{id}'"));
    }
    let mut out = format!("units type-like {id}:\n");
    for m in matches {
        out.push_str(&format!("  {m}\n"));
    }
    Ok(out)
}
