//! `inspect`: read-only formatted-text queries over existing artifacts.

use rustc_hash::FxHashMap;

use crate::application::code_units_io::load_code_units;
use crate::domain::cluster::Cluster;
use crate::domain::code_unit::CodeUnit;
use crate::domain::scored_pair::ScoredPair;
use crate::errors::{DriftError, Result};
use crate::infrastructure::artifact_store::ArtifactStore;

fn not_found(kind: &str, id: &str) -> DriftError {
    DriftError::Pipeline(format!("{kind} '{id}' not found"))
}

pub fn unit(store: &ArtifactStore, id: &str) -> Result<String> {
    let units = load_code_units(store)?;
    let unit = units
        .iter()
        .find(|u| u.id == id)
        .ok_or_else(|| not_found("unit", id))?;
    Ok(format!(
        "{id}\n  kind: {kind}\n  file: {file}\n  name: {name}\n  parameters: {params}\n  returnType: {ret}",
        id = unit.id,
        kind = unit.kind,
        file = unit.file_path,
        name = unit.name,
        params = unit.parameters.len(),
        ret = unit.return_type,
    ))
}

pub fn similar(store: &ArtifactStore, id: &str) -> Result<String> {
    let pairs: Vec<ScoredPair> = store.read_required("similarity-matrix", "score")?;
    let mut matches: Vec<&ScoredPair> = pairs
        .iter()
        .filter(|p| p.unit_a == id || p.unit_b == id)
        .collect();
    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    if matches.is_empty() {
        return Ok(format!("no scored pairs involve '{id}'"));
    }

    let mut out = format!("units similar to {id}:\n");
    for pair in matches {
        let other = if pair.unit_a == id { &pair.unit_b } else { &pair.unit_a };
        out.push_str(&format!(
            "  {other}  score={:.4}  dominant={}\n",
            pair.score, pair.dominant_signal
        ));
    }
    Ok(out)
}

pub fn cluster(store: &ArtifactStore, id: &str) -> Result<String> {
    let clusters: Vec<Cluster> = store.read_required("clusters", "cluster")?;
    let cluster = clusters
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| not_found("cluster", id))?;

    let mut out = format!(
        "{id}\n  members: {count}\n  avgSimilarity: {avg:.4}\n  rankScore: {rank:.4}\n  members:\n",
        id = cluster.id,
        count = cluster.member_count,
        avg = cluster.avg_similarity,
        rank = cluster.rank_score,
    );
    for member in &cluster.members {
        out.push_str(&format!("    {member}\n"));
    }
    Ok(out)
}

pub fn consumers(store: &ArtifactStore, id: &str) -> Result<String> {
    let units = load_code_units(store)?;
    let unit = units
        .iter()
        .find(|u| u.id == id)
        .ok_or_else(|| not_found("unit", id))?;
    let consumer_ids = unit.consumer_ids();
    if consumer_ids.is_empty() {
        return Ok(format!("'{id}' has no recorded consumers"));
    }
    let mut sorted: Vec<&String> = consumer_ids.iter().collect();
    sorted.sort();
    let mut out = format!("consumers of {id}:\n");
    for c in sorted {
        out.push_str(&format!("  {c}\n"));
    }
    Ok(out)
}

pub fn callers(store: &ArtifactStore, id: &str) -> Result<String> {
    let units = load_code_units(store)?;
    let units_by_id: FxHashMap<String, CodeUnit> = units.iter().map(|u| (u.id.clone(), u.clone())).collect();
    if !units_by_id.contains_key(id) {
        return Err(not_found("unit", id));
    }
    let mut callers: Vec<&String> = units
        .iter()
        .filter(|u| u.callee_targets().iter().any(|t| t == id))
        .map(|u| &u.id)
        .collect();
    callers.sort();

    if callers.is_empty() {
        return Ok(format!("no unit calls '{id}'"));
    }
    let mut out = format!("units that call {id}:\n");
    for c in callers {
        out.push_str(&format!("  {c}\n"));
    }
    Ok(out)
}
