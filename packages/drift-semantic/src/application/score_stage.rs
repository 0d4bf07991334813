//! Stage S: the O(n^2) pairwise scoring hot path.

use indexmap::IndexMap;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::application::code_units_io::load_code_units;
use crate::config::PipelineConfig;
use crate::domain::call_vector::CallVector;
use crate::domain::code_unit::{parent_dir, CodeUnit, SKIP_KINDS};
use crate::domain::dep_context::DepContext;
use crate::domain::fingerprint::StructuralFingerprint;
use crate::domain::scored_pair::ScoredPair;
use crate::domain::similarity;
use crate::domain::type_signature::TypeSignature;
use crate::domain::weights::adapt_weights;
use crate::errors::Result;
use crate::infrastructure::artifact_store::ArtifactStore;

fn kinds_comparable(kind_a: &str, kind_b: &str) -> bool {
    if kind_a == kind_b {
        return true;
    }
    let related = [("component", "hook"), ("hook", "function")];
    related.iter().any(|(x, y)| {
        (kind_a == *x && kind_b == *y) || (kind_a == *y && kind_b == *x)
    })
}

struct UnitDerived<'a> {
    unit: &'a CodeUnit,
    fingerprint: &'a StructuralFingerprint,
    type_sig: &'a TypeSignature,
    call_vector: &'a CallVector,
    dep_context: &'a DepContext,
    embedding: Option<&'a Vec<f64>>,
    patterns: Option<&'a Vec<String>>,
}

fn score_pair(a: &UnitDerived, b: &UnitDerived, weight_tables: &[IndexMap<&'static str, f64>; 4], units_by_id: &FxHashMap<String, CodeUnit>) -> ScoredPair {
    let both_components = a.unit.kind == "component" && b.unit.kind == "component";
    let both_component_or_hook = ["component", "hook"].contains(&a.unit.kind.as_str())
        && ["component", "hook"].contains(&b.unit.kind.as_str());
    let table_idx = (both_components as usize) * 2 + (both_component_or_hook as usize);
    let weights = &weight_tables[table_idx];

    let mut raw_signals: BTreeMap<String, f64> = BTreeMap::new();

    if weights.contains_key("semantic") {
        let emb_a = a.embedding.map(|v| v.as_slice()).unwrap_or(&[]);
        let emb_b = b.embedding.map(|v| v.as_slice()).unwrap_or(&[]);
        raw_signals.insert("semantic".to_string(), similarity::semantic(emb_a, emb_b));
    }

    raw_signals.insert(
        "typeSignature".to_string(),
        similarity::type_signature(
            &a.type_sig.strict_hash,
            &b.type_sig.strict_hash,
            &a.type_sig.loose_hash,
            &b.type_sig.loose_hash,
            a.type_sig.arity,
            b.type_sig.arity,
        ),
    );

    if weights.contains_key("jsxStructure") {
        raw_signals.insert(
            "jsxStructure".to_string(),
            similarity::jsx_structure(
                a.fingerprint.jsx_hash.exact.as_deref(),
                b.fingerprint.jsx_hash.exact.as_deref(),
                a.fingerprint.jsx_hash.fuzzy.as_deref(),
                b.fingerprint.jsx_hash.fuzzy.as_deref(),
                a.unit.jsx_tree.as_ref(),
                b.unit.jsx_tree.as_ref(),
            ),
        );
    }

    if weights.contains_key("hookProfile") {
        raw_signals.insert(
            "hookProfile".to_string(),
            similarity::hook_profile(&a.fingerprint.hook_profile, &b.fingerprint.hook_profile),
        );
    }

    raw_signals.insert(
        "imports".to_string(),
        similarity::imports(&a.fingerprint.import_constellation, &b.fingerprint.import_constellation),
    );
    raw_signals.insert(
        "dataAccess".to_string(),
        similarity::data_access(&a.fingerprint.data_access_pattern, &b.fingerprint.data_access_pattern),
    );
    raw_signals.insert(
        "behavior".to_string(),
        similarity::behavior(&a.fingerprint.behavior_flags, &b.fingerprint.behavior_flags),
    );
    raw_signals.insert(
        "calleeSet".to_string(),
        similarity::callee_set(&a.call_vector.callee_set_vector, &b.call_vector.callee_set_vector),
    );
    raw_signals.insert(
        "callSequence".to_string(),
        similarity::call_sequence(
            &a.call_vector.sequence_hashes.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            &b.call_vector.sequence_hashes.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        ),
    );

    let consumers_a = a.unit.consumer_ids();
    let consumers_b = b.unit.consumer_ids();
    raw_signals.insert(
        "consumerSet".to_string(),
        similarity::consumer_set(&consumers_a, &consumers_b, |id| {
            units_by_id.get(id).and_then(|u| parent_dir(&u.file_path))
        }),
    );

    raw_signals.insert(
        "coOccurrence".to_string(),
        similarity::co_occurrence(&a.dep_context.cooccurrence_vector, &b.dep_context.cooccurrence_vector),
    );
    raw_signals.insert(
        "neighborhood".to_string(),
        similarity::neighborhood(
            &a.dep_context.neighborhood_hash_r1,
            &b.dep_context.neighborhood_hash_r1,
            &a.dep_context.neighborhood_hash_r2,
            &b.dep_context.neighborhood_hash_r2,
        ),
    );

    if weights.contains_key("structuralPattern") {
        let empty = Vec::new();
        let pa = a.patterns.unwrap_or(&empty);
        let pb = b.patterns.unwrap_or(&empty);
        raw_signals.insert(
            "structuralPattern".to_string(),
            similarity::structural_pattern(pa, pb),
        );
    }

    let mut score = 0.0;
    let mut dominant_signal = String::new();
    let mut dominant_value = f64::MIN;
    for (name, weight) in weights {
        if let Some(&value) = raw_signals.get(*name) {
            score += weight * value;
            if value > dominant_value {
                dominant_value = value;
                dominant_signal = (*name).to_string();
            }
        }
    }

    ScoredPair::new(
        a.unit.id.clone(),
        b.unit.id.clone(),
        score.clamp(0.0, 1.0),
        raw_signals,
        dominant_signal,
    )
}

pub fn run(store: &ArtifactStore, config: &PipelineConfig) -> Result<()> {
    info!("score: starting");
    let units = load_code_units(store)?;
    let fingerprints: FxHashMap<String, StructuralFingerprint> =
        store.read_required("structural-fingerprints", "fingerprint")?;
    let type_sigs: FxHashMap<String, TypeSignature> =
        store.read_required("type-signatures", "typesig")?;
    let call_vectors: FxHashMap<String, CallVector> =
        store.read_required("call-graph", "callgraph")?;
    let dep_contexts: FxHashMap<String, DepContext> =
        store.read_required("dependency-context", "depcontext")?;
    let embeddings: Option<FxHashMap<String, Vec<f64>>> =
        store.read_optional("semantic-embeddings")?;
    let patterns: Option<FxHashMap<String, Vec<String>>> =
        store.read_optional("structural-patterns")?;

    let has_embeddings = embeddings.is_some();
    let has_patterns = patterns.is_some();
    if !has_embeddings {
        warn!("score: no semantic-embeddings artifact, scoring without the semantic signal");
    }

    let weight_tables: [IndexMap<&'static str, f64>; 4] = [
        adapt_weights(has_embeddings, has_patterns, false, false),
        adapt_weights(has_embeddings, has_patterns, false, true),
        adapt_weights(has_embeddings, has_patterns, true, false),
        adapt_weights(has_embeddings, has_patterns, true, true),
    ];

    let units_by_id: FxHashMap<String, CodeUnit> =
        units.iter().map(|u| (u.id.clone(), u.clone())).collect();

    let candidates: Vec<&CodeUnit> = units
        .iter()
        .filter(|u| !SKIP_KINDS.contains(&u.kind.as_str()))
        .collect();

    let derived: Vec<UnitDerived> = candidates
        .iter()
        .filter_map(|&unit| {
            Some(UnitDerived {
                unit,
                fingerprint: fingerprints.get(&unit.id)?,
                type_sig: type_sigs.get(&unit.id)?,
                call_vector: call_vectors.get(&unit.id)?,
                dep_context: dep_contexts.get(&unit.id)?,
                embedding: embeddings.as_ref().and_then(|m| m.get(&unit.id)),
                patterns: patterns.as_ref().and_then(|m| m.get(&unit.id)),
            })
        })
        .collect();

    let n = derived.len();
    let indices: Vec<usize> = (0..n).collect();

    let score_row = |i: usize| -> Vec<ScoredPair> {
        let a = &derived[i];
        let mut row = Vec::new();
        for j in (i + 1)..n {
            let b = &derived[j];
            if !a.unit.file_path.is_empty() && a.unit.file_path == b.unit.file_path {
                continue;
            }
            if !kinds_comparable(&a.unit.kind, &b.unit.kind) {
                continue;
            }
            let pair = score_pair(a, b, &weight_tables, &units_by_id);
            debug!(a = %a.unit.id, b = %b.unit.id, score = pair.score, "scored pair");
            if pair.score >= config.threshold {
                row.push(pair);
            }
        }
        row
    };

    let mut scored: Vec<ScoredPair> = if config.parallel {
        indices.par_iter().flat_map(|&i| score_row(i)).collect()
    } else {
        indices.iter().flat_map(|&i| score_row(i)).collect()
    };

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.unit_a.cmp(&b.unit_a))
            .then_with(|| a.unit_b.cmp(&b.unit_b))
    });

    info!(pairs = scored.len(), "score: done");
    store.write("similarity-matrix", &scored)?;
    Ok(())
}
