//! Stage C: call-graph vectors.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::code_unit::{call_depth_buckets, CodeUnit};
use super::sparse_vector::SparseVector;
use crate::domain::fingerprint::inverse_document_frequencies;
use crate::infrastructure::hashing::canonical_sha256_of_list;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallVector {
    pub callee_set_vector: SparseVector,
    pub sequence_hashes: FxHashMap<String, String>,
    pub chain_pattern_hashes: Vec<String>,
    pub depth_profile: [u64; 3],
}

fn callee_set_vector(unit: &CodeUnit, idf: &FxHashMap<String, f64>) -> SparseVector {
    let mut v: SparseVector = SparseVector::default();
    for target in unit.callee_targets() {
        if let Some(weight) = idf.get(&target) {
            v.insert(target, *weight);
        }
    }
    v
}

fn sequence_hashes(unit: &CodeUnit) -> FxHashMap<String, String> {
    unit.callee_sequence
        .iter()
        .filter(|(_, seq)| !seq.is_empty())
        .map(|(context, seq)| (context.clone(), canonical_sha256_of_list(seq)))
        .collect()
}

fn is_empty_value(p: &Value) -> bool {
    match p {
        Value::Null => true,
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn chain_pattern_hashes(unit: &CodeUnit) -> Vec<String> {
    unit.chain_patterns
        .iter()
        .filter(|p| !is_empty_value(p))
        .map(|p| canonical_sha256_of_list(&[p.clone()]))
        .collect()
}

fn depth_profile(unit: &CodeUnit) -> [u64; 3] {
    call_depth_buckets(&unit.call_depth)
        .unwrap_or_else(|| [unit.callee_targets().len() as u64, 0, 0])
}

pub fn compute_call_vectors(units: &[CodeUnit]) -> FxHashMap<String, CallVector> {
    let callee_docs: Vec<Vec<String>> = units.iter().map(CodeUnit::callee_targets).collect();
    let idf = inverse_document_frequencies(callee_docs.iter(), units.len());

    units
        .iter()
        .map(|unit| {
            let cv = CallVector {
                callee_set_vector: callee_set_vector(unit, &idf),
                sequence_hashes: sequence_hashes(unit),
                chain_pattern_hashes: chain_pattern_hashes(unit),
                depth_profile: depth_profile(unit),
            };
            (unit.id.clone(), cv)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn bare_unit(id: &str) -> CodeUnit {
        serde_json::from_value(json!({ "id": id })).unwrap()
    }

    #[test]
    fn depth_profile_falls_back_to_unique_callee_count_when_no_call_depth() {
        let mut unit = bare_unit("a");
        unit.callees = vec![json!({"target": "foo"}), json!({"target": "bar"})];
        assert_eq!(depth_profile(&unit), [2, 0, 0]);
    }

    #[test]
    fn depth_profile_buckets_normalize_string_and_numeric_keys() {
        let mut unit = bare_unit("a");
        let mut depth = HashMap::new();
        depth.insert("1".to_string(), 3.0);
        depth.insert("2".to_string(), 1.0);
        depth.insert("4".to_string(), 2.0);
        unit.call_depth = depth;
        assert_eq!(depth_profile(&unit), [3, 1, 2]);
    }

    #[test]
    fn sequence_hashes_skip_empty_sequences() {
        let mut unit = bare_unit("a");
        unit.callee_sequence.insert("render".to_string(), vec!["a".to_string()]);
        unit.callee_sequence.insert("effect".to_string(), vec![]);
        let hashes = sequence_hashes(&unit);
        assert!(hashes.contains_key("render"));
        assert!(!hashes.contains_key("effect"));
    }
}
