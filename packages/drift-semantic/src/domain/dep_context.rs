//! Stage D: dependency-context vectors.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

use super::code_unit::CodeUnit;
use super::sparse_vector::SparseVector;
use crate::infrastructure::consumer_graph::ConsumerGraph;
use crate::infrastructure::hashing::canonical_sha256;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepContext {
    pub consumer_profile: [f64; 3],
    pub cooccurrence_vector: SparseVector,
    pub neighborhood_hash_r1: String,
    pub neighborhood_hash_r2: String,
}

fn shannon_entropy_base2<S: std::hash::BuildHasher>(counts: &HashMap<String, i64, S>) -> f64 {
    let total: i64 = counts.values().sum();
    if total <= 0 {
        return 0.0;
    }
    let total = total as f64;
    -counts
        .values()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            p * p.log2()
        })
        .sum::<f64>()
}

fn consumer_profile(unit: &CodeUnit) -> [f64; 3] {
    let consumer_count = unit.effective_consumer_count();
    let norm_count = (consumer_count as f64 / 50.0).min(1.0);

    let kind_counts = unit.consumer_kind_counts();
    let entropy = shannon_entropy_base2(&kind_counts);

    let dirs = unit.distinct_consumer_directories() as f64;
    let dir_spread = (dirs / (consumer_count.max(1) as f64)).clamp(0.0, 1.0);

    [norm_count, entropy, dir_spread]
}

fn cooccurrence_vector(unit: &CodeUnit) -> SparseVector {
    unit.co_occurrence_weights().into_iter().collect()
}

pub fn compute_dep_contexts(units: &[CodeUnit]) -> FxHashMap<String, DepContext> {
    let graph = ConsumerGraph::build(units);

    units
        .iter()
        .map(|unit| {
            let r1 = graph.neighborhood(&unit.id, 1);
            let r2 = graph.neighborhood(&unit.id, 2);
            let dc = DepContext {
                consumer_profile: consumer_profile(unit),
                cooccurrence_vector: cooccurrence_vector(unit),
                neighborhood_hash_r1: canonical_sha256(&json!(r1)),
                neighborhood_hash_r2: canonical_sha256(&json!(r2)),
            };
            (unit.id.clone(), dc)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bare_unit(id: &str) -> CodeUnit {
        serde_json::from_value(json!({ "id": id })).unwrap()
    }

    #[test]
    fn consumer_profile_caps_norm_count_at_one() {
        let mut unit = bare_unit("a");
        unit.consumer_count = Some(500);
        let profile = consumer_profile(&unit);
        assert_eq!(profile[0], 1.0);
    }

    #[test]
    fn consumer_profile_dir_spread_is_zero_with_no_consumers() {
        let unit = bare_unit("a");
        let profile = consumer_profile(&unit);
        assert_eq!(profile[2], 0.0);
    }

    #[test]
    fn entropy_is_zero_for_single_kind() {
        let mut counts = FxHashMap::default();
        counts.insert("page".to_string(), 5);
        assert_eq!(shannon_entropy_base2(&counts), 0.0);
    }

    #[test]
    fn entropy_is_one_bit_for_even_split_of_two_kinds() {
        let mut counts = FxHashMap::default();
        counts.insert("page".to_string(), 5);
        counts.insert("component".to_string(), 5);
        assert!((shannon_entropy_base2(&counts) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn neighborhood_hashes_differ_by_radius_when_graph_has_depth() {
        let mut a = bare_unit("a");
        a.consumers = vec![json!("b")];
        let mut b = bare_unit("b");
        b.consumers = vec![json!("c")];
        let units = vec![a, b, bare_unit("c")];
        let contexts = compute_dep_contexts(&units);
        let ctx_a = &contexts["a"];
        assert_ne!(ctx_a.neighborhood_hash_r1, ctx_a.neighborhood_hash_r2);
    }
}
