//! Adaptive weight tables for the scoring signals.
//!
//! Computed once per `(has_embeddings, has_patterns, kind_pair)`
//! combination and memoized across the O(n^2) scoring loop — see
//! `application::score_stage`.

use indexmap::IndexMap;

pub const SIGNAL_ORDER: [&str; 13] = [
    "semantic",
    "typeSignature",
    "jsxStructure",
    "hookProfile",
    "imports",
    "dataAccess",
    "behavior",
    "calleeSet",
    "callSequence",
    "consumerSet",
    "coOccurrence",
    "neighborhood",
    "structuralPattern",
];

fn base_table(has_embeddings: bool) -> IndexMap<&'static str, f64> {
    let mut m = IndexMap::new();
    if has_embeddings {
        m.insert("semantic", 0.20);
        m.insert("typeSignature", 0.12);
        m.insert("jsxStructure", 0.13);
        m.insert("hookProfile", 0.05);
        m.insert("imports", 0.05);
        m.insert("dataAccess", 0.03);
        m.insert("behavior", 0.02);
        m.insert("calleeSet", 0.10);
        m.insert("callSequence", 0.10);
        m.insert("consumerSet", 0.08);
        m.insert("coOccurrence", 0.07);
        m.insert("neighborhood", 0.05);
    } else {
        m.insert("typeSignature", 0.16);
        m.insert("jsxStructure", 0.16);
        m.insert("hookProfile", 0.06);
        m.insert("imports", 0.06);
        m.insert("dataAccess", 0.04);
        m.insert("behavior", 0.02);
        m.insert("calleeSet", 0.13);
        m.insert("callSequence", 0.13);
        m.insert("consumerSet", 0.10);
        m.insert("coOccurrence", 0.08);
        m.insert("neighborhood", 0.06);
    }
    m
}

/// Build the adapted weight table for a specific pair. `both_components`
/// gates `jsxStructure`; `both_component_or_hook` gates `hookProfile`.
pub fn adapt_weights(
    has_embeddings: bool,
    has_patterns: bool,
    both_components: bool,
    both_component_or_hook: bool,
) -> IndexMap<&'static str, f64> {
    let mut weights = base_table(has_embeddings);

    if has_patterns {
        let total: f64 = weights.values().sum();
        if total > 0.0 {
            let scale = (total - 0.05) / total;
            for v in weights.values_mut() {
                *v *= scale;
            }
        }
        weights.insert("structuralPattern", 0.05);
    }

    if !both_components {
        weights.shift_remove("jsxStructure");
    }
    if !both_component_or_hook {
        weights.shift_remove("hookProfile");
    }

    let total: f64 = weights.values().sum();
    if total > 0.0 {
        for v in weights.values_mut() {
            *v /= total;
        }
    }

    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_always_sum_to_one() {
        for has_emb in [true, false] {
            for has_pat in [true, false] {
                for both_c in [true, false] {
                    for both_ch in [true, false] {
                        let w = adapt_weights(has_emb, has_pat, both_c, both_ch);
                        let sum: f64 = w.values().sum();
                        assert!((sum - 1.0).abs() < 1e-9, "{:?}", w);
                    }
                }
            }
        }
    }

    #[test]
    fn dropping_jsx_structure_removes_it_entirely() {
        let w = adapt_weights(false, false, false, true);
        assert!(!w.contains_key("jsxStructure"));
        assert!(w.contains_key("hookProfile"));
    }

    #[test]
    fn patterns_add_structural_pattern_signal() {
        let w = adapt_weights(true, true, true, true);
        assert!((w["structuralPattern"] - 0.05).abs() < 1e-9);
    }

    #[test]
    fn without_embeddings_semantic_is_absent() {
        let w = adapt_weights(false, false, true, true);
        assert!(!w.contains_key("semantic"));
    }
}
