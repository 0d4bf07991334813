//! Per-signal comparators used by the scoring stage.
//!
//! Each function returns a value in `[0, 1]`. These are pure and
//! independent of weighting; `crate::application::score_stage` combines
//! them with the adapted weight table.

use super::code_unit::JsxNode;
use super::sparse_vector::{cosine_sim, jaccard_sim, normalized_hamming, SparseVector};

/// Cosine similarity over dense embedding vectors, treated positionally.
/// Returns 0 if either is empty or lengths mismatch entirely (no comparable
/// positions).
pub fn semantic(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let n = a.len().min(b.len());
    let dot: f64 = a[..n].iter().zip(&b[..n]).map(|(x, y)| x * y).sum();
    let mag_a = a[..n].iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b = b[..n].iter().map(|x| x * x).sum::<f64>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    (dot / (mag_a * mag_b)).clamp(0.0, 1.0)
}

pub fn type_signature(
    strict_a: &str,
    strict_b: &str,
    loose_a: &str,
    loose_b: &str,
    arity_a: usize,
    arity_b: usize,
) -> f64 {
    if strict_a == strict_b {
        1.0
    } else if loose_a == loose_b {
        0.7
    } else if arity_a == arity_b && arity_a > 0 {
        0.4
    } else {
        0.0
    }
}

fn count_tree_nodes(node: &JsxNode) -> usize {
    1 + node.children.iter().map(count_tree_nodes).sum::<usize>()
}

/// Count structurally-aligned matching nodes: same tag at the same
/// position, children paired by index (greedy, not an optimal tree edit
/// distance — an approximation per design).
fn count_matching_nodes(a: &JsxNode, b: &JsxNode) -> usize {
    if a.tag != b.tag {
        return 0;
    }
    let mut matches = 1;
    for (ca, cb) in a.children.iter().zip(b.children.iter()) {
        matches += count_matching_nodes(ca, cb);
    }
    matches
}

/// jsxStructure signal. Exact/fuzzy hash match short-circuit to 1.0/0.9;
/// otherwise approximate tree-edit similarity `min(1, 2M/T)`.
pub fn jsx_structure(
    exact_a: Option<&str>,
    exact_b: Option<&str>,
    fuzzy_a: Option<&str>,
    fuzzy_b: Option<&str>,
    tree_a: Option<&JsxNode>,
    tree_b: Option<&JsxNode>,
) -> f64 {
    match (exact_a, exact_b) {
        (Some(x), Some(y)) if x == y => return 1.0,
        _ => {}
    }
    match (fuzzy_a, fuzzy_b) {
        (Some(x), Some(y)) if x == y => return 0.9,
        _ => {}
    }
    match (tree_a, tree_b) {
        (Some(a), Some(b)) => {
            let m = count_matching_nodes(a, b) as f64;
            let t = (count_tree_nodes(a) + count_tree_nodes(b)) as f64;
            if t == 0.0 {
                0.0
            } else {
                (2.0 * m / t).min(1.0)
            }
        }
        _ => 0.0,
    }
}

pub fn hook_profile(a: &[i64; 10], b: &[i64; 10]) -> f64 {
    let av: SparseVector = (0..10)
        .filter(|&i| a[i] != 0)
        .map(|i| (i.to_string(), a[i] as f64))
        .collect();
    let bv: SparseVector = (0..10)
        .filter(|&i| b[i] != 0)
        .map(|i| (i.to_string(), b[i] as f64))
        .collect();
    cosine_sim(&av, &bv)
}

pub fn imports(a: &SparseVector, b: &SparseVector) -> f64 {
    cosine_sim(a, b)
}

pub fn data_access(a: &SparseVector, b: &SparseVector) -> f64 {
    let keys_a: Vec<String> = a.keys().cloned().collect();
    let keys_b: Vec<String> = b.keys().cloned().collect();
    jaccard_sim(keys_a.iter(), keys_b.iter())
}

pub fn behavior(a: &[u8; 8], b: &[u8; 8]) -> f64 {
    normalized_hamming(a, b)
}

pub fn callee_set(a: &SparseVector, b: &SparseVector) -> f64 {
    cosine_sim(a, b)
}

/// 1.0 if any shared context's sequence hash matches; else a partial
/// credit proportional to the fraction of contexts shared.
pub fn call_sequence(
    a: &std::collections::HashMap<String, String>,
    b: &std::collections::HashMap<String, String>,
) -> f64 {
    use rustc_hash::FxHashMap;
    let a: FxHashMap<&String, &String> = a.iter().collect();
    let b: FxHashMap<&String, &String> = b.iter().collect();
    let shared: Vec<&&String> = a.keys().filter(|k| b.contains_key(**k)).collect();
    if shared.is_empty() {
        return 0.0;
    }
    if shared.iter().any(|k| a[**k] == b[**k]) {
        return 1.0;
    }
    let denom = a.len().max(b.len()) as f64;
    0.3 * shared.len() as f64 / denom
}

/// Jaccard of consumer-id sets, boosted 1.2x (clamped to 1.0) if the
/// shared consumers span >=2 distinct parent directories.
pub fn consumer_set(
    ids_a: &std::collections::HashSet<String>,
    ids_b: &std::collections::HashSet<String>,
    consumer_directory_of: impl Fn(&str) -> Option<String>,
) -> f64 {
    let base = jaccard_sim(ids_a.iter(), ids_b.iter());
    if base == 0.0 {
        return 0.0;
    }
    let shared_dirs: std::collections::HashSet<String> = ids_a
        .intersection(ids_b)
        .filter_map(|id| consumer_directory_of(id))
        .collect();
    if shared_dirs.len() >= 2 {
        (base * 1.2).min(1.0)
    } else {
        base
    }
}

pub fn co_occurrence(a: &SparseVector, b: &SparseVector) -> f64 {
    cosine_sim(a, b)
}

pub fn neighborhood(r1_a: &str, r1_b: &str, r2_a: &str, r2_b: &str) -> f64 {
    if r1_a == r1_b {
        1.0
    } else if r2_a == r2_b {
        0.6
    } else {
        0.0
    }
}

pub fn structural_pattern(a: &[String], b: &[String]) -> f64 {
    jaccard_sim(a.iter(), b.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_returns_zero_for_empty_embeddings() {
        assert_eq!(semantic(&[], &[1.0]), 0.0);
        assert_eq!(semantic(&[1.0], &[]), 0.0);
    }

    #[test]
    fn semantic_identical_vectors_is_one() {
        assert!((semantic(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn type_signature_strict_match_wins() {
        assert_eq!(type_signature("h1", "h1", "l1", "l2", 1, 2), 1.0);
    }

    #[test]
    fn type_signature_loose_match_when_strict_differs() {
        assert_eq!(type_signature("h1", "h2", "l1", "l1", 1, 2), 0.7);
    }

    #[test]
    fn type_signature_arity_fallback_requires_nonzero() {
        assert_eq!(type_signature("h1", "h2", "l1", "l2", 0, 0), 0.0);
        assert_eq!(type_signature("h1", "h2", "l1", "l2", 2, 2), 0.4);
    }

    #[test]
    fn jsx_structure_exact_match() {
        assert_eq!(
            jsx_structure(Some("x"), Some("x"), Some("y"), Some("z"), None, None),
            1.0
        );
    }

    #[test]
    fn jsx_structure_fuzzy_match_when_exact_differs() {
        assert_eq!(
            jsx_structure(Some("x"), Some("x2"), Some("y"), Some("y"), None, None),
            0.9
        );
    }

    #[test]
    fn jsx_structure_tree_edit_fallback() {
        let a = JsxNode {
            tag: "div".into(),
            children: vec![JsxNode {
                tag: "span".into(),
                children: vec![],
            }],
        };
        let b = JsxNode {
            tag: "div".into(),
            children: vec![JsxNode {
                tag: "p".into(),
                children: vec![],
            }],
        };
        let score = jsx_structure(Some("a"), Some("b"), Some("c"), Some("d"), Some(&a), Some(&b));
        assert!(score > 0.0 && score < 1.0);
    }

    #[test]
    fn call_sequence_exact_match_among_shared_contexts() {
        let mut a = std::collections::HashMap::new();
        a.insert("render".to_string(), "h1".to_string());
        let mut b = std::collections::HashMap::new();
        b.insert("render".to_string(), "h1".to_string());
        assert_eq!(call_sequence(&a, &b), 1.0);
    }

    #[test]
    fn call_sequence_no_shared_context_is_zero() {
        let mut a = std::collections::HashMap::new();
        a.insert("render".to_string(), "h1".to_string());
        let mut b = std::collections::HashMap::new();
        b.insert("effect".to_string(), "h1".to_string());
        assert_eq!(call_sequence(&a, &b), 0.0);
    }

    #[test]
    fn consumer_set_boost_requires_two_distinct_directories() {
        let a: std::collections::HashSet<String> =
            ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
        let b = a.clone();
        let dirs = |id: &str| match id {
            "x" => Some("dirA".to_string()),
            "y" => Some("dirB".to_string()),
            _ => Some("dirA".to_string()),
        };
        let score = consumer_set(&a, &b, dirs);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn behavior_empty_flags_are_identical() {
        assert_eq!(behavior(&[0; 8], &[0; 8]), 1.0);
    }
}
