//! Sparse vector math used across the scoring signals.
//!
//! Vectors are represented as sparse name->weight maps rather than dense
//! arrays, since most signals (imports, store access, data sources) draw
//! from an unbounded and mostly-disjoint vocabulary.

use rustc_hash::FxHashMap;

pub type SparseVector = FxHashMap<String, f64>;

/// Dot product, iterating the smaller map for efficiency.
pub fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(k, v)| large.get(k).map(|w| v * w))
        .sum()
}

/// L2 norm.
pub fn magnitude(v: &SparseVector) -> f64 {
    v.values().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cosine similarity, clamped to `[0, 1]`. Returns `0.0` if either vector
/// has zero magnitude.
pub fn cosine_sim(a: &SparseVector, b: &SparseVector) -> f64 {
    let mag_a = magnitude(a);
    let mag_b = magnitude(b);
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    let sim = dot(a, b) / (mag_a * mag_b);
    sim.clamp(0.0, 1.0)
}

/// Jaccard similarity over two string sets. Two empty sets yield `0.0`,
/// not `1.0` — a deliberate deviation from the "empty sets are identical"
/// convention used elsewhere in this pipeline.
pub fn jaccard_sim<'a, I>(a: I, b: I) -> f64
where
    I: IntoIterator<Item = &'a String>,
{
    let a: std::collections::HashSet<&String> = a.into_iter().collect();
    let b: std::collections::HashSet<&String> = b.into_iter().collect();
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Normalized Hamming similarity over two equal-length flag vectors:
/// fraction of matching positions. Two empty vectors are defined as
/// identical (`1.0`), the opposite convention from `jaccard_sim`.
pub fn normalized_hamming(a: &[u8], b: &[u8]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let matches = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
    matches as f64 / a.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_from(pairs: &[(&str, f64)]) -> SparseVector {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn cosine_identical_vectors_is_one() {
        let a = vec_from(&[("x", 1.0), ("y", 2.0)]);
        assert!((cosine_sim(&a, &a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_orthogonal_vectors_is_zero() {
        let a = vec_from(&[("x", 1.0)]);
        let b = vec_from(&[("y", 1.0)]);
        assert_eq!(cosine_sim(&a, &b), 0.0);
    }

    #[test]
    fn cosine_empty_vector_is_zero() {
        let a = SparseVector::default();
        let b = vec_from(&[("x", 1.0)]);
        assert_eq!(cosine_sim(&a, &b), 0.0);
        assert_eq!(cosine_sim(&a, &a), 0.0);
    }

    #[test]
    fn jaccard_two_empty_sets_is_zero() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(jaccard_sim(empty.iter(), empty.iter()), 0.0);
    }

    #[test]
    fn jaccard_disjoint_sets_is_zero() {
        let a = vec!["a".to_string()];
        let b = vec!["b".to_string()];
        assert_eq!(jaccard_sim(a.iter(), b.iter()), 0.0);
    }

    #[test]
    fn jaccard_identical_sets_is_one() {
        let a = vec!["a".to_string(), "b".to_string()];
        assert_eq!(jaccard_sim(a.iter(), a.iter()), 1.0);
    }

    #[test]
    fn hamming_two_empty_vectors_is_one() {
        assert_eq!(normalized_hamming(&[], &[]), 1.0);
    }

    #[test]
    fn hamming_mismatched_length_is_zero() {
        assert_eq!(normalized_hamming(&[1, 0], &[1, 0, 1]), 0.0);
    }

    #[test]
    fn hamming_partial_match() {
        assert_eq!(normalized_hamming(&[1, 0, 1, 0], &[1, 1, 1, 1]), 0.5);
    }
}
