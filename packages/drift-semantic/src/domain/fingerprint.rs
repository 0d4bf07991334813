//! Stage F: structural fingerprints.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::code_unit::{CodeUnit, HOOK_ORDER};
use super::sparse_vector::SparseVector;
use crate::infrastructure::hashing::canonical_sha256;

static CUSTOM_COMPONENT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]+$").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsxHash {
    pub exact: Option<String>,
    pub fuzzy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralFingerprint {
    pub jsx_hash: JsxHash,
    pub hook_profile: [i64; 10],
    pub import_constellation: SparseVector,
    pub behavior_flags: [u8; 8],
    pub data_access_pattern: SparseVector,
}

/// Canonicalize a JSX tree into a `serde_json::Value`, optionally
/// replacing custom-component tags (`^[A-Z][A-Za-z0-9]+$`) with `<C>`.
fn canonicalize_jsx(node: &super::code_unit::JsxNode, fuzzy: bool) -> Value {
    let tag = if fuzzy && CUSTOM_COMPONENT_TAG.is_match(&node.tag) {
        "<C>".to_string()
    } else {
        node.tag.clone()
    };
    let children: Vec<Value> = node
        .children
        .iter()
        .map(|c| canonicalize_jsx(c, fuzzy))
        .collect();
    json!({ "tag": tag, "children": children })
}

fn jsx_hash(unit: &CodeUnit) -> JsxHash {
    match &unit.jsx_tree {
        None => JsxHash {
            exact: None,
            fuzzy: None,
        },
        Some(tree) => JsxHash {
            exact: Some(canonical_sha256(&canonicalize_jsx(tree, false))),
            fuzzy: Some(canonical_sha256(&canonicalize_jsx(tree, true))),
        },
    }
}

fn hook_profile(unit: &CodeUnit) -> [i64; 10] {
    let counts = unit.hook_counts();
    let mut profile = [0i64; 10];
    for (idx, hook) in HOOK_ORDER.iter().enumerate() {
        profile[idx] = *counts.get(*hook).unwrap_or(&0);
    }
    profile
}

/// `idf(s) = ln(N / df(s))`, `df(s)` = number of distinct units whose
/// vocabulary (import source or callee target) includes `s`.
pub fn inverse_document_frequencies<'a>(
    doc_terms: impl Iterator<Item = &'a Vec<String>>,
    total_docs: usize,
) -> FxHashMap<String, f64> {
    let mut doc_freq: FxHashMap<String, usize> = FxHashMap::default();
    for terms in doc_terms {
        let unique: std::collections::HashSet<&String> = terms.iter().collect();
        for t in unique {
            *doc_freq.entry(t.clone()).or_insert(0) += 1;
        }
    }
    doc_freq
        .into_iter()
        .map(|(term, df)| {
            let idf = if df == 0 {
                0.0
            } else {
                (total_docs as f64 / df as f64).ln()
            };
            (term, idf)
        })
        .collect()
}

fn import_constellation(unit: &CodeUnit, idf: &FxHashMap<String, f64>) -> SparseVector {
    let mut counts: FxHashMap<String, f64> = FxHashMap::default();
    for source in unit.import_sources() {
        if let Some(weight) = idf.get(&source) {
            *counts.entry(source).or_insert(0.0) += weight;
        }
    }
    counts
}

fn data_access_pattern(unit: &CodeUnit) -> SparseVector {
    let mut v: SparseVector = SparseVector::default();
    for name in unit.store_access_names() {
        *v.entry(format!("store:{name}")).or_insert(0.0) += 1.0;
    }
    for name in unit.data_source_access_names() {
        *v.entry(format!("ds:{name}")).or_insert(0.0) += 1.0;
    }
    v
}

/// Compute structural fingerprints for every unit. IDF is computed once
/// over the whole corpus before per-unit vectors are built.
pub fn compute_fingerprints(units: &[CodeUnit]) -> FxHashMap<String, StructuralFingerprint> {
    let import_docs: Vec<Vec<String>> = units.iter().map(CodeUnit::import_sources).collect();
    let idf = inverse_document_frequencies(import_docs.iter(), units.len());

    units
        .iter()
        .map(|unit| {
            let fp = StructuralFingerprint {
                jsx_hash: jsx_hash(unit),
                hook_profile: hook_profile(unit),
                import_constellation: import_constellation(unit, &idf),
                behavior_flags: unit.behavior_flags(),
                data_access_pattern: data_access_pattern(unit),
            };
            (unit.id.clone(), fp)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::code_unit::JsxNode;

    fn bare_unit(id: &str) -> CodeUnit {
        serde_json::from_value(json!({ "id": id })).unwrap()
    }

    #[test]
    fn jsx_hash_is_none_when_tree_absent() {
        let unit = bare_unit("a");
        let h = jsx_hash(&unit);
        assert!(h.exact.is_none());
        assert!(h.fuzzy.is_none());
    }

    #[test]
    fn jsx_fuzzy_hash_matches_across_renamed_custom_tags() {
        let mut a = bare_unit("a");
        a.jsx_tree = Some(JsxNode {
            tag: "Foo".into(),
            children: vec![JsxNode {
                tag: "div".into(),
                children: vec![],
            }],
        });
        let mut b = bare_unit("b");
        b.jsx_tree = Some(JsxNode {
            tag: "Bar".into(),
            children: vec![JsxNode {
                tag: "div".into(),
                children: vec![],
            }],
        });
        let ha = jsx_hash(&a);
        let hb = jsx_hash(&b);
        assert_ne!(ha.exact, hb.exact);
        assert_eq!(ha.fuzzy, hb.fuzzy);
    }

    #[test]
    fn jsx_exact_hash_preserves_native_tags() {
        let mut a = bare_unit("a");
        a.jsx_tree = Some(JsxNode {
            tag: "div".into(),
            children: vec![],
        });
        let mut b = bare_unit("b");
        b.jsx_tree = Some(JsxNode {
            tag: "span".into(),
            children: vec![],
        });
        assert_ne!(jsx_hash(&a).exact, jsx_hash(&b).exact);
    }

    #[test]
    fn hook_profile_sums_bare_string_entries_as_count_one() {
        let mut unit = bare_unit("a");
        unit.hook_calls = vec![json!("useState"), json!("useState"), json!("useEffect")];
        let profile = hook_profile(&unit);
        assert_eq!(profile[0], 2);
        assert_eq!(profile[1], 1);
    }

    #[test]
    fn import_constellation_drops_out_of_corpus_sources() {
        let mut a = bare_unit("a");
        a.imports = vec![json!({"source": "react"})];
        let idf = inverse_document_frequencies(std::iter::empty::<&Vec<String>>(), 0);
        let v = import_constellation(&a, &idf);
        assert!(v.is_empty());
    }
}
