//! Output record of stage S.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPair {
    pub unit_a: String,
    pub unit_b: String,
    pub score: f64,
    pub signals: BTreeMap<String, f64>,
    pub dominant_signal: String,
}

impl ScoredPair {
    /// Canonicalize so `unit_a < unit_b` lexicographically. Panics on
    /// `(A, A)` — callers must never construct a self-pair.
    pub fn new(
        unit_a: String,
        unit_b: String,
        score: f64,
        signals: BTreeMap<String, f64>,
        dominant_signal: String,
    ) -> Self {
        assert_ne!(unit_a, unit_b, "a scored pair must have distinct endpoints");
        let (unit_a, unit_b) = if unit_a < unit_b {
            (unit_a, unit_b)
        } else {
            (unit_b, unit_a)
        };
        Self {
            unit_a,
            unit_b,
            score,
            signals,
            dominant_signal,
        }
    }
}
