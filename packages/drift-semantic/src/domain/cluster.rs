//! Output record of stage K.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    pub members: Vec<String>,
    pub member_count: usize,
    pub avg_similarity: f64,
    pub signal_breakdown: BTreeMap<String, f64>,
    pub directory_spread: usize,
    pub kind_mix: BTreeMap<String, usize>,
    pub shared_callees: Vec<String>,
    pub consumer_overlap: f64,
    pub rank_score: f64,
}
