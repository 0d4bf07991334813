//! External read-only inputs consumed by stage R: findings and purpose
//! statements, plus the drift manifest shape that R updates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Duplicate,
    Overlapping,
    Related,
    FalsePositive,
}

impl Verdict {
    pub fn manifest_impact(self) -> Option<&'static str> {
        match self {
            Verdict::Duplicate => Some("HIGH"),
            Verdict::Overlapping => Some("MEDIUM"),
            Verdict::Related | Verdict::FalsePositive => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub cluster_id: String,
    pub verdict: Verdict,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(flatten)]
    pub extra: std::collections::BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurposeStatement {
    pub unit_id: String,
    pub purpose: String,
}

/// One entry in the drift manifest's `areas` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestArea {
    #[serde(rename = "type")]
    pub kind: String,
    pub impact: String,
    #[serde(flatten)]
    pub extra: std::collections::BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriftManifest {
    #[serde(default)]
    pub areas: Vec<ManifestArea>,
}

impl DriftManifest {
    /// Replace all entries of type `semantic`, preserving everything else.
    pub fn replace_semantic_areas(&mut self, new_areas: Vec<ManifestArea>) {
        self.areas.retain(|a| a.kind != "semantic");
        self.areas.extend(new_areas);
    }
}
