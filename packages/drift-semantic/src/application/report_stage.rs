//! Stage R: report, dependency atlas, and optional drift manifest update.

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::application::code_units_io::load_code_units;
use crate::domain::cluster::Cluster;
use crate::domain::code_unit::CodeUnit;
use crate::domain::finding::{DriftManifest, Finding, ManifestArea, Verdict};
use crate::domain::scored_pair::ScoredPair;
use crate::errors::Result;
use crate::infrastructure::artifact_store::ArtifactStore;

#[derive(Debug, Clone, Serialize)]
struct AtlasNode {
    id: String,
    kind: String,
    file_path: String,
}

#[derive(Debug, Clone, Serialize)]
struct AtlasEdge {
    source: String,
    target: String,
    weight: f64,
    dominant_signal: String,
}

#[derive(Debug, Clone, Serialize)]
struct DependencyAtlas {
    nodes: Vec<AtlasNode>,
    edges: Vec<AtlasEdge>,
}

/// Finding prose fields rendered into the report, in display order.
const PROSE_FIELDS: [(&str, &str); 7] = [
    ("sharedBehavior", "Shared behavior"),
    ("meaningfulDifferences", "Meaningful differences"),
    ("accidentalDifferences", "Accidental differences"),
    ("featureGaps", "Feature gaps"),
    ("consolidationComplexity", "Consolidation complexity"),
    ("consolidationReasoning", "Consolidation reasoning"),
    ("consumerImpact", "Consumer impact"),
];

fn verdict_label(v: Verdict) -> &'static str {
    match v {
        Verdict::Duplicate => "DUPLICATE",
        Verdict::Overlapping => "OVERLAPPING",
        Verdict::Related => "RELATED",
        Verdict::FalsePositive => "FALSE_POSITIVE",
    }
}

fn render_markdown(
    clusters: &[Cluster],
    findings_by_cluster: &HashMap<String, &Finding>,
    generated_at: chrono::DateTime<chrono::Utc>,
) -> String {
    let order = [
        Some(Verdict::Duplicate),
        Some(Verdict::Overlapping),
        Some(Verdict::Related),
        Some(Verdict::FalsePositive),
        None,
    ];

    let mut out = format!(
        "# Semantic Drift Report\n\nGenerated: {}\n\n",
        generated_at.to_rfc3339()
    );

    for bucket in order {
        let label = match bucket {
            Some(v) => verdict_label(v).to_string(),
            None => "Unverified".to_string(),
        };
        let members: Vec<&Cluster> = clusters
            .iter()
            .filter(|c| {
                let verdict = findings_by_cluster.get(&c.id).map(|f| f.verdict);
                verdict == bucket
            })
            .collect();
        if members.is_empty() {
            continue;
        }
        out.push_str(&format!("## {label}\n\n"));
        for cluster in members {
            out.push_str(&format!(
                "### {} ({} members, avg similarity {:.2})\n\n",
                cluster.id, cluster.member_count, cluster.avg_similarity
            ));
            for member in &cluster.members {
                out.push_str(&format!("- {member}\n"));
            }
            out.push('\n');
            out.push_str("Signal breakdown:\n\n");
            for (signal, value) in &cluster.signal_breakdown {
                out.push_str(&format!("- {signal}: {value:.4}\n"));
            }
            out.push('\n');
            if let Some(finding) = findings_by_cluster.get(&cluster.id) {
                for (key, label) in PROSE_FIELDS {
                    if let Some(prose) = finding.extra.get(key).and_then(|v| v.as_str()) {
                        if !prose.is_empty() {
                            out.push_str(&format!("{label}: {prose}\n\n"));
                        }
                    }
                }
            }
        }
    }

    out
}

fn build_atlas(clusters: &[Cluster], pairs: &[ScoredPair], units_by_id: &FxHashMap<String, CodeUnit>) -> DependencyAtlas {
    let member_set: std::collections::HashSet<&String> =
        clusters.iter().flat_map(|c| c.members.iter()).collect();

    let nodes: Vec<AtlasNode> = member_set
        .iter()
        .filter_map(|id| {
            units_by_id.get(*id).map(|u| AtlasNode {
                id: u.id.clone(),
                kind: u.kind.clone(),
                file_path: u.file_path.clone(),
            })
        })
        .collect();

    let edges: Vec<AtlasEdge> = pairs
        .iter()
        .filter(|p| member_set.contains(&p.unit_a) && member_set.contains(&p.unit_b))
        .map(|p| AtlasEdge {
            source: p.unit_a.clone(),
            target: p.unit_b.clone(),
            weight: p.score,
            dominant_signal: p.dominant_signal.clone(),
        })
        .collect();

    DependencyAtlas { nodes, edges }
}

fn update_manifest(manifest_path: &Path, clusters: &[Cluster], findings_by_cluster: &HashMap<String, &Finding>) -> Result<()> {
    let mut manifest: DriftManifest = if manifest_path.exists() {
        let bytes = std::fs::read(manifest_path)?;
        serde_json::from_slice(&bytes).unwrap_or_default()
    } else {
        DriftManifest::default()
    };

    let new_areas: Vec<ManifestArea> = clusters
        .iter()
        .filter_map(|c| {
            let finding = findings_by_cluster.get(&c.id)?;
            let impact = finding.verdict.manifest_impact()?;
            let mut extra = std::collections::BTreeMap::new();
            extra.insert("clusterId".to_string(), json!(c.id));
            extra.insert("members".to_string(), json!(c.members));
            Some(ManifestArea {
                kind: "semantic".to_string(),
                impact: impact.to_string(),
                extra,
            })
        })
        .collect();

    manifest.replace_semantic_areas(new_areas);
    let body = serde_json::to_string_pretty(&manifest).map_err(|source| {
        crate::errors::DriftError::MalformedArtifact {
            path: manifest_path.display().to_string(),
            source,
        }
    })?;
    std::fs::write(manifest_path, body)?;
    Ok(())
}

pub fn run(store: &ArtifactStore, manifest_path: Option<&Path>) -> Result<()> {
    info!("report: starting");
    let units = load_code_units(store)?;
    let units_by_id: FxHashMap<String, CodeUnit> = units.into_iter().map(|u| (u.id.clone(), u)).collect();
    let clusters: Vec<Cluster> = store.read_required("clusters", "cluster")?;
    let pairs: Vec<ScoredPair> = store.read_required("similarity-matrix", "score")?;
    let findings: Vec<Finding> = store.read_optional("findings")?.unwrap_or_default();

    let findings_by_cluster: HashMap<String, &Finding> =
        findings.iter().map(|f| (f.cluster_id.clone(), f)).collect();

    let markdown = render_markdown(&clusters, &findings_by_cluster, chrono::Utc::now());
    let report_path = store.output_dir().join("semantic-drift-report.md");
    std::fs::create_dir_all(store.output_dir())?;
    std::fs::write(&report_path, markdown)?;

    let atlas = build_atlas(&clusters, &pairs, &units_by_id);
    store.write("dependency-atlas", &atlas)?;

    if let Some(path) = manifest_path {
        update_manifest(path, &clusters, &findings_by_cluster)?;
    }

    info!(clusters = clusters.len(), "report: done");
    Ok(())
}
