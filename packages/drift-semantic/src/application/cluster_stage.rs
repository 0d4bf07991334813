//! Stage K: clustering, enrichment, and ranking.

use petgraph::unionfind::UnionFind;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{info, warn};

use crate::application::code_units_io::load_code_units;
use crate::config::PipelineConfig;
use crate::domain::cluster::Cluster;
use crate::domain::code_unit::{app_level_dir, CodeUnit};
use crate::domain::scored_pair::ScoredPair;
use crate::domain::sparse_vector::jaccard_sim;
use crate::errors::Result;
use crate::infrastructure::artifact_store::ArtifactStore;
use crate::infrastructure::community_detection::{greedy_modularity_communities, WeightedGraph};

fn connected_components(node_ids: &[String], edges: &[(usize, usize, f64)]) -> Vec<Vec<usize>> {
    let mut uf = UnionFind::new(node_ids.len());
    for &(i, j, _) in edges {
        uf.union(i, j);
    }
    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..node_ids.len() {
        groups.entry(uf.find(i)).or_default().push(i);
    }
    let mut components: Vec<Vec<usize>> = groups.into_values().collect();
    components.sort_by_key(|c| c.iter().min().copied().unwrap_or(0));
    components
}

fn split_into_clusters(
    node_ids: &[String],
    edges: &[(usize, usize, f64)],
) -> Vec<Vec<String>> {
    let components = connected_components(node_ids, edges);
    let mut clusters: Vec<Vec<String>> = Vec::new();

    for component in components {
        if component.len() <= 5 {
            clusters.push(component.iter().map(|&i| node_ids[i].clone()).collect());
            continue;
        }

        let local_index: HashMap<usize, usize> =
            component.iter().enumerate().map(|(local, &global)| (global, local)).collect();
        let sub_ids: Vec<String> = component.iter().map(|&i| node_ids[i].clone()).collect();
        let sub_edges: Vec<(usize, usize, f64)> = edges
            .iter()
            .filter(|(i, j, _)| local_index.contains_key(i) && local_index.contains_key(j))
            .map(|&(i, j, w)| (local_index[&i], local_index[&j], w))
            .collect();

        let graph = WeightedGraph {
            node_ids: sub_ids.clone(),
            edges: sub_edges,
        };

        let communities = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            greedy_modularity_communities(&graph)
        }));

        match communities {
            Ok(communities) => {
                for community in communities {
                    if community.len() >= 2 {
                        clusters.push(community);
                    }
                }
            }
            Err(_) => {
                warn!(size = component.len(), "community detection failed, keeping whole component");
                clusters.push(sub_ids);
            }
        }
    }

    clusters.retain(|c| c.len() >= 2);
    clusters
}

struct Enriched {
    members: Vec<String>,
    avg_similarity: f64,
    signal_breakdown: BTreeMap<String, f64>,
    directory_spread: usize,
    kind_mix: BTreeMap<String, usize>,
    shared_callees: Vec<String>,
    consumer_overlap: f64,
}

fn enrich(
    members: Vec<String>,
    pairs_by_key: &HashMap<(String, String), &ScoredPair>,
    units_by_id: &FxHashMap<String, CodeUnit>,
) -> Enriched {
    let member_set: HashSet<&String> = members.iter().collect();
    let mut intra_edges: Vec<&ScoredPair> = Vec::new();
    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            let key = if members[i] < members[j] {
                (members[i].clone(), members[j].clone())
            } else {
                (members[j].clone(), members[i].clone())
            };
            if let Some(&pair) = pairs_by_key.get(&key) {
                intra_edges.push(pair);
            }
        }
    }

    let avg_similarity = if intra_edges.is_empty() {
        0.0
    } else {
        intra_edges.iter().map(|p| p.score).sum::<f64>() / intra_edges.len() as f64
    };

    let mut signal_sums: BTreeMap<String, f64> = BTreeMap::new();
    let mut signal_counts: BTreeMap<String, usize> = BTreeMap::new();
    for pair in &intra_edges {
        for (name, value) in &pair.signals {
            *signal_sums.entry(name.clone()).or_insert(0.0) += value;
            *signal_counts.entry(name.clone()).or_insert(0) += 1;
        }
    }
    let signal_breakdown: BTreeMap<String, f64> = signal_sums
        .into_iter()
        .map(|(name, sum)| {
            let count = signal_counts[&name] as f64;
            let mean = sum / count;
            (name, (mean * 10000.0).round() / 10000.0)
        })
        .collect();

    let directories: HashSet<String> = members
        .iter()
        .filter_map(|id| units_by_id.get(id))
        .map(|u| app_level_dir(&u.file_path))
        .collect();
    let directory_spread = directories.len();

    let mut kind_mix: BTreeMap<String, usize> = BTreeMap::new();
    for id in &members {
        if let Some(unit) = units_by_id.get(id) {
            *kind_mix.entry(unit.kind.clone()).or_insert(0) += 1;
        }
    }

    let mut callee_member_counts: HashMap<String, usize> = HashMap::new();
    for id in &members {
        if let Some(unit) = units_by_id.get(id) {
            let targets: HashSet<String> = unit.callee_targets().into_iter().collect();
            for t in targets {
                *callee_member_counts.entry(t).or_insert(0) += 1;
            }
        }
    }
    let half = members.len() as f64 / 2.0;
    let mut shared_callees: Vec<String> = callee_member_counts
        .into_iter()
        .filter(|(_, count)| (*count as f64) > half)
        .map(|(name, _)| name)
        .collect();
    shared_callees.sort();

    let mut overlaps = Vec::new();
    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            let ca = units_by_id.get(&members[i]).map(|u| u.consumer_ids()).unwrap_or_default();
            let cb = units_by_id.get(&members[j]).map(|u| u.consumer_ids()).unwrap_or_default();
            if ca.is_empty() && cb.is_empty() {
                continue;
            }
            overlaps.push(jaccard_sim(ca.iter(), cb.iter()));
        }
    }
    let consumer_overlap = if overlaps.is_empty() {
        0.0
    } else {
        overlaps.iter().sum::<f64>() / overlaps.len() as f64
    };

    let _ = member_set;
    Enriched {
        members,
        avg_similarity,
        signal_breakdown,
        directory_spread,
        kind_mix,
        shared_callees,
        consumer_overlap,
    }
}

pub fn run(store: &ArtifactStore, _config: &PipelineConfig) -> Result<()> {
    info!("cluster: starting");
    let units = load_code_units(store)?;
    let units_by_id: FxHashMap<String, CodeUnit> = units.into_iter().map(|u| (u.id.clone(), u)).collect();
    let scored_pairs: Vec<ScoredPair> = store.read_required("similarity-matrix", "score")?;

    let mut node_set: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
    for pair in &scored_pairs {
        node_set.insert(pair.unit_a.clone());
        node_set.insert(pair.unit_b.clone());
    }
    let node_ids: Vec<String> = node_set.into_iter().collect();
    let index_of: HashMap<&String, usize> = node_ids.iter().enumerate().map(|(i, n)| (n, i)).collect();

    let edges: Vec<(usize, usize, f64)> = scored_pairs
        .iter()
        .map(|p| (index_of[&p.unit_a], index_of[&p.unit_b], p.score))
        .collect();

    let pairs_by_key: HashMap<(String, String), &ScoredPair> = scored_pairs
        .iter()
        .map(|p| ((p.unit_a.clone(), p.unit_b.clone()), p))
        .collect();

    let member_groups = split_into_clusters(&node_ids, &edges);

    let mut enriched: Vec<Enriched> = member_groups
        .into_iter()
        .map(|members| enrich(members, &pairs_by_key, &units_by_id))
        .collect();

    enriched.sort_by(|a, b| {
        let rank_a = rank_score(a);
        let rank_b = rank_score(b);
        rank_b
            .partial_cmp(&rank_a)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let clusters: Vec<Cluster> = enriched
        .into_iter()
        .enumerate()
        .map(|(idx, e)| {
            let rank_score = rank_score(&e);
            Cluster {
                id: format!("cluster-{:03}", idx + 1),
                member_count: e.members.len(),
                members: e.members,
                avg_similarity: e.avg_similarity,
                signal_breakdown: e.signal_breakdown,
                directory_spread: e.directory_spread,
                kind_mix: e.kind_mix,
                shared_callees: e.shared_callees,
                consumer_overlap: e.consumer_overlap,
                rank_score,
            }
        })
        .collect();

    info!(clusters = clusters.len(), "cluster: done");
    store.write("clusters", &clusters)?;
    Ok(())
}

fn rank_score(e: &Enriched) -> f64 {
    let kind_bonus = if e.kind_mix.len() > 1 { 1.2 } else { 1.0 };
    e.members.len() as f64 * e.avg_similarity * (e.directory_spread.max(1) as f64) * kind_bonus
}
