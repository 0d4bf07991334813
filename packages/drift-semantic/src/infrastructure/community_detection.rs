//! Deterministic greedy modularity maximization (Clauset-Newman-Moore)
//! over a weighted undirected graph.
//!
//! No crate in this stack exposes modularity-based community detection,
//! so this is a from-scratch port of the standard greedy-merge algorithm:
//! start with every node in its own community, repeatedly merge the pair
//! of communities with the largest positive modularity gain, stop when no
//! merge would improve modularity. Ties are broken by iterating candidate
//! pairs in sorted node-index order and keeping the first strict maximum,
//! which makes the result reproducible for a fixed input graph.

use std::collections::HashMap;

pub struct WeightedGraph {
    pub node_ids: Vec<String>,
    /// (i, j, weight) with i < j, one entry per undirected edge.
    pub edges: Vec<(usize, usize, f64)>,
}

/// Partition `graph` into communities. Returns a list of communities,
/// each a list of node ids, sorted for determinism.
pub fn greedy_modularity_communities(graph: &WeightedGraph) -> Vec<Vec<String>> {
    let n = graph.node_ids.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![graph.node_ids.clone()];
    }

    let mut degree = vec![0.0f64; n];
    for &(i, j, w) in &graph.edges {
        degree[i] += w;
        degree[j] += w;
    }
    let m2: f64 = degree.iter().sum();
    if m2 == 0.0 {
        return graph
            .node_ids
            .iter()
            .map(|id| vec![id.clone()])
            .collect();
    }

    // community id per node; communities are merged into the lower id.
    let mut parent: Vec<usize> = (0..n).collect();
    let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
    let mut comm_degree: Vec<f64> = degree.clone();

    let mut e: HashMap<(usize, usize), f64> = HashMap::new();
    for &(i, j, w) in &graph.edges {
        let key = if i < j { (i, j) } else { (j, i) };
        *e.entry(key).or_insert(0.0) += w;
    }

    loop {
        let mut best: Option<((usize, usize), f64)> = None;
        let mut keys: Vec<&(usize, usize)> = e.keys().collect();
        keys.sort();
        for &&(i, j) in &keys {
            let weight = e[&(i, j)];
            if weight <= 0.0 {
                continue;
            }
            let a_i = comm_degree[i] / m2;
            let a_j = comm_degree[j] / m2;
            let delta_q = 2.0 * (weight / m2 - a_i * a_j);
            match best {
                Some((_, best_dq)) if delta_q <= best_dq => {}
                _ => best = Some(((i, j), delta_q)),
            }
        }

        let Some(((i, j), delta_q)) = best else {
            break;
        };
        if delta_q <= 0.0 {
            break;
        }

        // merge j into i
        let moved = std::mem::take(&mut members[j]);
        members[i].extend(moved);
        for node in &members[i] {
            parent[*node] = i;
        }
        comm_degree[i] += comm_degree[j];
        comm_degree[j] = 0.0;

        let mut merged: HashMap<(usize, usize), f64> = HashMap::new();
        for ((a, b), w) in e.drain() {
            if a == j || b == j {
                continue;
            }
            let key = if a == i || b == i {
                if a == i {
                    (i.min(b), i.max(b))
                } else {
                    (i.min(a), i.max(a))
                }
            } else {
                (a, b)
            };
            if key.0 == key.1 {
                continue;
            }
            *merged.entry(key).or_insert(0.0) += w;
        }
        // re-fold any edge that involved j under its new i-based key.
        e = merged;
    }

    let mut communities: Vec<Vec<String>> = Vec::new();
    for (idx, comm_members) in members.iter().enumerate() {
        if comm_members.is_empty() {
            continue;
        }
        if parent[idx] != idx {
            continue;
        }
        let mut ids: Vec<String> = comm_members
            .iter()
            .map(|&n| graph.node_ids[n].clone())
            .collect();
        ids.sort();
        communities.push(ids);
    }
    communities.sort();
    communities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(ids: &[&str], edges: Vec<(usize, usize, f64)>) -> WeightedGraph {
        WeightedGraph {
            node_ids: ids.iter().map(|s| s.to_string()).collect(),
            edges,
        }
    }

    #[test]
    fn two_disjoint_dense_pairs_split_into_two_communities() {
        let g = graph(
            &["a", "b", "c", "d"],
            vec![(0, 1, 1.0), (2, 3, 1.0)],
        );
        let communities = greedy_modularity_communities(&g);
        assert_eq!(communities.len(), 2);
        assert!(communities.contains(&vec!["a".to_string(), "b".to_string()]));
        assert!(communities.contains(&vec!["c".to_string(), "d".to_string()]));
    }

    #[test]
    fn single_node_is_its_own_community() {
        let g = graph(&["a"], vec![]);
        assert_eq!(greedy_modularity_communities(&g), vec![vec!["a".to_string()]]);
    }

    #[test]
    fn no_edges_leaves_every_node_singleton() {
        let g = graph(&["a", "b", "c"], vec![]);
        let communities = greedy_modularity_communities(&g);
        assert_eq!(communities.len(), 3);
    }

    #[test]
    fn fully_connected_triangle_stays_one_community() {
        let g = graph(&["a", "b", "c"], vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]);
        let communities = greedy_modularity_communities(&g);
        assert_eq!(communities.len(), 1);
    }
}
