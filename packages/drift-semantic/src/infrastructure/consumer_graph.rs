//! Consumer graph: directed edges `u -> c` where `c` consumes `u`.
//!
//! Represented as a plain adjacency map keyed by stable id strings, per
//! the cross-references-as-ids design note — no in-memory pointer graph.

use rustc_hash::FxHashMap;
use std::collections::HashSet;

use crate::domain::code_unit::CodeUnit;

pub struct ConsumerGraph {
    edges: FxHashMap<String, HashSet<String>>,
}

impl ConsumerGraph {
    pub fn build(units: &[CodeUnit]) -> Self {
        let mut edges: FxHashMap<String, HashSet<String>> = FxHashMap::default();
        for unit in units {
            let entry = edges.entry(unit.id.clone()).or_default();
            entry.extend(unit.consumer_ids());
        }
        Self { edges }
    }

    /// BFS from `start` up to radius `depth`, excluding `start` itself,
    /// returning the visited frontier sorted lexicographically.
    pub fn neighborhood(&self, start: &str, depth: usize) -> Vec<String> {
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(start.to_string());
        let mut frontier: Vec<String> = vec![start.to_string()];
        let mut collected: HashSet<String> = HashSet::new();

        for _ in 0..depth {
            let mut next = Vec::new();
            for node in &frontier {
                if let Some(neighbors) = self.edges.get(node) {
                    for n in neighbors {
                        if visited.insert(n.clone()) {
                            collected.insert(n.clone());
                            next.push(n.clone());
                        }
                    }
                }
            }
            frontier = next;
            if frontier.is_empty() {
                break;
            }
        }

        let mut out: Vec<String> = collected.into_iter().collect();
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unit(id: &str, consumers: Vec<&str>) -> CodeUnit {
        let mut u: CodeUnit = serde_json::from_value(json!({ "id": id })).unwrap();
        u.consumers = consumers.into_iter().map(|c| json!(c)).collect();
        u
    }

    #[test]
    fn radius_one_is_immediate_consumers_only() {
        let units = vec![unit("a", vec!["b", "c"]), unit("b", vec!["d"])];
        let graph = ConsumerGraph::build(&units);
        assert_eq!(graph.neighborhood("a", 1), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn radius_two_adds_consumers_of_consumers() {
        let units = vec![unit("a", vec!["b"]), unit("b", vec!["d"])];
        let graph = ConsumerGraph::build(&units);
        assert_eq!(graph.neighborhood("a", 2), vec!["b".to_string(), "d".to_string()]);
    }

    #[test]
    fn excludes_start_node_even_in_a_cycle() {
        let units = vec![unit("a", vec!["b"]), unit("b", vec!["a"])];
        let graph = ConsumerGraph::build(&units);
        assert_eq!(graph.neighborhood("a", 2), vec!["b".to_string()]);
    }
}
