//! Importance ranking over the dependency graph
//!
//! Iterative PageRank over adjacency lists. An edge A -> B (A imports B)
//! is a vote for B, so heavily depended-upon files surface as hotspots.

use crate::analysis::graph::DependencyGraph;
use std::collections::HashMap;
use std::path::PathBuf;

pub struct RankingEngine {
    /// Probability of following an edge versus teleporting uniformly.
    pub damping: f64,
    /// Stop once the summed absolute score change drops below this.
    pub tolerance: f64,
    /// Hard cap when convergence is slow (cyclic graphs).
    pub max_iterations: usize,
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-4,
            max_iterations: 100,
        }
    }
}

impl RankingEngine {
    /// Computes a score per node. Scores are comparable relatively within
    /// one result; absolute magnitudes carry no meaning. An empty graph
    /// yields an empty map without iterating.
    pub fn analyze(&self, graph: &DependencyGraph) -> HashMap<PathBuf, f64> {
        let nodes = graph.nodes();
        let n = nodes.len();
        if n == 0 {
            return HashMap::new();
        }
        let n_f = n as f64;

        let mut scores: HashMap<&PathBuf, f64> =
            nodes.iter().map(|node| (node, 1.0 / n_f)).collect();

        // Reverse adjacency: who votes for each node.
        let mut incoming: HashMap<&PathBuf, Vec<&PathBuf>> = HashMap::new();
        for (from, targets) in graph.edges() {
            for to in targets {
                incoming.entry(to).or_default().push(from);
            }
        }

        for _ in 0..self.max_iterations {
            // Dangling nodes redistribute their entire mass uniformly;
            // without this the total mass leaks every iteration.
            let dangling_mass: f64 = nodes
                .iter()
                .filter(|node| graph.out_degree(node) == 0)
                .map(|node| scores[node])
                .sum();

            let mut delta = 0.0;
            let mut next: HashMap<&PathBuf, f64> = HashMap::with_capacity(n);
            for node in nodes {
                let incoming_sum: f64 = incoming
                    .get(node)
                    .map(|voters| {
                        voters
                            .iter()
                            .map(|voter| scores[*voter] / graph.out_degree(voter) as f64)
                            .sum()
                    })
                    .unwrap_or(0.0);

                let score = (1.0 - self.damping) / n_f
                    + self.damping * (incoming_sum + dangling_mass / n_f);
                delta += (score - scores[node]).abs();
                next.insert(node, score);
            }
            scores = next;

            if delta < self.tolerance {
                break;
            }
        }

        scores
            .into_iter()
            .map(|(node, score)| (node.clone(), score))
            .collect()
    }

    /// Top-k nodes by score, strictly descending, ties broken by the
    /// node's discovery order. Returns at most `k` entries; an empty graph
    /// or `k == 0` yields an empty list.
    pub fn top_hotspots(
        &self,
        graph: &DependencyGraph,
        scores: &HashMap<PathBuf, f64>,
        k: usize,
    ) -> Vec<(PathBuf, f64)> {
        if k == 0 {
            return Vec::new();
        }

        // Nodes come out in discovery order; the stable sort keeps that
        // order for equal scores.
        let mut ranked: Vec<(PathBuf, f64)> = graph
            .nodes()
            .iter()
            .filter_map(|node| scores.get(node).map(|s| (node.clone(), *s)))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(k);
        ranked
    }
}
