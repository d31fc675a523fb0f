//! File dependency graph
//!
//! Nodes are file paths, edges point from importer to imported. Node order
//! is the discovery order of the input records, which later serves as the
//! deterministic tie-breaker for equal rank scores.

use crate::core::types::SourceRecord;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<PathBuf>,
    index: HashMap<PathBuf, usize>,
    edges: HashMap<PathBuf, HashSet<PathBuf>>,
}

impl DependencyGraph {
    /// Builds the graph from a completed record set. Deterministic and
    /// idempotent: identical records always yield identical node and edge
    /// sets.
    ///
    /// Resolution runs in two passes: first every record becomes a node
    /// and registers its qualified name, then each import is matched
    /// against that table. An exact import links to the single file whose
    /// qualified name matches; a wildcard import (`foo.bar.*`) links to
    /// every other file whose package is exactly `foo.bar` -- no
    /// sub-package transitivity, that imprecision is deliberate.
    /// Unresolved imports (stdlib, third party) add no edge.
    pub fn build(records: &[SourceRecord]) -> Self {
        let mut graph = Self::default();
        let mut resolution: HashMap<String, PathBuf> = HashMap::new();

        for record in records {
            graph.add_node(record.path.clone());
            resolution.insert(record.qualified_name(), record.path.clone());
        }

        for source in records {
            for import in &source.imports {
                if let Some(prefix) = import.strip_suffix(".*") {
                    for target in records {
                        if target.package == prefix && target.path != source.path {
                            graph.add_edge(source.path.clone(), target.path.clone());
                        }
                    }
                } else if let Some(target) = resolution.get(import) {
                    if *target != source.path {
                        graph.add_edge(source.path.clone(), target.clone());
                    }
                }
            }
        }

        graph
    }

    fn add_node(&mut self, path: PathBuf) {
        if !self.index.contains_key(&path) {
            self.index.insert(path.clone(), self.nodes.len());
            self.nodes.push(path);
        }
    }

    fn add_edge(&mut self, from: PathBuf, to: PathBuf) {
        debug_assert!(self.index.contains_key(&from) && self.index.contains_key(&to));
        self.edges.entry(from).or_default().insert(to);
    }

    /// Nodes in discovery order.
    pub fn nodes(&self) -> &[PathBuf] {
        &self.nodes
    }

    pub fn edges(&self) -> &HashMap<PathBuf, HashSet<PathBuf>> {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(HashSet::len).sum()
    }

    pub fn has_node(&self, path: &Path) -> bool {
        self.index.contains_key(path)
    }

    pub fn out_degree(&self, path: &Path) -> usize {
        self.edges.get(path).map_or(0, HashSet::len)
    }

    /// Position of a node in discovery order.
    pub fn discovery_index(&self, path: &Path) -> Option<usize> {
        self.index.get(path).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, package: &str, imports: &[&str]) -> SourceRecord {
        SourceRecord::new(
            PathBuf::from(path),
            package.to_string(),
            imports.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_exact_import_resolution() {
        let records = vec![
            record("/r/App.kt", "com.example", &["com.example.core.Engine"]),
            record("/r/core/Engine.kt", "com.example.core", &[]),
        ];
        let graph = DependencyGraph::build(&records);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges()[Path::new("/r/App.kt")].contains(Path::new("/r/core/Engine.kt")));
    }

    #[test]
    fn test_wildcard_matches_exact_package_only() {
        let records = vec![
            record("/r/App.kt", "com.app", &["com.example.*"]),
            record("/r/A.kt", "com.example", &[]),
            record("/r/B.kt", "com.example", &[]),
            record("/r/Sub.kt", "com.example.sub", &[]),
        ];
        let graph = DependencyGraph::build(&records);

        let targets = &graph.edges()[Path::new("/r/App.kt")];
        assert!(targets.contains(Path::new("/r/A.kt")));
        assert!(targets.contains(Path::new("/r/B.kt")));
        assert!(
            !targets.contains(Path::new("/r/Sub.kt")),
            "wildcard must not match sub-packages"
        );
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_no_self_edges() {
        // A file wildcard-importing its own package, or naming itself,
        // must not produce a self-edge.
        let records = vec![
            record("/r/A.kt", "com.example", &["com.example.*", "com.example.A"]),
            record("/r/B.kt", "com.example", &[]),
        ];
        let graph = DependencyGraph::build(&records);

        let targets = &graph.edges()[Path::new("/r/A.kt")];
        assert_eq!(targets.len(), 1);
        assert!(targets.contains(Path::new("/r/B.kt")));
    }

    #[test]
    fn test_duplicate_imports_yield_one_edge() {
        let records = vec![
            record(
                "/r/A.kt",
                "com.example",
                &["com.example.B", "com.example.B", "com.example.*"],
            ),
            record("/r/B.kt", "com.example", &[]),
        ];
        let graph = DependencyGraph::build(&records);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_unresolved_imports_are_not_errors() {
        let records = vec![record(
            "/r/A.kt",
            "com.example",
            &["java.io.File", "kotlinx.coroutines.*"],
        )];
        let graph = DependencyGraph::build(&records);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_build_is_deterministic() {
        let records = vec![
            record("/r/A.kt", "p", &["p.B", "p.*"]),
            record("/r/B.kt", "p", &["p.C"]),
            record("/r/C.kt", "p", &["p.A"]),
        ];
        let first = DependencyGraph::build(&records);
        let second = DependencyGraph::build(&records);

        assert_eq!(first.nodes(), second.nodes());
        assert_eq!(first.edges(), second.edges());
    }

    #[test]
    fn test_empty_package_uses_bare_name() {
        let records = vec![
            record("/r/Main.kt", "", &["Helper"]),
            record("/r/Helper.kt", "", &[]),
        ];
        let graph = DependencyGraph::build(&records);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges()[Path::new("/r/Main.kt")].contains(Path::new("/r/Helper.kt")));
    }
}
