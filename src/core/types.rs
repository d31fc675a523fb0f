//! Core types shared across CodeContext modules

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One parsed source file: its identity plus the declarations the
/// dependency graph is built from.
///
/// Records are immutable once produced by the pipeline; enrichment is a
/// functional update (`with_enrichment`) so cached and shared records are
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Absolute path of the source file. Node identity in the graph.
    pub path: PathBuf,
    /// Declared package name, empty string when the file has none.
    pub package: String,
    /// Import declarations in source order. Wildcard imports keep their
    /// trailing ".*" marker.
    pub imports: Vec<String>,
    /// Opaque payload attached by external collaborators (git history,
    /// report metadata). The pipeline never inspects it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<serde_json::Value>,
}

impl SourceRecord {
    pub fn new(path: PathBuf, package: String, imports: Vec<String>) -> Self {
        Self {
            path,
            package,
            imports,
            enrichment: None,
        }
    }

    /// Returns a new record carrying the given enrichment payload.
    pub fn with_enrichment(self, payload: serde_json::Value) -> Self {
        Self {
            enrichment: Some(payload),
            ..self
        }
    }

    /// File name without extension; combined with the package name this
    /// forms the fully qualified name other files import.
    pub fn type_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// `package.FileStem`, or the bare stem when no package is declared.
    pub fn qualified_name(&self) -> String {
        let name = self.type_name();
        if self.package.is_empty() {
            name
        } else {
            format!("{}.{}", self.package, name)
        }
    }
}

/// Events emitted during an analysis run
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Discovery has started
    StartScanning,
    /// Number of source files discovered
    FilesFound(usize),
    /// Coarse parsing progress, emitted at a fixed cadence
    Progress { processed: usize, total: usize },
    /// Memory-tier decision for the next batch
    BatchSized { batch_size: usize, free_mb: u64 },
    /// Graph construction finished
    GraphBuilt { nodes: usize, edges: usize },
    /// Run finished with a summary message
    Complete(String),
    /// Error occurred
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        let record = SourceRecord::new(
            PathBuf::from("/repo/src/Foo.kt"),
            "com.example".to_string(),
            vec![],
        );
        assert_eq!(record.qualified_name(), "com.example.Foo");

        let bare = SourceRecord::new(PathBuf::from("/repo/Bar.kt"), String::new(), vec![]);
        assert_eq!(bare.qualified_name(), "Bar");
    }

    #[test]
    fn test_enrichment_is_functional_update() {
        let record = SourceRecord::new(
            PathBuf::from("/repo/src/Foo.kt"),
            "com.example".to_string(),
            vec!["com.example.Bar".to_string()],
        );
        let enriched = record
            .clone()
            .with_enrichment(serde_json::json!({"churn": 12}));

        assert!(record.enrichment.is_none());
        assert_eq!(
            enriched.enrichment.as_ref().and_then(|v| v.get("churn")),
            Some(&serde_json::json!(12))
        );
        assert_eq!(enriched.imports, record.imports);
    }
}
