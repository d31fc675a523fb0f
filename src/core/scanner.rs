//! File discovery
//!
//! Walks the repository root, applies the exclude globs on top of the
//! standard gitignore filters, and keeps only files whose extension the
//! parser table recognizes. Discovery is the boundary in front of the
//! pipeline: everything it returns is parseable by contract.

use crate::core::parser::RECOGNIZED_EXTENSIONS;
use crate::error::{Error, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Discovers source files under `root`, sorted for determinism. Paths are
/// absolute (the canonicalized root is the walk base). An unreadable or
/// non-directory root is a hard failure.
pub fn discover_files(root: &Path, exclude_patterns: &[String]) -> Result<Vec<PathBuf>> {
    let root = root
        .canonicalize()
        .map_err(|_| Error::InvalidRoot(root.to_path_buf()))?;
    if !root.is_dir() {
        return Err(Error::InvalidRoot(root));
    }

    let mut builder = WalkBuilder::new(&root);

    // In the override builder "!glob" means ignore-this-glob, matching how
    // users express exclude patterns.
    let mut override_builder = ignore::overrides::OverrideBuilder::new(&root);
    for pattern in exclude_patterns {
        override_builder
            .add(&format!("!{}", pattern))
            .map_err(|e| Error::Config(format!("bad exclude pattern {:?}: {}", pattern, e)))?;
    }
    let overrides = override_builder
        .build()
        .map_err(|e| Error::Config(e.to_string()))?;
    builder.overrides(overrides);
    builder.standard_filters(true);

    let mut files = Vec::new();
    for result in builder.build() {
        match result {
            Ok(entry) => {
                if entry.file_type().is_some_and(|ft| ft.is_file())
                    && has_recognized_extension(entry.path())
                {
                    files.push(entry.into_path());
                }
            }
            Err(e) => warn!(error = %e, "error walking directory"),
        }
    }

    files.sort();
    Ok(files)
}

fn has_recognized_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| RECOGNIZED_EXTENSIONS.contains(&ext))
}
