use crate::core::parser::LanguageParser;
use crate::core::types::SourceRecord;
use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    // Capture group 1 is the package name. Backticked identifiers are
    // legal in Kotlin; backticks are stripped after the match.
    static ref PACKAGE_RE: Regex = Regex::new(r"^\s*package\s+([`\w.]+)").unwrap();
    // Handles `import foo.bar`, `import foo.*` and `import foo.bar as baz`
    // (the alias is dropped, only foo.bar matters for the graph).
    static ref IMPORT_RE: Regex =
        Regex::new(r"^\s*import\s+([`\w.*]+)(?:\s+as\s+[`\w]+)?").unwrap();
}

/// Line-oriented regex extractor for Kotlin sources.
pub struct KotlinParser;

impl LanguageParser for KotlinParser {
    fn parse(&self, path: &Path) -> Result<SourceRecord> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut package = String::new();
        let mut imports = Vec::new();

        for line in content.lines() {
            let trimmed = line.trim();

            // Skip line comments and block comment bodies
            if trimmed.starts_with("//") || trimmed.starts_with('*') {
                continue;
            }

            if trimmed.starts_with("package ") {
                if let Some(caps) = PACKAGE_RE.captures(trimmed) {
                    package = caps[1].replace('`', "");
                }
            } else if trimmed.starts_with("import ") {
                if let Some(caps) = IMPORT_RE.captures(trimmed) {
                    imports.push(caps[1].replace('`', ""));
                }
            }
        }

        Ok(SourceRecord::new(path.to_path_buf(), package, imports))
    }
}
