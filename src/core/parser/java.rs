use crate::core::parser::LanguageParser;
use crate::core::types::SourceRecord;
use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref PACKAGE_RE: Regex = Regex::new(r"^\s*package\s+([\w.]+)\s*;").unwrap();
    // `import static a.b.C.method;` contributes a.b.C.method; the exact-match
    // lookup simply fails for it, which is the accepted precision loss.
    static ref IMPORT_RE: Regex =
        Regex::new(r"^\s*import\s+(?:static\s+)?([\w.*]+)\s*;").unwrap();
}

/// Line-oriented regex extractor for Java sources.
pub struct JavaParser;

impl LanguageParser for JavaParser {
    fn parse(&self, path: &Path) -> Result<SourceRecord> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut package = String::new();
        let mut imports = Vec::new();

        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.starts_with("//") || trimmed.starts_with('*') {
                continue;
            }

            if trimmed.starts_with("package ") {
                if let Some(caps) = PACKAGE_RE.captures(trimmed) {
                    package = caps[1].to_string();
                }
            } else if trimmed.starts_with("import ") {
                if let Some(caps) = IMPORT_RE.captures(trimmed) {
                    imports.push(caps[1].to_string());
                }
            }
        }

        Ok(SourceRecord::new(path.to_path_buf(), package, imports))
    }
}
