//! Per-language source parsers
//!
//! Each parser turns one file into a [`SourceRecord`]. Dispatch is a closed
//! extension table: discovery only hands the pipeline files with a
//! recognized extension, so hitting [`Error::UnsupportedFile`] from inside
//! the pipeline indicates a caller bug, not a parse failure.

mod java;
mod kotlin;

pub use java::JavaParser;
pub use kotlin::KotlinParser;

use crate::core::types::SourceRecord;
use crate::error::{Error, Result};
use std::path::Path;

/// Capability implemented by every per-language extractor.
pub trait LanguageParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<SourceRecord>;
}

/// Extensions the pipeline accepts. Discovery filters against this list.
pub const RECOGNIZED_EXTENSIONS: &[&str] = &["kt", "kts", "java"];

static KOTLIN: KotlinParser = KotlinParser;
static JAVA: JavaParser = JavaParser;

/// Closed extension -> parser lookup.
pub fn parser_for(path: &Path) -> Result<&'static dyn LanguageParser> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("kt") | Some("kts") => Ok(&KOTLIN),
        Some("java") => Ok(&JAVA),
        _ => Err(Error::UnsupportedFile(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_dispatch_is_closed() {
        assert!(parser_for(&PathBuf::from("Foo.kt")).is_ok());
        assert!(parser_for(&PathBuf::from("build.kts")).is_ok());
        assert!(parser_for(&PathBuf::from("Foo.java")).is_ok());
        assert!(matches!(
            parser_for(&PathBuf::from("Foo.py")),
            Err(Error::UnsupportedFile(_))
        ));
        assert!(matches!(
            parser_for(&PathBuf::from("Makefile")),
            Err(Error::UnsupportedFile(_))
        ));
    }
}
