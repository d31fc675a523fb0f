use std::path::PathBuf;
use thiserror::Error;

/// Error taxonomy for the analysis pipeline.
///
/// Only the structural variants (`InvalidRoot`, `NothingToAnalyze`,
/// `Config`) ever reach the caller of a full run. `Parse` and `Cache`
/// failures are caught at the task boundary inside the pipeline, logged,
/// and converted into exclusion from the result set.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid repository path: {0:?}")]
    InvalidRoot(PathBuf),

    #[error("no source files found under {0:?}")]
    NothingToAnalyze(PathBuf),

    #[error("unsupported file type: {0:?}")]
    UnsupportedFile(PathBuf),

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache i/o failure: {0}")]
    Cache(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
