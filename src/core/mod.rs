//! Core analysis pipeline: discovery, parsing, caching, coordination.

pub mod cache;
pub mod parser;
pub mod pipeline;
pub mod scanner;
pub mod types;

pub use scanner::discover_files;
pub use types::*;
