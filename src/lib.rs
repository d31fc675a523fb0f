pub mod analysis;
pub mod config;
pub mod core;
pub mod error;
pub mod runner;
pub mod server;

// Re-export key items for convenience
pub use analysis::{DependencyGraph, RankingEngine};
pub use config::{CodeContextConfig, RateLimitConfig};
pub use core::{ScanEvent, SourceRecord};
pub use error::Error;
pub use runner::{analyze, run, AnalysisResult};
pub use server::RateLimiter;
