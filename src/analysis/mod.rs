//! Code intelligence over the completed record set: dependency graph and
//! importance ranking.

pub mod graph;
pub mod rank;

pub use graph::DependencyGraph;
pub use rank::RankingEngine;
