//! Run orchestration
//!
//! Wires discovery, the parse pipeline, graph construction and ranking
//! into one run. `analyze` is the library entry point consumers use to get
//! the full result; `run` is the CLI wrapper that spawns the analysis on a
//! background thread and consumes progress events on the calling thread.

use crate::analysis::{DependencyGraph, RankingEngine};
use crate::config::CodeContextConfig;
use crate::core::cache::{DiskCache, NoCache, ParseCache};
use crate::core::pipeline::ParsePipeline;
use crate::core::scanner::discover_files;
use crate::core::types::{ScanEvent, SourceRecord};
use anyhow::{anyhow, Result};
use crossbeam_channel::Sender;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything one analysis run produces. Consumers (report, learning
/// path, AI) get read-only access; graph and scores are rebuilt from
/// scratch on every run.
#[derive(Debug)]
pub struct AnalysisResult {
    pub records: Vec<SourceRecord>,
    pub graph: DependencyGraph,
    pub scores: HashMap<PathBuf, f64>,
    pub hotspots: Vec<(PathBuf, f64)>,
}

/// Runs the full pipeline: discover, parse (cache-first, parallel), build
/// the graph, rank. Per-file failures are absorbed by the pipeline; only
/// structural failures (bad root, nothing parseable) surface here.
pub fn analyze(config: &CodeContextConfig, tx: Option<Sender<ScanEvent>>) -> Result<AnalysisResult> {
    let notify = |e: ScanEvent| {
        if let Some(ref tx) = tx {
            let _ = tx.send(e);
        }
    };

    notify(ScanEvent::StartScanning);
    config.validate()?;

    let files = discover_files(&config.path, &config.exclude_patterns)?;
    if files.is_empty() {
        return Err(crate::error::Error::NothingToAnalyze(config.path.clone()).into());
    }
    notify(ScanEvent::FilesFound(files.len()));

    let cache: Arc<dyn ParseCache> = if config.enable_cache {
        Arc::new(DiskCache::new(&config.cache_dir))
    } else {
        Arc::new(NoCache)
    };

    let pipeline = ParsePipeline::new(cache, tx.clone());
    let records = pipeline.parse_all(&files);
    if records.is_empty() {
        // Every single file failed to parse; there is nothing to rank.
        return Err(crate::error::Error::NothingToAnalyze(config.path.clone()).into());
    }

    let graph = DependencyGraph::build(&records);
    notify(ScanEvent::GraphBuilt {
        nodes: graph.node_count(),
        edges: graph.edge_count(),
    });

    let engine = RankingEngine::default();
    let scores = engine.analyze(&graph);
    let hotspots = engine.top_hotspots(&graph, &scores, config.hotspot_count);

    notify(ScanEvent::Complete(format!(
        "Analyzed {} of {} files ({} edges)",
        records.len(),
        files.len(),
        graph.edge_count()
    )));

    Ok(AnalysisResult {
        records,
        graph,
        scores,
        hotspots,
    })
}

/// CLI entry point: runs `analyze` on a background thread, prints progress
/// while it runs, then the hotspot table and the optional JSON dump.
pub fn run(config: CodeContextConfig) -> Result<()> {
    let (tx, rx) = crossbeam_channel::unbounded();

    let config_clone = config.clone();
    let handle = std::thread::spawn(move || analyze(&config_clone, Some(tx)));

    for event in rx {
        match event {
            ScanEvent::StartScanning => {
                if config.verbose {
                    println!("Scanning {} ...", config.path.display());
                }
            }
            ScanEvent::FilesFound(n) => {
                if config.verbose {
                    println!("Found {} source files.", n);
                }
            }
            ScanEvent::BatchSized { batch_size, free_mb } => {
                if config.verbose {
                    println!("Batch size {} ({} MB free)", batch_size, free_mb);
                }
            }
            ScanEvent::Progress { processed, total } => {
                if config.verbose {
                    println!("Progress: {}/{} files", processed, total);
                }
            }
            ScanEvent::GraphBuilt { nodes, edges } => {
                if config.verbose {
                    println!("Graph: {} nodes, {} edges", nodes, edges);
                }
            }
            ScanEvent::Complete(msg) => {
                if config.verbose {
                    println!("{}", msg);
                }
            }
            ScanEvent::Error(e) => eprintln!("Error: {}", e),
        }
    }

    let result = handle
        .join()
        .map_err(|_| anyhow!("analysis thread panicked"))??;

    println!("Top hotspots:");
    for (i, (path, score)) in result.hotspots.iter().enumerate() {
        let name = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        println!("{:>4}. {:<40} {:.4}", i + 1, name, score);
    }

    if let Some(ref output) = config.output {
        std::fs::write(output, render_json(&result)?)?;
        println!("Analysis written to {}", output.display());
    }

    Ok(())
}

/// Serializes the node/edge sets, score mapping and hotspot list for
/// external consumers. Edges go through a BTreeMap so the dump is stable
/// across runs.
fn render_json(result: &AnalysisResult) -> Result<String> {
    let edges: BTreeMap<String, Vec<String>> = result
        .graph
        .edges()
        .iter()
        .map(|(from, targets)| {
            let mut targets: Vec<String> =
                targets.iter().map(|t| t.display().to_string()).collect();
            targets.sort();
            (from.display().to_string(), targets)
        })
        .collect();

    let scores: BTreeMap<String, f64> = result
        .scores
        .iter()
        .map(|(path, score)| (path.display().to_string(), *score))
        .collect();

    let report = serde_json::json!({
        "nodes": result.graph.nodes(),
        "edges": edges,
        "scores": scores,
        "hotspots": result
            .hotspots
            .iter()
            .map(|(path, score)| serde_json::json!({"path": path, "score": score}))
            .collect::<Vec<_>>(),
    });
    Ok(serde_json::to_string_pretty(&report)?)
}
