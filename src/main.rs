use anyhow::Result;
use clap::Parser;
use codecontext::core::cache::DiskCache;
use codecontext::{run, CodeContextConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "codecontext",
    version,
    about = "Analyze a codebase: file dependency graph and hotspot ranking",
    long_about = None
)]
struct Args {
    /// Directory to analyze
    path: Option<PathBuf>,

    /// Number of hotspots to report
    #[arg(short, long)]
    top: Option<usize>,

    /// Disable the parse cache for this run
    #[arg(long)]
    no_cache: bool,

    /// Cache directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Clear the parse cache and exit
    #[arg(long)]
    clear_cache: bool,

    /// Add exclude pattern (glob)
    #[arg(long)]
    exclude: Vec<String>,

    /// Write the full analysis (nodes, edges, scores, hotspots) as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // 1. Load from file or default
    let mut config = CodeContextConfig::load_from_file().unwrap_or_default();

    // 2. Override with CLI args
    if let Some(p) = args.path {
        config.path = p;
    }
    if let Some(t) = args.top {
        config.hotspot_count = t;
    }
    if args.no_cache {
        config.enable_cache = false;
    }
    if let Some(d) = args.cache_dir {
        config.cache_dir = d;
    }
    if !args.exclude.is_empty() {
        // CLI excludes ADD to config excludes
        config.exclude_patterns.extend(args.exclude);
    }
    if let Some(o) = args.output {
        config.output = Some(o);
    }
    if args.verbose {
        config.verbose = true;
    }

    if args.clear_cache {
        DiskCache::new(&config.cache_dir).clear();
        println!("Cache cleared.");
        return Ok(());
    }

    run(config)
}
