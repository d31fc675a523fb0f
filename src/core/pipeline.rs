//! Parallel parsing coordinator
//!
//! Batches the discovered files, checks the cache before invoking a
//! parser, isolates per-file failures, and reports coarse progress. The
//! rayon join at the end of every batch is a hard barrier: the next batch
//! sizing decision and all downstream graph work only ever see fully
//! materialized batches.

use crate::core::cache::ParseCache;
use crate::core::parser::parser_for;
use crate::core::types::{ScanEvent, SourceRecord};
use crossbeam_channel::Sender;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use sysinfo::System;
use tracing::warn;

/// Emit a progress event after this many completed files.
const PROGRESS_INTERVAL: usize = 100;

/// Selects a batch size from the current memory headroom. Tight headroom
/// bounds the number of in-flight tasks so memory use stays flat on very
/// large trees.
fn batch_size_for(available_bytes: u64) -> usize {
    match available_bytes {
        b if b < 256_000_000 => 25,
        b if b < 512_000_000 => 50,
        _ => 100,
    }
}

pub struct ParsePipeline {
    cache: Arc<dyn ParseCache>,
    observer: Option<Sender<ScanEvent>>,
}

impl ParsePipeline {
    pub fn new(cache: Arc<dyn ParseCache>, observer: Option<Sender<ScanEvent>>) -> Self {
        Self { cache, observer }
    }

    fn notify(&self, event: ScanEvent) {
        if let Some(ref tx) = self.observer {
            let _ = tx.send(event);
        }
    }

    /// Parses every file, cache-first, returning the records that
    /// succeeded. Membership, not order, is the contract: a failed file is
    /// logged and excluded, never fatal. Runs every task of a batch to
    /// completion before sizing the next batch.
    pub fn parse_all(&self, files: &[PathBuf]) -> Vec<SourceRecord> {
        let total = files.len();
        let processed = AtomicUsize::new(0);
        let mut records = Vec::with_capacity(total);
        let mut sys = System::new();

        let mut offset = 0;
        while offset < total {
            sys.refresh_memory();
            let available = sys.available_memory();
            let batch_size = batch_size_for(available);
            self.notify(ScanEvent::BatchSized {
                batch_size,
                free_mb: available / 1_000_000,
            });

            let end = (offset + batch_size).min(total);
            // collect() joins every task of the batch, success or failure.
            let batch: Vec<SourceRecord> = files[offset..end]
                .par_iter()
                .filter_map(|path| self.parse_one(path, &processed, total))
                .collect();
            records.extend(batch);
            offset = end;
        }

        records
    }

    fn parse_one(
        &self,
        path: &PathBuf,
        processed: &AtomicUsize,
        total: usize,
    ) -> Option<SourceRecord> {
        let record = match self.cache.get(path) {
            Some(cached) => Some(cached),
            None => match parser_for(path).and_then(|parser| parser.parse(path)) {
                Ok(record) => {
                    // Best effort; a failed write never affects the result.
                    self.cache.put(path, &record);
                    Some(record)
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "failed to parse, excluding from analysis");
                    None
                }
            },
        };

        let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % PROGRESS_INTERVAL == 0 || done == total {
            self.notify(ScanEvent::Progress {
                processed: done,
                total,
            });
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::{DiskCache, NoCache};
    use std::fs;
    use tempfile::TempDir;

    /// Wraps a real cache and counts traffic, to observe hit behavior.
    struct CountingCache {
        inner: DiskCache,
        hits: AtomicUsize,
        puts: AtomicUsize,
    }

    impl ParseCache for CountingCache {
        fn get(&self, path: &std::path::Path) -> Option<SourceRecord> {
            let record = self.inner.get(path);
            if record.is_some() {
                self.hits.fetch_add(1, Ordering::Relaxed);
            }
            record
        }

        fn put(&self, path: &std::path::Path, record: &SourceRecord) {
            self.puts.fetch_add(1, Ordering::Relaxed);
            self.inner.put(path, record);
        }
    }

    fn write_sources(dir: &TempDir, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.path().join(format!("File{}.kt", i));
                fs::write(
                    &path,
                    format!("package com.example\nimport com.example.File{}\n", (i + 1) % count),
                )
                .unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_batch_size_tiers() {
        assert_eq!(batch_size_for(100_000_000), 25);
        assert_eq!(batch_size_for(255_999_999), 25);
        assert_eq!(batch_size_for(256_000_000), 50);
        assert_eq!(batch_size_for(511_999_999), 50);
        assert_eq!(batch_size_for(512_000_000), 100);
        assert_eq!(batch_size_for(8_000_000_000), 100);
    }

    #[test]
    fn test_parse_all_membership() {
        let dir = TempDir::new().unwrap();
        let files = write_sources(&dir, 10);

        let pipeline = ParsePipeline::new(Arc::new(NoCache), None);
        let records = pipeline.parse_all(&files);

        assert_eq!(records.len(), 10);
        let mut paths: Vec<_> = records.iter().map(|r| r.path.clone()).collect();
        paths.sort();
        assert_eq!(paths, files);
    }

    #[test]
    fn test_single_failure_excludes_only_that_file() {
        let dir = TempDir::new().unwrap();
        let mut files = write_sources(&dir, 9);

        // Invalid UTF-8 makes the read fail; the other 9 must survive.
        let broken = dir.path().join("Broken.kt");
        fs::write(&broken, [0xff, 0xfe, 0xfd]).unwrap();
        files.push(broken.clone());

        let pipeline = ParsePipeline::new(Arc::new(NoCache), None);
        let records = pipeline.parse_all(&files);

        assert_eq!(records.len(), 9);
        assert!(records.iter().all(|r| r.path != broken));
    }

    #[test]
    fn test_second_run_hits_cache() {
        let dir = TempDir::new().unwrap();
        let files = write_sources(&dir, 5);

        let cache = Arc::new(CountingCache {
            inner: DiskCache::new(dir.path().join("cache")),
            hits: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
        });

        let pipeline = ParsePipeline::new(cache.clone(), None);
        let first = pipeline.parse_all(&files);
        assert_eq!(cache.hits.load(Ordering::Relaxed), 0);
        assert_eq!(cache.puts.load(Ordering::Relaxed), 5);

        let second = pipeline.parse_all(&files);
        assert_eq!(cache.hits.load(Ordering::Relaxed), 5);

        let sort = |mut v: Vec<SourceRecord>| {
            v.sort_by(|a, b| a.path.cmp(&b.path));
            v
        };
        assert_eq!(sort(first), sort(second));
    }

    #[test]
    fn test_progress_events_reach_observer() {
        let dir = TempDir::new().unwrap();
        let files = write_sources(&dir, 120);

        let (tx, rx) = crossbeam_channel::unbounded();
        let pipeline = ParsePipeline::new(Arc::new(NoCache), Some(tx));
        let records = pipeline.parse_all(&files);
        drop(pipeline);

        assert_eq!(records.len(), 120);
        let events: Vec<ScanEvent> = rx.try_iter().collect();
        let progress: Vec<(usize, usize)> = events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::Progress { processed, total } => Some((*processed, *total)),
                _ => None,
            })
            .collect();
        // One event at the 100-file mark, one at completion.
        assert!(progress.contains(&(100, 120)));
        assert!(progress.contains(&(120, 120)));
        assert!(events
            .iter()
            .any(|e| matches!(e, ScanEvent::BatchSized { .. })));
    }

    #[test]
    fn test_empty_input_yields_empty_result() {
        let pipeline = ParsePipeline::new(Arc::new(NoCache), None);
        assert!(pipeline.parse_all(&[]).is_empty());
    }
}
