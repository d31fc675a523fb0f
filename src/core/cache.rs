//! Durable parse cache
//!
//! One JSON file per entry under the cache directory, named by the MD5
//! fingerprint of `path:mtime:size`. Because the fingerprint embeds the
//! live file's metadata, any edit to the source changes the key and the
//! old entry simply stops being found.
//!
//! The cache is a pure optimization: every failure path degrades to a miss
//! (corrupt entries are deleted on the way) and every write failure is
//! logged and swallowed. The pipeline must behave identically with
//! [`NoCache`] substituted in.

use crate::core::types::SourceRecord;
use crate::error::Error;
use dashmap::DashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

/// Injectable cache capability for the pipeline. [`DiskCache`] is the real
/// store; [`NoCache`] is the no-op used when caching is disabled.
pub trait ParseCache: Send + Sync {
    fn get(&self, path: &Path) -> Option<SourceRecord>;
    fn put(&self, path: &Path, record: &SourceRecord);
}

/// Cache disabled: every read misses, every write is dropped.
pub struct NoCache;

impl ParseCache for NoCache {
    fn get(&self, _path: &Path) -> Option<SourceRecord> {
        None
    }

    fn put(&self, _path: &Path, _record: &SourceRecord) {}
}

/// On-disk cache with a per-fingerprint reader/writer lock table.
///
/// Concurrent reads of one key run in parallel; a write excludes readers
/// and writers of that key; distinct keys never contend. The lock table is
/// owned by the instance, not process-global.
pub struct DiskCache {
    dir: PathBuf,
    locks: DashMap<String, Arc<RwLock<()>>>,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: DashMap::new(),
        }
    }

    /// Hex MD5 of `path:mtime:size`. None when the live file's metadata is
    /// unavailable, which callers treat as "uncacheable".
    fn fingerprint(path: &Path) -> Option<String> {
        let meta = fs::metadata(path).ok()?;
        let mtime = meta
            .modified()
            .ok()?
            .duration_since(UNIX_EPOCH)
            .ok()?
            .as_secs();
        let mut context = md5::Context::new();
        context.consume(format!("{}:{}:{}", path.display(), mtime, meta.len()).as_bytes());
        Some(format!("{:x}", context.finalize()))
    }

    fn lock_for(&self, key: &str) -> Arc<RwLock<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Removes all entries and releases the per-key lock state.
    pub fn clear(&self) {
        if let Ok(entries) = fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                if let Err(e) = fs::remove_file(entry.path()) {
                    warn!(path = ?entry.path(), error = %e, "failed to remove cache entry");
                }
            }
        }
        self.locks.clear();
    }
}

impl ParseCache for DiskCache {
    fn get(&self, path: &Path) -> Option<SourceRecord> {
        let key = Self::fingerprint(path)?;
        let lock = self.lock_for(&key);
        let _guard = lock.read().ok()?;

        let entry = self.entry_path(&key);
        let json = fs::read_to_string(&entry).ok()?;

        match serde_json::from_str(&json) {
            Ok(record) => Some(record),
            Err(e) => {
                // Corrupt entry: delete it so the next run starts clean.
                warn!(path = ?entry, error = %e, "corrupt cache entry, deleting");
                let _ = fs::remove_file(&entry);
                None
            }
        }
    }

    fn put(&self, path: &Path, record: &SourceRecord) {
        let Some(key) = Self::fingerprint(path) else {
            return;
        };
        let lock = self.lock_for(&key);
        let Ok(_guard) = lock.write() else { return };

        if let Err(e) = fs::create_dir_all(&self.dir) {
            warn!(dir = ?self.dir, error = %e, "failed to create cache directory");
            return;
        }

        let json = match serde_json::to_string(record) {
            Ok(j) => j,
            Err(e) => {
                warn!(path = ?path, error = %e, "failed to serialize cache entry");
                return;
            }
        };

        // Write to a temp file then rename so a concurrent reader sees
        // either the old complete entry or the new one, never a partial.
        let entry = self.entry_path(&key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        let result = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, &entry));
        if let Err(e) = result {
            warn!(path = ?entry, error = %Error::Cache(e), "failed to write cache entry");
            let _ = fs::remove_file(&tmp);
        } else {
            debug!(path = ?path, "cached parse result");
        }
    }
}
