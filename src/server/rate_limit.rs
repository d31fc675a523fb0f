//! Sliding-window rate limiter for the server admission path
//!
//! Independent per-minute and per-hour windows, keyed by
//! `client:time-bucket`. Not used by the analysis pipeline; the server
//! front-end consults it before admitting a request.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const MINUTE_MS: u64 = 60_000;
const HOUR_MS: u64 = 3_600_000;
/// Expired buckets are swept every this many admission checks.
const CLEANUP_INTERVAL: usize = 1024;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

struct TimedCounter {
    count: AtomicU32,
    started_ms: u64,
}

impl TimedCounter {
    fn new(now: u64) -> Self {
        Self {
            count: AtomicU32::new(0),
            started_ms: now,
        }
    }
}

pub struct RateLimiter {
    per_minute: u32,
    per_hour: u32,
    minute_counters: DashMap<String, TimedCounter>,
    hour_counters: DashMap<String, TimedCounter>,
    checks: AtomicUsize,
}

impl RateLimiter {
    pub fn new(per_minute: u32, per_hour: u32) -> Self {
        Self {
            per_minute,
            per_hour,
            minute_counters: DashMap::new(),
            hour_counters: DashMap::new(),
            checks: AtomicUsize::new(0),
        }
    }

    /// Returns true when the client is under both quotas. Each call counts
    /// against the current minute bucket; the hour bucket is only charged
    /// once the minute check passes.
    pub fn check_limit(&self, client_id: &str) -> bool {
        let now = now_ms();

        let minute_key = format!("{}:{}", client_id, now / MINUTE_MS);
        let minute_allowed = {
            let counter = self
                .minute_counters
                .entry(minute_key)
                .or_insert_with(|| TimedCounter::new(now));
            counter.count.fetch_add(1, Ordering::SeqCst) + 1 <= self.per_minute
        };
        if !minute_allowed {
            return false;
        }

        let hour_key = format!("{}:{}", client_id, now / HOUR_MS);
        let hour_allowed = {
            let counter = self
                .hour_counters
                .entry(hour_key)
                .or_insert_with(|| TimedCounter::new(now));
            counter.count.fetch_add(1, Ordering::SeqCst) + 1 <= self.per_hour
        };

        if self.checks.fetch_add(1, Ordering::Relaxed) % CLEANUP_INTERVAL == CLEANUP_INTERVAL - 1 {
            self.cleanup(now);
        }

        hour_allowed
    }

    /// Remaining requests for the client in the current minute window.
    pub fn remaining_minute(&self, client_id: &str) -> u32 {
        let key = format!("{}:{}", client_id, now_ms() / MINUTE_MS);
        match self.minute_counters.get(&key) {
            Some(counter) => self
                .per_minute
                .saturating_sub(counter.count.load(Ordering::SeqCst)),
            None => self.per_minute,
        }
    }

    /// Remaining requests for the client in the current hour window.
    pub fn remaining_hour(&self, client_id: &str) -> u32 {
        let key = format!("{}:{}", client_id, now_ms() / HOUR_MS);
        match self.hour_counters.get(&key) {
            Some(counter) => self
                .per_hour
                .saturating_sub(counter.count.load(Ordering::SeqCst)),
            None => self.per_hour,
        }
    }

    /// Seconds until the minute window rolls over, or 0 when the client is
    /// not currently over the minute limit.
    pub fn seconds_until_reset(&self, client_id: &str) -> u64 {
        let now = now_ms();
        let key = format!("{}:{}", client_id, now / MINUTE_MS);
        let over = self
            .minute_counters
            .get(&key)
            .is_some_and(|counter| counter.count.load(Ordering::SeqCst) > self.per_minute);
        if over {
            60 - ((now / 1000) % 60)
        } else {
            0
        }
    }

    /// Drops buckets older than their window. A concurrent `check_limit`
    /// can insert a bucket stamped after `now` (captured at sweep entry),
    /// so the age computation must saturate instead of underflowing.
    fn cleanup(&self, now: u64) {
        self.minute_counters
            .retain(|_, counter| now.saturating_sub(counter.started_ms) <= MINUTE_MS);
        self.hour_counters
            .retain(|_, counter| now.saturating_sub(counter.started_ms) <= HOUR_MS);
    }

    /// Clears all counters. Used by tests and server resets.
    pub fn clear(&self) {
        self.minute_counters.clear();
        self.hour_counters.clear();
    }
}
