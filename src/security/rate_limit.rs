//! Per-client request throttle with minute buckets.
//!
//! Counts live in a map of client → (bucket → count). Only the current and
//! the immediately preceding bucket are kept; anything older is evicted on the
//! next touch of that client. The limit is enforced against the current
//! bucket alone, so this is an approximate sliding window, not a precise one.
//!
//! The store is plain data with `&mut self` methods. Callers that share it
//! (one per session) wrap it in a mutex so check-and-increment is atomic.

use std::collections::{BTreeMap, HashMap};

use crate::clock::bucket_of;

/// Outcome of a throttle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// Counted; `remaining` more searches fit in this bucket.
    Allowed { remaining: u32 },
    /// Over the limit; nothing was counted.
    Limited,
}

impl ThrottleDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, ThrottleDecision::Allowed { .. })
    }
}

/// Request counters for one session.
#[derive(Debug)]
pub struct ThrottleStore {
    limit: u32,
    windows: HashMap<String, BTreeMap<u64, u32>>,
}

impl ThrottleStore {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            windows: HashMap::new(),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count one request for `client_id` unless it is already at the limit.
    pub fn check_and_increment(&mut self, client_id: &str, now: u64) -> ThrottleDecision {
        let bucket = bucket_of(now);
        let window = self.windows.entry(client_id.to_string()).or_default();
        evict_stale(window, bucket);

        let count = window.entry(bucket).or_insert(0);
        if *count >= self.limit {
            return ThrottleDecision::Limited;
        }
        *count += 1;
        ThrottleDecision::Allowed {
            remaining: self.limit - *count,
        }
    }

    /// Searches left for `client_id` in the current bucket. Does not count.
    pub fn remaining(&mut self, client_id: &str, now: u64) -> u32 {
        let bucket = bucket_of(now);
        let Some(window) = self.windows.get_mut(client_id) else {
            return self.limit;
        };
        evict_stale(window, bucket);
        let used = window.get(&bucket).copied().unwrap_or(0);
        if window.is_empty() {
            self.windows.remove(client_id);
        }
        self.limit.saturating_sub(used)
    }

    /// Number of clients with live counters.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Drop buckets older than `bucket - 1`.
fn evict_stale(window: &mut BTreeMap<u64, u32>, bucket: u64) {
    let oldest_kept = bucket.saturating_sub(1);
    *window = window.split_off(&oldest_kept);
}
