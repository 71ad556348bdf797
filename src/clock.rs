//! Time source for bucket arithmetic.
//!
//! Throttle accounting and token rotation both key off a one-minute bucket
//! (`unix_secs / 60`). Handlers read the time through [`Clock`] so tests can
//! step across bucket boundaries without sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Length of a throttle/token bucket in seconds.
pub const BUCKET_SECS: u64 = 60;

/// Bucket index for a unix timestamp.
pub fn bucket_of(now: u64) -> u64 {
    now / BUCKET_SECS
}

/// Seconds left until the bucket containing `now` rolls over.
pub fn secs_until_rollover(now: u64) -> u64 {
    BUCKET_SECS - now % BUCKET_SECS
}

/// Source of the current unix time in seconds.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
