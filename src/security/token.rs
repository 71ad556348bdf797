//! Rotating anti-scraping token.
//!
//! One random token per minute bucket, generated lazily on first use in that
//! bucket. A search must echo the token it was handed at page load. This only
//! raises the cost of blind automated posts; it is not authentication.

use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::clock::bucket_of;

/// Bytes of entropy per token (hex-encoded to twice this length).
pub const TOKEN_BYTES: usize = 32;

/// A token bound to one minute bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityToken {
    pub bucket: u64,
    pub value: String,
}

impl SecurityToken {
    fn generate(bucket: u64) -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self {
            bucket,
            value: hex::encode(bytes),
        }
    }
}

/// Token state for one session.
#[derive(Debug)]
pub struct TokenIssuer {
    accept_previous: bool,
    current: Option<SecurityToken>,
    previous: Option<SecurityToken>,
}

impl TokenIssuer {
    /// `accept_previous` additionally honours the prior bucket's token.
    pub fn new(accept_previous: bool) -> Self {
        Self {
            accept_previous,
            current: None,
            previous: None,
        }
    }

    /// Token for the bucket containing `now`, creating it if needed.
    pub fn current_token(&mut self, now: u64) -> &SecurityToken {
        let bucket = bucket_of(now);
        if self.current.as_ref().map(|t| t.bucket) != Some(bucket) {
            let outgoing = self.current.take();
            self.previous = outgoing.filter(|t| t.bucket + 1 == bucket);
            tracing::trace!(bucket, "Rotating security token");
        }
        self.current.get_or_insert_with(|| SecurityToken::generate(bucket))
    }

    /// Exact match against the live token(s) for `now`.
    pub fn verify(&mut self, candidate: &str, now: u64) -> bool {
        if candidate.is_empty() {
            return false;
        }
        if constant_time_eq(self.current_token(now).value.as_bytes(), candidate.as_bytes()) {
            return true;
        }
        self.accept_previous
            && self
                .previous
                .as_ref()
                .is_some_and(|t| constant_time_eq(t.value.as_bytes(), candidate.as_bytes()))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
