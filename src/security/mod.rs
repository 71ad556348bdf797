//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming search:
//!     → client_ip.rs (derive throttle key)
//!     → token.rs (verify rotating token)
//!     → rate_limit.rs (per-client minute buckets)
//!     → sanitize.rs (validate, clean, encode query)
//!     → Pass to upstream client
//! ```
//!
//! # Design Decisions
//! - Token is checked before the throttle, so bad-token floods cost nothing
//! - Fail closed: reject on any check failure
//! - No trust in client input

pub mod client_ip;
pub mod rate_limit;
pub mod sanitize;
pub mod token;

pub use rate_limit::{ThrottleDecision, ThrottleStore};
pub use sanitize::Rejection;
pub use token::{SecurityToken, TokenIssuer};
