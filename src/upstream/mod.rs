//! Outbound lookup API client.
//!
//! # Data Flow
//! ```text
//! SearchRequest (kind, encoded query)
//!     → endpoint template for kind + encoded query
//!     → GET with random User-Agent, bounded by timeout
//!     → raw body (String) or FetchError
//! ```
//!
//! # Design Decisions
//! - Exactly one attempt per search; no retries, no caching
//! - Timeouts are distinct from transport errors in logs and metrics
//! - Non-2xx upstream status counts as a failure

pub mod client;

pub use client::{FetchError, UpstreamClient};
