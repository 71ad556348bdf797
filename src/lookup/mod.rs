//! Search domain: request types and response redaction.
//!
//! # Data Flow
//! ```text
//! form fields (type, query)
//!     → security::sanitize (validate, clean, encode)
//!     → SearchRequest
//!     → upstream::client (fetch)
//!     → LookupResult (parsed JSON)
//!     → redact.rs (strip attribution keys)
//!     → JSON reply
//! ```

pub mod redact;
pub mod types;

pub use redact::{is_denied_key, redact, DENYLIST};
pub use types::{LookupResult, ParseKindError, SearchKind, SearchRequest};
