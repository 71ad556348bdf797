//! Server-side sessions.
//!
//! # Data Flow
//! ```text
//! Cookie header
//!     → cookie.rs (extract session id)
//!     → store.rs (look up or create Session)
//!     → Session { ThrottleStore, TokenIssuer } behind one mutex
//!     → Set-Cookie on the response when the session is new
//! ```
//!
//! # Design Decisions
//! - Session ids are always minted server-side; unknown ids are never adopted
//! - Throttle and token state share one lock per session
//! - Idle sessions are swept by a background task

pub mod cookie;
pub mod store;

pub use store::{Session, SessionState, SessionStore};
