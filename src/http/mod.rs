//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → handlers.rs (page render, session bootstrap, search)
//!     → error.rs (SearchError → status + JSON body)
//!     → page.rs (HTML with token and quota)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod page;
pub mod server;

pub use error::SearchError;
pub use handlers::{SearchForm, SEARCH_ACTION, X_RATELIMIT_REMAINING};
pub use page::SessionInfo;
pub use server::{AppState, HttpServer};
