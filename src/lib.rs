//! Lookup gateway library.
//!
//! A small web front-end that relays one search (email, phone, username or
//! domain) to a third-party lookup API, strips attribution fields from the
//! JSON it returns, and guards the path with a per-client throttle and a
//! rotating anti-scraping token.

pub mod clock;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod lookup;
pub mod observability;
pub mod security;
pub mod session;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
