//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::lookup::SearchKind;

/// Root configuration for the lookup gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration for inbound requests.
    pub timeouts: TimeoutConfig,

    /// Session cookie and lifetime settings.
    pub session: SessionConfig,

    /// Per-client request throttle.
    pub throttle: ThrottleConfig,

    /// Rotating anti-scraping token.
    pub token: TokenConfig,

    /// Third-party lookup API.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 16 * 1024,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for handling one inbound request, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,

    /// Mark the cookie `Secure` (only sent over HTTPS).
    pub secure_cookie: bool,

    /// Idle time after which a session is dropped, in seconds.
    pub idle_ttl_secs: u64,

    /// How often the sweeper looks for idle sessions, in seconds.
    pub sweep_interval_secs: u64,

    /// Upper bound on live sessions.
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "lgsid".to_string(),
            secure_cookie: false,
            idle_ttl_secs: 1440,
            sweep_interval_secs: 60,
            max_sessions: 100_000,
        }
    }
}

/// Throttle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Searches allowed per client per minute bucket.
    pub requests_per_minute: u32,

    /// Take the client address from `X-Forwarded-For`.
    /// Only enable behind a reverse proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 10,
            trust_forwarded_for: false,
        }
    }
}

/// Token configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TokenConfig {
    /// Also accept the token of the immediately preceding minute bucket.
    pub accept_previous_bucket: bool,
}

/// Upstream lookup API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// One URL template per search kind; the encoded query is appended verbatim.
    pub endpoints: EndpointConfig,

    /// Time allowed for the whole upstream exchange, in milliseconds.
    pub timeout_ms: u64,

    /// Largest upstream response body accepted, in bytes.
    pub max_body_bytes: usize,

    /// User-Agent pool; one is picked at random per request.
    pub user_agents: Vec<String>,

    /// Honour `HTTP_PROXY` / `HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointConfig::default(),
            timeout_ms: 10_000,
            max_body_bytes: 1024 * 1024,
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".to_string(),
            ],
            use_system_proxy: true,
        }
    }
}

/// Endpoint templates, one per [`SearchKind`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub email: String,
    pub phone: String,
    pub username: String,
    pub domain: String,
}

impl EndpointConfig {
    /// Template for a search kind.
    pub fn template(&self, kind: SearchKind) -> &str {
        match kind {
            SearchKind::Email => &self.email,
            SearchKind::Phone => &self.phone,
            SearchKind::Username => &self.username,
            SearchKind::Domain => &self.domain,
        }
    }

    /// Point every kind at `base` using the upstream's parameter names.
    pub fn with_base(base: &str) -> Self {
        Self {
            email: format!("{}?email=", base),
            phone: format!("{}?phone=", base),
            username: format!("{}?username=", base),
            // The upstream spells this parameter without the 'a'.
            domain: format!("{}?domin=", base),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self::with_base("https://glonova.in/osint.php/")
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable the Prometheus metrics listener.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "lookup_gateway=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [throttle]
            requests_per_minute = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.throttle.requests_per_minute, 5);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.upstream.user_agents.len(), 3);
        assert!(!config.token.accept_previous_bucket);
    }

    #[test]
    fn test_endpoint_templates_per_kind() {
        let endpoints = EndpointConfig::with_base("http://upstream.test/lookup");
        assert_eq!(endpoints.template(SearchKind::Email), "http://upstream.test/lookup?email=");
        assert_eq!(endpoints.template(SearchKind::Domain), "http://upstream.test/lookup?domin=");
    }
}
