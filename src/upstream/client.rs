//! HTTP client for the third-party lookup API.

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use reqwest::header::USER_AGENT;
use thiserror::Error;
use tokio::time;

use crate::config::{EndpointConfig, UpstreamConfig};
use crate::lookup::SearchKind;
use crate::observability::metrics;

/// Fallback when the configured pool is empty.
const DEFAULT_USER_AGENT: &str = concat!("lookup-gateway/", env!("CARGO_PKG_VERSION"));

/// Failure talking to the upstream API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),
    #[error("upstream transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("upstream body exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("failed to build upstream client: {0}")]
    Build(#[source] reqwest::Error),
}

impl FetchError {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "timeout",
            FetchError::Transport(_) => "transport",
            FetchError::Status(_) => "status",
            FetchError::TooLarge { .. } => "too_large",
            FetchError::Build(_) => "build",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout(_))
    }
}

/// Issues one GET per search against the kind's endpoint.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    endpoints: EndpointConfig,
    user_agents: Vec<String>,
    timeout: Duration,
    max_body_bytes: usize,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(FetchError::Build)?;

        Ok(Self {
            client,
            endpoints: config.endpoints.clone(),
            user_agents: config.user_agents.clone(),
            timeout,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Full URL for a search: template followed by the encoded query.
    pub fn endpoint_url(&self, kind: SearchKind, encoded_query: &str) -> String {
        format!("{}{}", self.endpoints.template(kind), encoded_query)
    }

    /// One User-Agent from the pool, uniformly at random.
    pub fn pick_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Fetch the raw response body for a search.
    pub async fn fetch(&self, kind: SearchKind, encoded_query: &str) -> Result<String, FetchError> {
        let url = self.endpoint_url(kind, encoded_query);
        let user_agent = self.pick_user_agent();
        let start = Instant::now();

        tracing::debug!(kind = %kind, url = %url, "Calling upstream");

        // Hard deadline for the whole exchange, body included.
        let result = match time::timeout(self.timeout, self.exchange(&url, user_agent)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        };
        metrics::record_upstream(kind.as_str(), start);

        match &result {
            Ok(body) => tracing::debug!(
                kind = %kind,
                bytes = body.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Upstream responded"
            ),
            Err(FetchError::Timeout(limit)) => tracing::warn!(
                kind = %kind,
                timeout_ms = limit.as_millis() as u64,
                "Upstream request timed out"
            ),
            Err(FetchError::Status(status)) => tracing::warn!(
                kind = %kind,
                status = *status,
                "Upstream returned non-success status"
            ),
            Err(FetchError::TooLarge { limit }) => tracing::warn!(
                kind = %kind,
                limit_bytes = *limit,
                "Upstream body too large"
            ),
            Err(e) => tracing::error!(kind = %kind, error = %e, "Upstream request failed"),
        }
        if let Err(e) = &result {
            metrics::record_upstream_failure(e.reason());
        }
        result
    }

    async fn exchange(&self, url: &str, user_agent: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        self.read_body(response).await
    }

    /// Read the body, giving up as soon as it passes `max_body_bytes`.
    async fn read_body(&self, mut response: reqwest::Response) -> Result<String, FetchError> {
        let limit = self.max_body_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(FetchError::TooLarge { limit });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::sanitize;
    use std::collections::HashSet;

    fn client() -> UpstreamClient {
        let config = UpstreamConfig {
            endpoints: EndpointConfig::with_base("http://upstream.test/osint"),
            ..UpstreamConfig::default()
        };
        UpstreamClient::new(&config).unwrap()
    }

    #[test]
    fn test_email_targets_email_endpoint() {
        let req = sanitize::validate("email", "a@b.com").unwrap();
        assert_eq!(
            client().endpoint_url(req.kind, &req.encoded_query),
            "http://upstream.test/osint?email=a%40b.com"
        );
    }

    #[test]
    fn test_each_kind_has_its_own_endpoint() {
        let client = client();
        let urls: HashSet<String> = SearchKind::ALL
            .into_iter()
            .map(|kind| client.endpoint_url(kind, "q"))
            .collect();
        assert_eq!(urls.len(), 4);
        assert_eq!(
            client.endpoint_url(SearchKind::Domain, "example.com"),
            "http://upstream.test/osint?domin=example.com"
        );
    }

    #[test]
    fn test_user_agent_comes_from_pool() {
        let client = client();
        let defaults = UpstreamConfig::default();
        let pool: HashSet<&str> = defaults.user_agents.iter().map(String::as_str).collect();
        for _ in 0..50 {
            assert!(pool.contains(client.pick_user_agent()));
        }
    }

    #[test]
    fn test_empty_pool_falls_back() {
        let config = UpstreamConfig {
            user_agents: Vec::new(),
            ..UpstreamConfig::default()
        };
        let client = UpstreamClient::new(&config).unwrap();
        assert!(client.pick_user_agent().starts_with("lookup-gateway/"));
    }

    #[test]
    fn test_failure_reasons() {
        assert_eq!(FetchError::Timeout(Duration::from_secs(1)).reason(), "timeout");
        assert!(FetchError::Timeout(Duration::from_secs(1)).is_timeout());
        assert_eq!(FetchError::Status(500).reason(), "status");
        assert_eq!(FetchError::TooLarge { limit: 1 }.reason(), "too_large");
    }
}
