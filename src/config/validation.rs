//! Configuration validation.
//!
//! Serde handles syntax; this pass checks value ranges and cross-field
//! constraints. It returns every problem found, not just the first.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::lookup::SearchKind;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let cookie = &config.session.cookie_name;
    if cookie.is_empty()
        || !cookie
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        errors.push(ValidationError::new(
            "session.cookie_name",
            "must be non-empty and contain only [A-Za-z0-9_-]",
        ));
    }
    if config.session.idle_ttl_secs < 60 {
        errors.push(ValidationError::new("session.idle_ttl_secs", "must be at least 60"));
    }
    if config.session.sweep_interval_secs == 0 {
        errors.push(ValidationError::new("session.sweep_interval_secs", "must be greater than 0"));
    }
    if config.session.max_sessions == 0 {
        errors.push(ValidationError::new("session.max_sessions", "must be greater than 0"));
    }

    if config.throttle.requests_per_minute == 0 {
        errors.push(ValidationError::new("throttle.requests_per_minute", "must be greater than 0"));
    }

    if config.upstream.timeout_ms == 0 {
        errors.push(ValidationError::new("upstream.timeout_ms", "must be greater than 0"));
    }
    if config.upstream.max_body_bytes == 0 {
        errors.push(ValidationError::new("upstream.max_body_bytes", "must be greater than 0"));
    }
    if config.upstream.user_agents.is_empty() {
        errors.push(ValidationError::new("upstream.user_agents", "must not be empty"));
    }
    for (i, agent) in config.upstream.user_agents.iter().enumerate() {
        if HeaderValue::from_str(agent).is_err() {
            errors.push(ValidationError::new(
                format!("upstream.user_agents[{}]", i),
                "is not a valid header value",
            ));
        }
    }
    for kind in SearchKind::ALL {
        let template = config.upstream.endpoints.template(kind);
        let field = format!("upstream.endpoints.{}", kind.as_str());
        match url::Url::parse(template) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::new(
                field,
                format!("unsupported scheme '{}'", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
