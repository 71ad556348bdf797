//! Search failures and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::security::Rejection;
use crate::upstream::FetchError;

/// Every way a search request can be turned away.
///
/// All of these are answered with `{"error": "<message>"}`; none is fatal to
/// the server.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Rate limit exceeded. Try again later.")]
    RateLimited,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Missing parameters")]
    MissingParameter,
    #[error("Invalid search type")]
    InvalidType,
    #[error("Unsupported action")]
    UnsupportedAction,
    #[error("{}", upstream_message(.0))]
    UpstreamUnavailable(#[source] FetchError),
    #[error("Invalid response from API")]
    UpstreamBadResponse,
}

fn upstream_message(e: &FetchError) -> &'static str {
    if e.is_timeout() {
        "API request timed out"
    } else {
        "API request failed"
    }
}

impl SearchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SearchError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            SearchError::InvalidToken => StatusCode::FORBIDDEN,
            SearchError::MissingParameter
            | SearchError::InvalidType
            | SearchError::UnsupportedAction => StatusCode::BAD_REQUEST,
            SearchError::UpstreamUnavailable(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            SearchError::UpstreamUnavailable(_) | SearchError::UpstreamBadResponse => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Metrics label.
    pub fn outcome(&self) -> &'static str {
        match self {
            SearchError::RateLimited => "rate_limited",
            SearchError::InvalidToken => "invalid_token",
            SearchError::MissingParameter => "missing_parameter",
            SearchError::InvalidType => "invalid_type",
            SearchError::UnsupportedAction => "unsupported_action",
            SearchError::UpstreamUnavailable(_) => "upstream_unavailable",
            SearchError::UpstreamBadResponse => "upstream_bad_response",
        }
    }
}

impl From<Rejection> for SearchError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Empty => SearchError::MissingParameter,
            Rejection::InvalidType(_) => SearchError::InvalidType,
        }
    }
}

impl From<FetchError> for SearchError {
    fn from(e: FetchError) -> Self {
        match e {
            // The upstream answered; the answer is unusable.
            FetchError::TooLarge { .. } => SearchError::UpstreamBadResponse,
            e => SearchError::UpstreamUnavailable(e),
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}
