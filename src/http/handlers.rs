//! Request handlers.
//!
//! A search moves through fixed gates; the first one that fails answers the
//! request:
//!
//! ```text
//! RECEIVED → TOKEN_VERIFIED → THROTTLE_CHECKED → VALIDATED
//!          → UPSTREAM_CALLED → REDACTED → RESPONDED
//! ```
//!
//! The token is verified before the throttle counts anything, so a stream of
//! bad-token posts cannot burn a client's quota. Searches never mint a
//! session: without a live one there is no token to match, so the request is
//! answered as an invalid token and the session table is left alone.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::FormRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::header::{CACHE_CONTROL, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::clock::secs_until_rollover;
use crate::http::error::SearchError;
use crate::http::page::{self, SessionInfo};
use crate::http::server::AppState;
use crate::lookup::{redact, LookupResult};
use crate::observability::metrics;
use crate::security::{client_ip, sanitize, ThrottleDecision};
use crate::session::{cookie, Session};

/// Form `action` value that selects a search.
pub const SEARCH_ACTION: &str = "osint_search";

/// Response header mirroring the caller's remaining quota.
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Fields of a search post. All optional so absence maps to a JSON error.
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    pub action: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub query: Option<String>,
    pub token: Option<String>,
}

/// `GET /`: render the page with a fresh token and quota.
pub async fn page_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let (info, set_cookie) = bootstrap(&state, peer, &headers);
    let mut response = Html(page::render(&info)).into_response();
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    attach_cookie(&mut response, set_cookie);
    response
}

/// `GET /api/session`: the page-load data as JSON.
pub async fn session_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let (info, set_cookie) = bootstrap(&state, peer, &headers);
    let mut response = Json(info).into_response();
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    attach_cookie(&mut response, set_cookie);
    response
}

/// `GET /health`.
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// `POST /`: run one search.
pub async fn search_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    form: Result<Form<SearchForm>, FormRejection>,
) -> Response {
    let start = Instant::now();
    let now = state.clock.now_unix();
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let client = client_ip::client_id(peer, &headers, state.config.throttle.trust_forwarded_for);
    let session = cookie::session_id(&headers, &state.config.session.cookie_name)
        .and_then(|id| state.sessions.get(id, now));

    let (result, remaining) = match admit(session.as_deref(), &client, form, now) {
        Ok((form, remaining)) => (run_lookup(&state, &form).await, Some(remaining)),
        Err(SearchError::RateLimited) => (Err(SearchError::RateLimited), Some(0)),
        Err(e) => (Err(e), None),
    };

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.outcome(),
    };
    metrics::record_request(outcome);

    let mut response = match result {
        Ok(tree) => {
            tracing::info!(
                request_id = %request_id,
                client = %client,
                remaining = ?remaining,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Search completed"
            );
            Json(tree).into_response()
        }
        Err(e) => {
            tracing::info!(
                request_id = %request_id,
                client = %client,
                status = e.status_code().as_u16(),
                error = %e,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Search rejected"
            );
            e.into_response()
        }
    };

    if let Some(remaining) = remaining {
        response
            .headers_mut()
            .insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
    }
    response
}

/// Gates that run under the session lock: action, token, throttle.
fn admit(
    session: Option<&Session>,
    client: &str,
    form: Result<Form<SearchForm>, FormRejection>,
    now: u64,
) -> Result<(SearchForm, u32), SearchError> {
    let Form(form) = form.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Unreadable search form");
        SearchError::MissingParameter
    })?;

    if form.action.as_deref() != Some(SEARCH_ACTION) {
        return Err(SearchError::UnsupportedAction);
    }

    let Some(session) = session else {
        tracing::debug!(client = %client, "Search without a live session");
        return Err(SearchError::InvalidToken);
    };
    let mut state = session.lock();
    if !state.tokens.verify(form.token.as_deref().unwrap_or_default(), now) {
        return Err(SearchError::InvalidToken);
    }
    match state.throttle.check_and_increment(client, now) {
        ThrottleDecision::Allowed { remaining } => Ok((form, remaining)),
        ThrottleDecision::Limited => {
            tracing::warn!(client = %client, "Rate limit exceeded");
            Err(SearchError::RateLimited)
        }
    }
}

/// Gates after admission: validate, call upstream, redact.
async fn run_lookup(state: &AppState, form: &SearchForm) -> Result<LookupResult, SearchError> {
    let request = sanitize::validate(
        form.kind.as_deref().unwrap_or_default(),
        form.query.as_deref().unwrap_or_default(),
    )?;
    tracing::debug!(kind = %request.kind, query = %request.cleaned_query, "Search validated");

    let body = state
        .upstream
        .fetch(request.kind, &request.encoded_query)
        .await?;

    let mut tree = parse_body(&body)?;
    let removed = redact(&mut tree);
    metrics::record_redacted(removed);
    tracing::debug!(kind = %request.kind, removed, "Response redacted");
    Ok(tree)
}

/// Upstream body → JSON object or array.
fn parse_body(body: &str) -> Result<LookupResult, SearchError> {
    if body.trim().is_empty() {
        tracing::warn!("Upstream returned an empty body");
        metrics::record_upstream_failure("empty_body");
        return Err(SearchError::UpstreamBadResponse);
    }
    match serde_json::from_str::<Value>(body) {
        Ok(tree @ (Value::Object(_) | Value::Array(_))) => Ok(tree),
        Ok(_) => {
            tracing::warn!("Upstream returned a JSON scalar");
            metrics::record_upstream_failure("scalar_body");
            Err(SearchError::UpstreamBadResponse)
        }
        Err(e) => {
            tracing::warn!(error = %e, bytes = body.len(), "Upstream body is not JSON");
            metrics::record_upstream_failure("invalid_json");
            Err(SearchError::UpstreamBadResponse)
        }
    }
}

/// Resolve the caller's session and read its token and quota.
fn bootstrap(
    state: &AppState,
    peer: SocketAddr,
    headers: &HeaderMap,
) -> (SessionInfo, Option<HeaderValue>) {
    let now = state.clock.now_unix();
    let client = client_ip::client_id(peer, headers, state.config.throttle.trust_forwarded_for);
    let (session, created) = state
        .sessions
        .resolve(cookie::session_id(headers, &state.config.session.cookie_name), now);

    let info = {
        let mut guard = session.lock();
        SessionInfo {
            token: guard.tokens.current_token(now).value.clone(),
            remaining: guard.throttle.remaining(&client, now),
            limit: guard.throttle.limit(),
            expires_in: secs_until_rollover(now),
        }
    };

    let set_cookie = created.then(|| set_cookie_for(state, &session)).flatten();
    (info, set_cookie)
}

fn set_cookie_for(state: &AppState, session: &Arc<Session>) -> Option<HeaderValue> {
    match cookie::set_cookie(session.id(), &state.config.session) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build session cookie");
            None
        }
    }
}

fn attach_cookie(response: &mut Response, set_cookie: Option<HeaderValue>) {
    if let Some(value) = set_cookie {
        response.headers_mut().append(SET_COOKIE, value);
    }
}
