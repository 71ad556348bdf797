//! Client for the lookup gateway.
//!
//! ```no_run
//! # async fn demo() -> Result<(), lookup_sdk::SdkError> {
//! let mut client = lookup_sdk::GatewayClient::new("http://localhost:8080");
//! client.open_session().await?;
//! let result = client.search("email", "a@b.com").await?;
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```

use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Form `action` the gateway expects for searches.
pub const SEARCH_ACTION: &str = "osint_search";

/// Token and quota handed out at page load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionInfo {
    pub token: String,
    pub remaining: u32,
    pub limit: u32,
    pub expires_in: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The gateway answered with an error status and `{"error": ...}` body.
    #[error("gateway returned {status}: {message}")]
    Gateway { status: StatusCode, message: String },
    #[error("no session; call open_session first")]
    NoSession,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct GatewayClient {
    client: Client,
    base_url: String,
    cookie: Option<String>,
    session: Option<SessionInfo>,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Use a preconfigured `reqwest::Client` (timeouts, proxy settings).
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie: None,
            session: None,
        }
    }

    /// Fetch a token and quota, keeping the session cookie for later calls.
    pub async fn open_session(&mut self) -> Result<SessionInfo, SdkError> {
        let mut request = self.client.get(format!("{}/api/session", self.base_url));
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }
        let response = request.send().await?;

        if let Some(cookie) = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
        {
            self.cookie = Some(cookie.to_string());
        }

        let response = check_status(response).await?;
        let info: SessionInfo = response.json().await?;
        self.session = Some(info.clone());
        Ok(info)
    }

    /// Session data from the last `open_session`.
    pub fn session(&self) -> Option<&SessionInfo> {
        self.session.as_ref()
    }

    /// Raw `name=value` session cookie, if one was issued.
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Run one search with the current session's token.
    pub async fn search(&self, kind: &str, query: &str) -> Result<Value, SdkError> {
        let token = self.session.as_ref().ok_or(SdkError::NoSession)?.token.as_str();
        self.search_with_token(kind, query, token).await
    }

    /// Run one search with an explicit token.
    pub async fn search_with_token(
        &self,
        kind: &str,
        query: &str,
        token: &str,
    ) -> Result<Value, SdkError> {
        let mut request = self.client.post(format!("{}/", self.base_url)).form(&[
            ("action", SEARCH_ACTION),
            ("type", kind),
            ("query", query),
            ("token", token),
        ]);
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }
        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<Value, SdkError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SdkError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await?;
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(SdkError::Gateway { status, message })
}
