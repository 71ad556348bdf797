//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, timeouts, request ID)
//! - Own the session table and upstream client shared by handlers
//! - Run the session sweeper alongside the listener
//! - Stop gracefully on the shutdown broadcast

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::clock::{Clock, SystemClock};
use crate::config::GatewayConfig;
use crate::http::handlers::{health_handler, page_handler, search_handler, session_handler};
use crate::session::SessionStore;
use crate::upstream::{FetchError, UpstreamClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub sessions: Arc<SessionStore>,
    pub upstream: UpstreamClient,
    pub clock: Arc<dyn Clock>,
}

/// HTTP server for the lookup gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, FetchError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a server that reads time from `clock`.
    pub fn with_clock(config: GatewayConfig, clock: Arc<dyn Clock>) -> Result<Self, FetchError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let sessions = Arc::new(SessionStore::new(
            config.session.clone(),
            config.throttle.requests_per_minute,
            config.token.accept_previous_bucket,
        ));

        let state = AppState {
            config: Arc::new(config),
            sessions,
            upstream,
            clock,
        };
        let router = Self::build_router(&state);

        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: &AppState) -> Router {
        let config = &state.config;
        Router::new()
            .route("/", get(page_handler).post(search_handler))
            .route("/api/session", get(session_handler))
            .route("/health", get(health_handler))
            .with_state(state.clone())
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            requests_per_minute = self.state.config.throttle.requests_per_minute,
            "HTTP server starting"
        );

        let sweeper = tokio::spawn(Arc::clone(&self.state.sessions).run_sweeper(
            Arc::clone(&self.state.clock),
            shutdown.resubscribe(),
        ));

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        let _ = sweeper.await;
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Shared state, for inspection.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use axum::body::{to_bytes, Body};
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn server(config: GatewayConfig) -> HttpServer {
        HttpServer::with_clock(config, Arc::new(ManualClock::new(1_700_000_040))).unwrap()
    }

    fn test_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.upstream.use_system_proxy = false;
        config
    }

    fn app(server: &HttpServer) -> Router {
        server
            .router
            .clone()
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))))
    }

    fn router() -> Router {
        app(&server(test_config()))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn search_post(cookie: Option<&str>, body: String) -> Request<Body> {
        let mut request = Request::post("/")
            .header("content-type", "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header("cookie", cookie);
        }
        request.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_search_without_form_is_bad_request() {
        let response = router()
            .oneshot(Request::post("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!response.headers().contains_key("set-cookie"));
        assert_eq!(json_body(response).await["error"], "Missing parameters");
    }

    #[tokio::test]
    async fn test_cookieless_searches_do_not_create_sessions() {
        let server = server(test_config());
        for _ in 0..5 {
            let response = app(&server)
                .oneshot(search_post(
                    None,
                    "action=osint_search&type=email&query=a%40b.com&token=junk".into(),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            assert!(!response.headers().contains_key("set-cookie"));
        }
        assert!(server.state().sessions.is_empty());
    }

    #[tokio::test]
    async fn test_junk_posts_cannot_evict_real_session() {
        let mut config = test_config();
        config.session.max_sessions = 2;
        let server = server(config);

        let response = app(&server)
            .oneshot(Request::get("/api/session").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let cookie = response.headers()["set-cookie"]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();
        let token = json_body(response).await["token"].as_str().unwrap().to_string();

        for _ in 0..2 {
            let response = app(&server)
                .oneshot(search_post(
                    None,
                    "action=osint_search&type=email&query=x&token=junk".into(),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
        assert_eq!(server.state().sessions.len(), 1);

        // Unsupported type is only reached once the token and throttle pass,
        // and it never calls upstream.
        let response = app(&server)
            .oneshot(search_post(
                Some(&cookie),
                format!("action=osint_search&type=sql&query=x&token={}", token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "9");
        assert_eq!(json_body(response).await["error"], "Invalid search type");
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let body = format!("action=osint_search&query={}", "a".repeat(32 * 1024));
        let response = router()
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .header("content-length", body.len())
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = router()
            .oneshot(Request::get("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
