//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, CORS)
//! - Serve on a bound listener until shutdown
//! - Apply credential reloads while serving

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::auth::{CredentialStore, InMemoryCredentialStore, SwappableCredentialStore};
use crate::config::validation::validate_config;
use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::http::response::ApiError;
use crate::observability::metrics::track_metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
}

/// HTTP server for the login service.
pub struct ApiServer {
    router: Router,
    store: Arc<SwappableCredentialStore>,
}

impl ApiServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let store = Arc::new(SwappableCredentialStore::new(
            InMemoryCredentialStore::from_config(&config.credentials),
        ));
        let router = build_router(&config, store.clone());

        Self { router, store }
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Each config received on `config_updates` replaces the credential
    /// accounts; the rest of the config is fixed for the server's lifetime.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let store = self.store.clone();
        let reloader = tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                if let Err(errors) = validate_config(&new_config) {
                    tracing::error!(
                        errors = ?errors,
                        "Ignoring invalid config update, keeping current accounts"
                    );
                    continue;
                }
                let next = InMemoryCredentialStore::from_config(&new_config.credentials);
                tracing::info!(accounts = next.len(), "Credential accounts reloaded");
                store.replace(next);
            }
        });

        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        result
    }

    /// Handle to the live credential store.
    pub fn store(&self) -> Arc<SwappableCredentialStore> {
        self.store.clone()
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(config: &ServiceConfig, store: Arc<dyn CredentialStore>) -> Router {
    let state = AppState { store };

    let api = Router::new()
        .route("/api/login", post(handlers::login))
        .route("/api/register", post(handlers::register))
        .route("/health", get(handlers::health))
        .route_layer(middleware::from_fn(track_metrics))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(config.security.max_body_size))
        .with_state(state);

    let api = if config.security.cors_enabled {
        api.layer(CorsLayer::permissive())
    } else {
        api
    };

    api.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(middleware::from_fn_with_state(
                Duration::from_secs(config.timeouts.request_secs),
                request_timeout,
            )),
    )
}

/// Fail with a JSON 408 when the inner service, body read included, takes
/// longer than `limit`.
pub async fn request_timeout(
    State(limit): State<Duration>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(limit = ?limit, "Request timed out");
            ApiError::RequestTimeout.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::http::request::X_REQUEST_ID;
    use crate::http::response::MessageBody;

    fn app() -> Router {
        let config = ServiceConfig::default();
        let store = Arc::new(InMemoryCredentialStore::from_config(&config.credentials));
        build_router(&config, store)
    }

    fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn login_with_configured_pair() {
        let (status, body) = send(
            app(),
            post_json("/api/login", r#"{"username":"admin","password":"senha123"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Login bem-sucedido!" }));
    }

    #[tokio::test]
    async fn login_mismatches_are_unauthorized() {
        for body in [
            r#"{"username":"bob","password":"x"}"#,
            r#"{"username":"admin","password":"x"}"#,
            r#"{"username":"admin"}"#,
            r#"{"password":"senha123"}"#,
            r#"{}"#,
            r#"{"username":"admin","password":null}"#,
            r#"{"username":["admin"],"password":"senha123"}"#,
        ] {
            let (status, json) = send(app(), post_json("/api/login", body)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "body: {body}");
            assert_eq!(json, json!({ "message": "Usuário ou senha incorretos." }));
        }
    }

    #[tokio::test]
    async fn register_reserved_username() {
        let (status, body) = send(
            app(),
            post_json("/api/register", r#"{"username":"admin","password":"anything"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Username already exists." }));
    }

    #[tokio::test]
    async fn register_accepts_other_usernames_regardless_of_password() {
        for body in [
            r#"{"username":"newuser","password":"anything"}"#,
            r#"{"username":"newuser","password":""}"#,
            r#"{"username":"newuser"}"#,
            r#"{}"#,
            r#"{"username":42}"#,
        ] {
            let (status, json) = send(app(), post_json("/api/register", body)).await;
            assert_eq!(status, StatusCode::CREATED, "body: {body}");
            assert_eq!(json, json!({ "message": "Usuário registrado com sucesso!" }));
        }
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (status, body) = send(app(), post_json("/api/login", "{\"username\":")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Corpo da requisição inválido." }));
    }

    #[tokio::test]
    async fn non_object_json_is_bad_request() {
        let (status, _) = send(app(), post_json("/api/register", "[\"admin\"]")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_unsupported() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/login")
            .body(Body::from(r#"{"username":"admin","password":"senha123"}"#))
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut config = ServiceConfig::default();
        config.security.max_body_size = 16;
        let store = Arc::new(InMemoryCredentialStore::from_config(&config.credentials));
        let app = build_router(&config, store);

        let (status, body) = send(
            app,
            post_json("/api/login", r#"{"username":"admin","password":"senha123"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, json!({ "message": "Corpo da requisição muito grande." }));
    }

    #[tokio::test]
    async fn responses_are_json_and_carry_request_id() {
        let response = app()
            .oneshot(post_json("/api/login", r#"{"username":"bob","password":"x"}"#))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }

    #[tokio::test]
    async fn client_request_id_is_echoed() {
        let mut request = post_json("/api/register", r#"{"username":"x"}"#);
        request
            .headers_mut()
            .insert(X_REQUEST_ID, "trace-me".parse().unwrap());
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.headers().get(X_REQUEST_ID).unwrap(), "trace-me");
    }

    #[tokio::test]
    async fn unknown_path_is_json_not_found() {
        let (status, body) = send(app(), post_json("/api/logout", "{}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Not found." }));
    }

    #[tokio::test]
    async fn wrong_method_is_not_allowed() {
        let request = Request::builder()
            .method("GET")
            .uri("/api/login")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn handlers_use_injected_store() {
        let config = ServiceConfig::default();
        let store = Arc::new(InMemoryCredentialStore::single("maria", "segredo"));
        let app = build_router(&config, store);

        let (status, _) = send(
            app.clone(),
            post_json("/api/login", r#"{"username":"admin","password":"senha123"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            app.clone(),
            post_json("/api/login", r#"{"username":"maria","password":"segredo"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(app, post_json("/api/register", r#"{"username":"admin"}"#)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn slow_requests_get_json_timeout() {
        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    "late"
                }),
            )
            .layer(middleware::from_fn_with_state(
                Duration::from_millis(50),
                request_timeout,
            ));

        let request = Request::builder().uri("/slow").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::to_value(MessageBody::new(ApiError::RequestTimeout.to_string())).unwrap()
        );
    }

    #[tokio::test]
    async fn fast_requests_pass_through_timeout() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, _) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
    }

    fn preflight(uri: &str) -> Request<Body> {
        Request::builder()
            .method("OPTIONS")
            .uri(uri)
            .header(header::ORIGIN, "http://localhost:8081")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn cors_preflight_allows_any_origin() {
        let response = app().oneshot(preflight("/api/login")).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn cors_headers_absent_when_disabled() {
        let mut config = ServiceConfig::default();
        config.security.cors_enabled = false;
        let store = Arc::new(InMemoryCredentialStore::from_config(&config.credentials));
        let app = build_router(&config, store);

        let response = app.oneshot(preflight("/api/login")).await.unwrap();
        assert!(!response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
