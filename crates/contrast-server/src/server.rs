//! Axum-based HTTP server exposing the comparison API

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{HeaderName, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use contrast_core::{ComparisonEngine, ComparisonRequest};

/// Shared state for all request handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ComparisonEngine>,
    pub start_time: std::time::Instant,
}

/// The API server
pub struct ApiServer {
    state: AppState,
    bind: SocketAddr,
}

impl ApiServer {
    pub fn new(bind: SocketAddr, engine: Arc<ComparisonEngine>) -> Self {
        let state = AppState {
            engine,
            start_time: std::time::Instant::now(),
        };
        Self { state, bind }
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/compare", post(compare_handler))
            .route("/api/status", get(status_handler))
            .layer(cors_layer())
            .with_state(self.state.clone())
    }

    /// Start the server (blocks until shutdown)
    pub async fn run(self) -> anyhow::Result<()> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.bind).await?;
        info!("API server listening on {}", self.bind);

        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Start the server in the background, returning a handle
    pub fn spawn(self) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}

/// Permissive CORS matching the public wire contract: any origin, the
/// headers browser clients send, POST/GET plus preflight. Preflight
/// OPTIONS requests are answered by this layer and never reach a handler.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

// ── HTTP Handlers ──

async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();

    axum::Json(serde_json::json!({
        "status": "ok",
        "backend": state.engine.gateway().backend_name(),
        "model": state.engine.gateway().model(),
        "backends": state.engine.gateway().backend_count(),
        "uptime_secs": uptime,
    }))
}

async fn compare_handler(
    State(state): State<AppState>,
    body: Result<Json<ComparisonRequest>, JsonRejection>,
) -> Response {
    // Malformed bodies get the same {"error"} envelope as every other
    // failure path, not axum's plain-text rejection.
    let Json(request) = match body {
        Ok(json) => json,
        Err(rejection) => {
            return error_response(rejection.status(), &rejection.body_text());
        }
    };

    // Reject blank reports up front; model calls are too expensive to
    // spend on empty input.
    if request.report1.trim().is_empty() || request.report2.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "both report1 and report2 must be non-empty",
        );
    }

    match state.engine.compare(&request).await {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(e) => {
            error!("Comparison request failed: {:#}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &format!("{:#}", e))
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        axum::Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}
