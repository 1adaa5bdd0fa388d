use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State as AxumState},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;

use crate::engine::DesignService;
use crate::error::AppError;
use crate::models::{ChatApiRequest, ChatApiResponse, GenerateHtmlRequest, GenerateHtmlResponse};
use crate::validation::require_non_empty;

/// Shared state for the HTTP server.
#[derive(Clone, Default)]
pub struct AppState {
    /// `None` when no model credential is configured; every model-backed
    /// endpoint then fails with a configuration error.
    pub service: Option<Arc<DesignService>>,
}

impl AppState {
    pub fn new(service: Option<DesignService>) -> Self {
        Self {
            service: service.map(Arc::new),
        }
    }

    fn service(&self) -> Result<&DesignService, AppError> {
        self.service
            .as_deref()
            .ok_or_else(|| AppError::Config("Missing OPENAI_API_KEY".into()))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/generate-html", post(generate_html))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until `shutdown_rx` changes.
pub async fn start_server(
    state: AppState,
    addr: SocketAddr,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, router(state), shutdown_rx).await
}

/// Serve `app` on an already-bound listener.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), AppError> {
    let addr = listener.local_addr()?;
    tracing::info!("Brad server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            tracing::info!("Brad server shutting down");
        })
        .await?;

    Ok(())
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "service": "brad" }))
}

/// POST /api/chat -- one structured conversation turn.
async fn chat(
    AxumState(state): AxumState<Arc<AppState>>,
    payload: Result<Json<ChatApiRequest>, JsonRejection>,
) -> Result<Json<ChatApiResponse>, AppError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected chat body: {}", e);
        AppError::Validation("Invalid request".into())
    })?;
    require_non_empty("message", &request.message)?;

    let turn = state.service()?.structured_turn(&request).await?;
    Ok(Json(ChatApiResponse::ok(turn)))
}

/// POST /api/generate-html -- the final page for the gathered requirements.
async fn generate_html(
    AxumState(state): AxumState<Arc<AppState>>,
    payload: Result<Json<GenerateHtmlRequest>, JsonRejection>,
) -> Result<Json<GenerateHtmlResponse>, AppError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected generate-html body: {}", e);
        AppError::Validation("Invalid request".into())
    })?;

    let html = state
        .service()?
        .generate_page(&request.design_requirements)
        .await?;
    Ok(Json(GenerateHtmlResponse::ok(html)))
}
