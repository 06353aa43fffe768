use crate::commands::{self, Dashboard};
use crate::models::IndexTable;
use crate::nse_client::{NSEClient, RetryPolicy};
use crate::rules::LevelResult;
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::info;

// -----------------------------------------------
// API RESPONSE MODELS
// -----------------------------------------------

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub processing_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T, start_time: Instant) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            processing_time_ms: Some(start_time.elapsed().as_millis() as u64),
        }
    }

    fn err(error: String, start_time: Instant) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            processing_time_ms: Some(start_time.elapsed().as_millis() as u64),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub indices: Vec<String>,
}

// -----------------------------------------------
// APPLICATION STATE
// -----------------------------------------------

/// Shared across handlers; the client's chain cache is what keeps repeated
/// requests from hitting NSE.
#[derive(Clone)]
pub struct AppState {
    client: Arc<NSEClient>,
    table: Arc<IndexTable>,
    policy: RetryPolicy,
}

impl AppState {
    pub fn new(client: NSEClient, table: IndexTable, policy: RetryPolicy) -> Self {
        Self {
            client: Arc::new(client),
            table: Arc::new(table),
            policy,
        }
    }
}

// -----------------------------------------------
// API HANDLERS
// -----------------------------------------------

/// GET /api/health
async fn get_health(State(app_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        indices: app_state.table.iter().map(|i| i.symbol.clone()).collect(),
    })
}

/// GET /api/levels - all configured indices, in configuration order
async fn get_levels(State(app_state): State<AppState>) -> Json<ApiResponse<Dashboard>> {
    let start_time = Instant::now();
    let dashboard =
        commands::build_dashboard(&app_state.client, &app_state.table, &app_state.policy).await;
    Json(ApiResponse::ok(dashboard, start_time))
}

/// GET /api/levels/{index}
async fn get_index_levels(
    Path(index): Path<String>,
    State(app_state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<LevelResult>>) {
    let start_time = Instant::now();

    let Some(config) = app_state.table.get(&index) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("Unknown index '{}'", index), start_time)),
        );
    };

    let result = commands::evaluate_index(&app_state.client, config, &app_state.policy).await;
    (StatusCode::OK, Json(ApiResponse::ok(result, start_time)))
}

// -----------------------------------------------
// SERVER SETUP
// -----------------------------------------------

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(get_health))
        .route("/api/levels", get(get_levels))
        .route("/api/levels/{index}", get(get_index_levels))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

pub async fn start_server(
    port: u16,
    client: NSEClient,
    table: IndexTable,
    policy: RetryPolicy,
) -> Result<()> {
    let app = router(AppState::new(client, table, policy));

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, "api server listening");
    println!("🚀 Hero/Zero API Server running on http://{}", addr);
    println!("📋 Available endpoints:");
    println!("   GET  /api/health");
    println!("   GET  /api/levels");
    println!("   GET  /api/levels/NIFTY");
    println!();

    axum::serve(listener, app).await?;
    Ok(())
}
