//! Health check endpoints

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Root banner response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    /// Module name ("amplify-engine")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct GraphHealth {
    pub vertices: usize,
    pub arestas: usize,
}

/// Dashboard health response
#[derive(Debug, Serialize)]
pub struct ApiHealthResponse {
    pub status: String,
    pub grafo: GraphHealth,
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "online".to_string(),
        service: "Amplify API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "amplify-engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
    })
}

/// GET /api/health
pub async fn api_health(State(state): State<AppState>) -> Json<ApiHealthResponse> {
    let graph = state.service.graph().read().await;
    Json(ApiHealthResponse {
        status: "healthy".to_string(),
        grafo: GraphHealth {
            vertices: graph.vertex_count(),
            arestas: graph.edge_count(),
        },
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/health", get(api_health))
}
