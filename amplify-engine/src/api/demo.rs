//! Demo seeding endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;

use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct DemoDetails {
    pub musicas: usize,
    pub artistas: usize,
    pub generos: usize,
    pub vertices: usize,
    pub arestas: usize,
    pub novos_vertices: usize,
    pub novas_arestas: usize,
}

#[derive(Debug, Serialize)]
pub struct DemoResponse {
    pub success: bool,
    pub message: String,
    pub detalhes: DemoDetails,
}

/// POST /api/demo/inicializar
pub async fn seed_demo(State(state): State<AppState>) -> ApiResult<Json<DemoResponse>> {
    let report = state.service.seed_demo().await?;
    Ok(Json(DemoResponse {
        success: true,
        message: "Dados de demonstração carregados".to_string(),
        detalhes: DemoDetails {
            musicas: report.songs,
            artistas: report.artists,
            generos: report.genres,
            vertices: report.vertices,
            arestas: report.edges,
            novos_vertices: report.new_vertices,
            novas_arestas: report.new_edges,
        },
    }))
}

/// Build demo routes
pub fn demo_routes() -> Router<AppState> {
    Router::new().route("/api/demo/inicializar", post(seed_demo))
}
