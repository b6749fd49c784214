//! Persistence endpoints

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use super::extract::ApiQuery;
use super::Ack;
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    /// File inside the data folder; defaults to the configured graph file
    pub caminho: Option<String>,
}

/// POST /api/grafo/salvar?caminho=
pub async fn save(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PathQuery>,
) -> ApiResult<Json<Ack>> {
    let outcome = state.service.save(query.caminho.as_deref()).await?;
    Ok(Json(Ack::ok(format!(
        "Grafo salvo em {} ({} vértices, {} arestas)",
        outcome.path.display(),
        outcome.vertices,
        outcome.edges
    ))))
}

/// POST /api/grafo/carregar?caminho=
pub async fn load(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PathQuery>,
) -> ApiResult<Json<Ack>> {
    let outcome = state.service.load(query.caminho.as_deref()).await?;
    Ok(Json(Ack::ok(format!(
        "Grafo carregado de {} ({} vértices, {} arestas)",
        outcome.path.display(),
        outcome.vertices,
        outcome.edges
    ))))
}

/// Build persistence routes
pub fn storage_routes() -> Router<AppState> {
    Router::new()
        .route("/api/grafo/salvar", post(save))
        .route("/api/grafo/carregar", post(load))
}
