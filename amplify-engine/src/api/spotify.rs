//! Catalog (Spotify) endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{ApiError, ApiResult, AppState};

const DEFAULT_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub configurado: bool,
    pub conectado: bool,
    pub mensagem: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub artista_nome: String,
}

#[derive(Debug, Serialize)]
pub struct ImportDetails {
    pub artista: String,
    pub musicas_importadas: usize,
    pub musicas_ignoradas: usize,
    pub novos_vertices: usize,
    pub novas_arestas: usize,
    pub avisos: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    pub detalhes: ImportDetails,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub nome: Option<String>,
    pub limite: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ArtistView {
    pub id: String,
    pub nome: String,
    pub generos: Vec<String>,
    pub popularidade: u32,
    pub imagem: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub artistas: Vec<ArtistView>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct TrackView {
    pub id: String,
    pub nome: String,
    pub album: Option<String>,
    pub duracao_ms: u64,
    pub popularidade: u32,
    pub preview_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TopTracksResponse {
    pub musicas: Vec<TrackView>,
    pub total: usize,
}

/// GET /api/spotify/status
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = state.service.catalog_status().await;
    Json(StatusResponse {
        configurado: status.configured,
        conectado: status.connected,
        mensagem: status.message,
    })
}

/// POST /api/spotify/importar-artista
pub async fn import_artist(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ImportRequest>,
) -> ApiResult<Json<ImportResponse>> {
    if payload.artista_nome.trim().is_empty() {
        return Err(ApiError::BadRequest("artista_nome is required".to_string()));
    }

    let report = state.service.import_artist(&payload.artista_nome).await?;
    info!(artist = %report.artist, "Import request served");

    Ok(Json(ImportResponse {
        success: true,
        message: format!(
            "Artista '{}' importado com {} músicas",
            report.artist, report.songs_imported
        ),
        detalhes: ImportDetails {
            artista: report.artist,
            musicas_importadas: report.songs_imported,
            musicas_ignoradas: report.songs_skipped,
            novos_vertices: report.new_vertices,
            novas_arestas: report.new_edges,
            avisos: report.warnings,
        },
    }))
}

/// GET /api/spotify/buscar-artista?nome=
pub async fn search_artists(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let nome = query.nome.unwrap_or_default();
    if nome.trim().is_empty() {
        return Err(ApiError::BadRequest("nome is required".to_string()));
    }
    let limit = query.limite.unwrap_or(DEFAULT_SEARCH_LIMIT).max(1);

    let artistas: Vec<ArtistView> = state
        .service
        .search_artists(&nome, limit)
        .await?
        .into_iter()
        .map(|a| ArtistView {
            id: a.id,
            nome: a.name,
            generos: a.genres,
            popularidade: a.popularity,
            imagem: a.image_url,
        })
        .collect();

    Ok(Json(SearchResponse {
        total: artistas.len(),
        artistas,
    }))
}

/// GET /api/spotify/top-tracks/:artista_id
pub async fn top_tracks(
    State(state): State<AppState>,
    ApiPath(artista_id): ApiPath<String>,
) -> ApiResult<Json<TopTracksResponse>> {
    let musicas: Vec<TrackView> = state
        .service
        .top_tracks(&artista_id)
        .await?
        .into_iter()
        .map(|t| TrackView {
            id: t.id,
            nome: t.name,
            album: t.album,
            duracao_ms: t.duration_ms,
            popularidade: t.popularity,
            preview_url: t.preview_url,
        })
        .collect();

    Ok(Json(TopTracksResponse {
        total: musicas.len(),
        musicas,
    }))
}

/// Build catalog routes
pub fn spotify_routes() -> Router<AppState> {
    Router::new()
        .route("/api/spotify/status", get(status))
        .route("/api/spotify/importar-artista", post(import_artist))
        .route("/api/spotify/buscar-artista", get(search_artists))
        .route("/api/spotify/top-tracks/:artista_id", get(top_tracks))
}
