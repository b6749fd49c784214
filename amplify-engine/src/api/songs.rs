//! Song listing endpoints

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::extract::{ApiPath, ApiQuery};
use super::VertexRef;
use crate::service::{SongFilter, SongSummary};
use crate::{ApiResult, AppState};

/// Song with artist and genre names, as listed by the dashboard
#[derive(Debug, Serialize)]
pub struct SongView {
    pub id: u64,
    pub nome: String,
    pub artistas: Vec<String>,
    pub generos: Vec<String>,
}

impl From<&SongSummary> for SongView {
    fn from(s: &SongSummary) -> Self {
        Self {
            id: s.song.id,
            nome: s.song.name.clone(),
            artistas: s.artists.iter().map(|a| a.name.clone()).collect(),
            generos: s.genres.iter().map(|g| g.name.clone()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SongQuery {
    pub genero: Option<String>,
    pub artista: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SongListResponse {
    pub musicas: Vec<SongView>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct SongDetailResponse {
    pub id: u64,
    pub nome: String,
    pub artistas: Vec<VertexRef>,
    pub generos: Vec<VertexRef>,
}

/// GET /api/musicas?genero=&artista=
pub async fn list_songs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SongQuery>,
) -> Json<SongListResponse> {
    let filter = SongFilter {
        genre: query.genero,
        artist: query.artista,
    };
    let musicas: Vec<SongView> = state
        .service
        .songs(&filter)
        .await
        .iter()
        .map(SongView::from)
        .collect();

    Json(SongListResponse {
        total: musicas.len(),
        musicas,
    })
}

/// GET /api/musicas/:id
pub async fn song_detail(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<Json<SongDetailResponse>> {
    let summary = state.service.song_detail(id).await?;
    Ok(Json(SongDetailResponse {
        id: summary.song.id,
        nome: summary.song.name.clone(),
        artistas: summary.artists.iter().map(VertexRef::from).collect(),
        generos: summary.genres.iter().map(VertexRef::from).collect(),
    }))
}

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/api/musicas", get(list_songs))
        .route("/api/musicas/:id", get(song_detail))
}
