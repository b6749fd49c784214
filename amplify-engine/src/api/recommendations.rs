//! Recommendation endpoint

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::extract::{ApiPath, ApiQuery};
use super::songs::SongView;
use crate::{ApiError, ApiResult, AppState};

const DEFAULT_LIMIT: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub limite: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationView {
    #[serde(flatten)]
    pub song: SongView,
    /// Jaccard score in `[0, 1]`
    pub score_similaridade: f64,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub musica_base: SongView,
    pub recomendacoes: Vec<RecommendationView>,
    pub total: usize,
}

/// GET /api/recomendacoes/:nome?limite=N
pub async fn recommend(
    State(state): State<AppState>,
    ApiPath(nome): ApiPath<String>,
    ApiQuery(query): ApiQuery<RecommendationQuery>,
) -> ApiResult<Json<RecommendationResponse>> {
    let limit = query.limite.unwrap_or(DEFAULT_LIMIT);
    if limit <= 0 {
        return Err(ApiError::BadRequest(format!(
            "limite must be at least 1 (got {})",
            limit
        )));
    }

    debug!(song = %nome, limit, "Recommendation request");
    let set = state.service.recommend(&nome, limit as usize).await?;

    let recomendacoes: Vec<RecommendationView> = set
        .items
        .iter()
        .map(|item| RecommendationView {
            song: SongView::from(&item.summary),
            score_similaridade: item.score,
        })
        .collect();

    Ok(Json(RecommendationResponse {
        musica_base: SongView::from(&set.base),
        total: recomendacoes.len(),
        recomendacoes,
    }))
}

/// Build recommendation routes
pub fn recommendation_routes() -> Router<AppState> {
    Router::new().route("/api/recomendacoes/:nome", get(recommend))
}
