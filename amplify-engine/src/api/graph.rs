//! Graph inspection and administration endpoints

use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::Ack;
use crate::graph::{Vertex, VertexKind};
use crate::stats::KindCounts;
use crate::{ApiError, ApiResult, AppState};

/// GET /api/grafo/info response
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub vertices: usize,
    pub arestas: usize,
    pub vertices_por_tipo: KindCounts,
    pub densidade: f64,
    pub grau_medio: f64,
    pub componentes: usize,
    pub conexo: bool,
}

#[derive(Debug, Serialize)]
pub struct VertexView {
    pub id: u64,
    pub nome: String,
    pub tipo: VertexKind,
}

impl From<&Vertex> for VertexView {
    fn from(v: &Vertex) -> Self {
        Self {
            id: v.id,
            nome: v.name.clone(),
            tipo: v.kind,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VertexListQuery {
    pub tipo: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VertexListResponse {
    pub vertices: Vec<VertexView>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateVertexRequest {
    pub nome: String,
    pub tipo: String,
}

#[derive(Debug, Serialize)]
pub struct CreateVertexResponse {
    pub success: bool,
    pub id: u64,
    pub nome: String,
    pub tipo: VertexKind,
    /// False when the vertex already existed
    pub criado: bool,
}

#[derive(Debug, Serialize)]
pub struct ConnectionView {
    pub id: u64,
    pub nome: String,
    pub tipo: VertexKind,
    pub peso: f64,
}

#[derive(Debug, Serialize)]
pub struct VertexDetailResponse {
    pub id: u64,
    pub nome: String,
    pub tipo: VertexKind,
    pub conexoes: Vec<ConnectionView>,
    pub total_conexoes: usize,
}

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub vertice1: String,
    pub vertice2: String,
    pub peso: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub success: bool,
    pub vertice1: VertexView,
    pub vertice2: VertexView,
    pub peso: f64,
    /// False when an existing edge had its weight replaced
    pub criada: bool,
}

#[derive(Debug, Serialize)]
pub struct ConnectivityResponse {
    pub conexo: bool,
    pub componentes: usize,
}

/// GET /api/grafo/info
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    let stats = state.service.stats().await;
    Json(InfoResponse {
        vertices: stats.vertices,
        arestas: stats.edges,
        vertices_por_tipo: stats.by_kind,
        densidade: stats.density,
        grau_medio: stats.average_degree,
        componentes: stats.components,
        conexo: stats.is_connected(),
    })
}

/// GET /api/grafo/vertices?tipo=
pub async fn list_vertices(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VertexListQuery>,
) -> Json<VertexListResponse> {
    let kind = query
        .tipo
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(VertexKind::parse_lenient);

    let vertices: Vec<VertexView> = state
        .service
        .list_vertices(kind)
        .await
        .iter()
        .map(VertexView::from)
        .collect();

    Json(VertexListResponse {
        total: vertices.len(),
        vertices,
    })
}

/// POST /api/grafo/vertices
pub async fn create_vertex(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateVertexRequest>,
) -> ApiResult<Json<CreateVertexResponse>> {
    let kind = VertexKind::parse_lenient(&payload.tipo);
    let (vertex, created) = state.service.create_vertex(&payload.nome, kind).await?;

    if created {
        info!(id = vertex.id, name = %vertex.name, kind = %vertex.kind, "Vertex created");
    }

    Ok(Json(CreateVertexResponse {
        success: true,
        id: vertex.id,
        nome: vertex.name,
        tipo: vertex.kind,
        criado: created,
    }))
}

/// GET /api/grafo/vertices/:id
pub async fn vertex_detail(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<Json<VertexDetailResponse>> {
    let detail = state.service.vertex_detail(id).await?;

    let conexoes: Vec<ConnectionView> = detail
        .connections
        .into_iter()
        .map(|c| ConnectionView {
            id: c.vertex.id,
            nome: c.vertex.name,
            tipo: c.vertex.kind,
            peso: c.weight,
        })
        .collect();

    Ok(Json(VertexDetailResponse {
        id: detail.vertex.id,
        nome: detail.vertex.name,
        tipo: detail.vertex.kind,
        total_conexoes: conexoes.len(),
        conexoes,
    }))
}

/// DELETE /api/grafo/vertices/:id
pub async fn remove_vertex(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<Json<Ack>> {
    let removed = state.service.remove_vertex(id).await?;
    Ok(Json(Ack::ok(format!(
        "Vértice '{}' removido com sucesso",
        removed.name
    ))))
}

/// POST /api/grafo/arestas
pub async fn connect(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ConnectRequest>,
) -> ApiResult<Json<ConnectResponse>> {
    if payload.vertice1.trim().is_empty() || payload.vertice2.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "vertice1 and vertice2 are required".to_string(),
        ));
    }

    let outcome = state
        .service
        .connect_by_names(&payload.vertice1, &payload.vertice2, payload.peso)
        .await?;

    Ok(Json(ConnectResponse {
        success: true,
        vertice1: VertexView::from(&outcome.a),
        vertice2: VertexView::from(&outcome.b),
        peso: outcome.weight,
        criada: outcome.created,
    }))
}

/// DELETE /api/grafo/arestas/:a/:b
pub async fn disconnect(
    State(state): State<AppState>,
    ApiPath((a, b)): ApiPath<(u64, u64)>,
) -> ApiResult<Json<Ack>> {
    state.service.disconnect(a, b).await?;
    Ok(Json(Ack::ok(format!("Aresta {}-{} removida com sucesso", a, b))))
}

/// GET /api/grafo/conexidade
pub async fn connectivity(State(state): State<AppState>) -> Json<ConnectivityResponse> {
    let stats = state.service.stats().await;
    Json(ConnectivityResponse {
        conexo: stats.is_connected(),
        componentes: stats.components,
    })
}

/// Build graph routes
pub fn graph_routes() -> Router<AppState> {
    Router::new()
        .route("/api/grafo/info", get(info))
        .route("/api/grafo/vertices", get(list_vertices).post(create_vertex))
        .route(
            "/api/grafo/vertices/:id",
            get(vertex_detail).delete(remove_vertex),
        )
        .route("/api/grafo/arestas", post(connect))
        .route("/api/grafo/arestas/:a/:b", delete(disconnect))
        .route("/api/grafo/conexidade", get(connectivity))
}
