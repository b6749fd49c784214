//! amplify-engine library interface
//!
//! Graph-based music similarity engine: an in-memory song/artist/genre
//! graph, Jaccard recommendations, catalog ingestion and file persistence,
//! served over HTTP to the Amplify dashboard.

pub mod api;
pub mod config;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod persistence;
pub mod service;
pub mod similarity;
pub mod stats;

pub use crate::error::{ApiError, ApiResult};
pub use crate::service::GraphService;

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GraphService>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: GraphService) -> Self {
        Self {
            service: Arc::new(service),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::graph_routes())
        .merge(api::song_routes())
        .merge(api::recommendation_routes())
        .merge(api::spotify_routes())
        .merge(api::storage_routes())
        .merge(api::demo_routes())
        .with_state(state)
}
