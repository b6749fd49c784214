//! HTTP API handlers
//!
//! JSON field names are the Portuguese ones the dashboard consumes.

pub mod demo;
pub mod extract;
pub mod graph;
pub mod health;
pub mod recommendations;
pub mod songs;
pub mod spotify;
pub mod storage;

pub use demo::demo_routes;
pub use graph::graph_routes;
pub use health::health_routes;
pub use recommendations::recommendation_routes;
pub use songs::song_routes;
pub use spotify::spotify_routes;
pub use storage::storage_routes;

use serde::Serialize;

use crate::graph::Vertex;

/// `{id, nome}` reference to a related vertex
#[derive(Debug, Serialize)]
pub struct VertexRef {
    pub id: u64,
    pub nome: String,
}

impl From<&Vertex> for VertexRef {
    fn from(v: &Vertex) -> Self {
        Self {
            id: v.id,
            nome: v.name.clone(),
        }
    }
}

/// `{success, message}` acknowledgement
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
