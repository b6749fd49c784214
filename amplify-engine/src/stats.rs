//! Statistics Aggregator
//!
//! Derived metrics assume the simple undirected graph invariants enforced
//! by the store (no parallel edges, no self-loops).

use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};

use crate::graph::{Graph, VertexKind};

/// Vertex counts by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub musica: usize,
    pub artista: usize,
    pub genero: usize,
    #[serde(skip_serializing_if = "is_zero")]
    pub desconhecido: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Point-in-time graph statistics
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStats {
    pub vertices: usize,
    pub edges: usize,
    pub by_kind: KindCounts,
    pub density: f64,
    pub average_degree: f64,
    pub components: usize,
}

impl GraphStats {
    /// A graph is connected when it has exactly one component
    pub fn is_connected(&self) -> bool {
        self.components == 1
    }
}

/// `2E / (V (V - 1))` for `V > 1`, else 0
pub fn density(vertices: usize, edges: usize) -> f64 {
    if vertices > 1 {
        (2 * edges) as f64 / (vertices * (vertices - 1)) as f64
    } else {
        0.0
    }
}

/// `2E / V` for `V > 0`, else 0
pub fn average_degree(vertices: usize, edges: usize) -> f64 {
    if vertices > 0 {
        (2 * edges) as f64 / vertices as f64
    } else {
        0.0
    }
}

/// Number of connected components (BFS over the adjacency index)
pub fn connected_components(graph: &Graph) -> usize {
    let mut seen = BTreeSet::new();
    let mut components = 0;

    for start in graph.vertices().map(|v| v.id) {
        if !seen.insert(start) {
            continue;
        }
        components += 1;

        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for next in graph.neighbor_ids(current) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }

    components
}

/// Compute the full snapshot
pub fn snapshot(graph: &Graph) -> GraphStats {
    let vertices = graph.vertex_count();
    let edges = graph.edge_count();

    GraphStats {
        vertices,
        edges,
        by_kind: KindCounts {
            musica: graph.count_by_kind(VertexKind::Song),
            artista: graph.count_by_kind(VertexKind::Artist),
            genero: graph.count_by_kind(VertexKind::Genre),
            desconhecido: graph.count_by_kind(VertexKind::Unknown),
        },
        density: density(vertices, edges),
        average_degree: average_degree(vertices, edges),
        components: connected_components(graph),
    }
}
