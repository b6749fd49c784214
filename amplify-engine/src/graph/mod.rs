//! Graph Store
//!
//! [`Graph`] is a plain owned structure; [`SharedGraph`] is the handle
//! passed to concurrent request handlers. A single reader-writer lock
//! covers the whole graph: reads run concurrently, every mutation (and
//! every ingestion batch) holds the write lock for its full duration.

mod store;
mod types;

pub use store::Graph;
pub use types::{
    ConnectOutcome, Edge, EdgeKey, Neighbor, Vertex, VertexId, VertexKind, DEFAULT_WEIGHT,
};

use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe handle to one graph instance
#[derive(Clone, Default)]
pub struct SharedGraph {
    inner: Arc<RwLock<Graph>>,
}

impl SharedGraph {
    pub fn new(graph: Graph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Graph> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Graph> {
        self.inner.write().await
    }

    /// Swap in a fully built graph, returning the previous one
    ///
    /// Readers observe either the old or the new graph, never a mix.
    pub async fn replace(&self, graph: Graph) -> Graph {
        let mut guard = self.inner.write().await;
        std::mem::replace(&mut *guard, graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replace_swaps_whole_graph() {
        let shared = SharedGraph::default();
        shared
            .write()
            .await
            .create_vertex("old", VertexKind::Song)
            .unwrap();

        let mut fresh = Graph::new();
        fresh.create_vertex("new-1", VertexKind::Song).unwrap();
        fresh.create_vertex("new-2", VertexKind::Genre).unwrap();

        let previous = shared.replace(fresh).await;
        assert_eq!(previous.vertex_count(), 1);

        let graph = shared.read().await;
        assert_eq!(graph.vertex_count(), 2);
        assert!(graph.find("old", VertexKind::Song).is_none());
    }
}
