//! In-memory typed graph of songs, artists and genres
//!
//! Invariants maintained by every mutation:
//! - at most one vertex per natural key `(name, kind)`
//! - at most one edge per unordered vertex pair, never a self-loop
//! - the adjacency index mirrors the edge map exactly
//! - vertex ids are allocated monotonically and never reused

use amplify_common::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::types::{ConnectOutcome, Edge, EdgeKey, Neighbor, Vertex, VertexId, VertexKind};

/// Owned graph instance. Not synchronised; see [`super::SharedGraph`].
#[derive(Debug, Clone, Default)]
pub struct Graph {
    vertices: BTreeMap<VertexId, Vertex>,
    by_key: HashMap<(VertexKind, String), VertexId>,
    by_kind: HashMap<VertexKind, BTreeSet<VertexId>>,
    adjacency: BTreeMap<VertexId, BTreeSet<VertexId>>,
    edges: BTreeMap<EdgeKey, f64>,
    next_id: VertexId,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `(name, kind)`, allocating a vertex if none exists
    pub fn create_vertex(&mut self, name: &str, kind: VertexKind) -> Result<VertexId> {
        self.ensure_vertex(name, kind).map(|(id, _)| id)
    }

    /// Like `create_vertex`, also reporting whether a vertex was allocated
    pub fn ensure_vertex(&mut self, name: &str, kind: VertexKind) -> Result<(VertexId, bool)> {
        let name = normalize_name(name)?;

        if let Some(&id) = self.by_key.get(&(kind, name.clone())) {
            return Ok((id, false));
        }

        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| Error::Conflict("vertex id space exhausted".to_string()))?;
        self.index_vertex(Vertex { id, name, kind });
        Ok((id, true))
    }

    /// Connect two vertices; an existing edge has its weight replaced
    pub fn connect(&mut self, a: VertexId, b: VertexId, weight: f64) -> Result<ConnectOutcome> {
        if a == b {
            return Err(Error::invalid(format!("self-loop on vertex {} is not allowed", a)));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::invalid(format!(
                "edge weight must be finite and >= 0 (got {})",
                weight
            )));
        }
        self.require(a)?;
        self.require(b)?;

        let outcome = match self.edges.insert(EdgeKey::new(a, b), weight) {
            Some(_) => ConnectOutcome::Updated,
            None => ConnectOutcome::Inserted,
        };
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
        Ok(outcome)
    }

    /// Remove the edge between two vertices, returning whether one existed
    pub fn disconnect(&mut self, a: VertexId, b: VertexId) -> Result<bool> {
        self.require(a)?;
        self.require(b)?;

        if self.edges.remove(&EdgeKey::new(a, b)).is_none() {
            return Ok(false);
        }
        if let Some(set) = self.adjacency.get_mut(&a) {
            set.remove(&b);
        }
        if let Some(set) = self.adjacency.get_mut(&b) {
            set.remove(&a);
        }
        Ok(true)
    }

    /// Remove a vertex together with all incident edges
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<Vertex> {
        let vertex = self
            .vertices
            .remove(&id)
            .ok_or_else(|| Error::not_found("vertex", id))?;

        let neighbors = self.adjacency.remove(&id).unwrap_or_default();
        for other in neighbors {
            self.edges.remove(&EdgeKey::new(id, other));
            if let Some(set) = self.adjacency.get_mut(&other) {
                set.remove(&id);
            }
        }

        self.by_key.remove(&(vertex.kind, vertex.name.clone()));
        if let Some(ids) = self.by_kind.get_mut(&vertex.kind) {
            ids.remove(&id);
        }
        Ok(vertex)
    }

    /// Neighbors of `id`, ordered by neighbor id
    pub fn neighbors(&self, id: VertexId) -> Result<Vec<Neighbor>> {
        self.require(id)?;
        Ok(self
            .neighbor_ids(id)
            .map(|other| Neighbor {
                id: other,
                weight: self.edges.get(&EdgeKey::new(id, other)).copied().unwrap_or_default(),
            })
            .collect())
    }

    /// Neighbor ids of `id` without existence check (empty for unknown ids)
    pub fn neighbor_ids(&self, id: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }

    pub fn vertex(&self, id: VertexId) -> Result<&Vertex> {
        self.vertices
            .get(&id)
            .ok_or_else(|| Error::not_found("vertex", id))
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    /// Natural-key lookup
    pub fn find(&self, name: &str, kind: VertexKind) -> Option<VertexId> {
        self.by_key.get(&(kind, name.trim().to_string())).copied()
    }

    /// Lookup by the stored name with no trimming
    pub fn find_exact(&self, name: &str, kind: VertexKind) -> Option<VertexId> {
        self.by_key.get(&(kind, name.to_string())).copied()
    }

    /// Lookup by name across all kinds; the first-created (lowest id) match wins
    pub fn find_by_name(&self, name: &str) -> Option<VertexId> {
        let name = name.trim();
        VertexKind::ALL
            .iter()
            .filter_map(|kind| self.by_key.get(&(*kind, name.to_string())))
            .min()
            .copied()
    }

    /// Vertices of one kind, ordered by id
    pub fn vertices_by_kind(&self, kind: VertexKind) -> Vec<&Vertex> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flatten()
            .filter_map(|id| self.vertices.get(id))
            .collect()
    }

    /// All vertices ordered by id
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// All edges ordered by `(low id, high id)`
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().map(|(key, weight)| Edge {
            a: key.low(),
            b: key.high(),
            weight: *weight,
        })
    }

    pub fn edge_weight(&self, a: VertexId, b: VertexId) -> Option<f64> {
        self.edges.get(&EdgeKey::new(a, b)).copied()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn count_by_kind(&self, kind: VertexKind) -> usize {
        self.by_kind.get(&kind).map(|ids| ids.len()).unwrap_or(0)
    }

    pub fn degree(&self, id: VertexId) -> usize {
        self.adjacency.get(&id).map(|set| set.len()).unwrap_or(0)
    }

    /// Next id that `create_vertex` would allocate
    pub fn next_id(&self) -> VertexId {
        self.next_id
    }

    /// Rebuild a graph from persisted parts, preserving ids
    ///
    /// Rejects anything that would break the store invariants: duplicate
    /// ids or natural keys, edges to unknown vertices, self-loops, parallel
    /// edges, invalid weights, or a `next_id` that could reuse an id.
    pub fn restore(next_id: VertexId, vertices: Vec<Vertex>, edges: Vec<Edge>) -> Result<Self> {
        if next_id == VertexId::MAX {
            return Err(Error::invalid(format!("next_id {} leaves no id to allocate", next_id)));
        }
        let mut graph = Graph::new();

        for vertex in vertices {
            let name = normalize_name(&vertex.name)?;
            if graph.vertices.contains_key(&vertex.id) {
                return Err(Error::invalid(format!("duplicate vertex id {}", vertex.id)));
            }
            if graph.by_key.contains_key(&(vertex.kind, name.clone())) {
                return Err(Error::invalid(format!(
                    "duplicate vertex '{}' of kind {}",
                    name, vertex.kind
                )));
            }
            if vertex.id >= next_id {
                return Err(Error::invalid(format!(
                    "vertex id {} is not below next_id {}",
                    vertex.id, next_id
                )));
            }
            graph.index_vertex(Vertex { name, ..vertex });
        }
        graph.next_id = next_id;

        for edge in edges {
            if graph.edge_weight(edge.a, edge.b).is_some() {
                return Err(Error::invalid(format!(
                    "parallel edge between {} and {}",
                    edge.a, edge.b
                )));
            }
            graph.connect(edge.a, edge.b, edge.weight)?;
        }

        Ok(graph)
    }

    fn index_vertex(&mut self, vertex: Vertex) {
        self.by_key.insert((vertex.kind, vertex.name.clone()), vertex.id);
        self.by_kind.entry(vertex.kind).or_default().insert(vertex.id);
        self.vertices.insert(vertex.id, vertex);
    }

    fn require(&self, id: VertexId) -> Result<()> {
        if self.vertices.contains_key(&id) {
            Ok(())
        } else {
            Err(Error::not_found("vertex", id))
        }
    }
}

fn normalize_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid("vertex name must not be empty"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DEFAULT_WEIGHT;

    fn path_graph() -> (Graph, Vec<VertexId>) {
        let mut graph = Graph::new();
        let ids: Vec<VertexId> = ["a", "b", "c", "d"]
            .iter()
            .map(|n| graph.create_vertex(n, VertexKind::Unknown).unwrap())
            .collect();
        for pair in ids.windows(2) {
            graph.connect(pair[0], pair[1], DEFAULT_WEIGHT).unwrap();
        }
        (graph, ids)
    }

    #[test]
    fn test_create_vertex_is_idempotent() {
        let mut graph = Graph::new();
        let first = graph.create_vertex("Hey Jude", VertexKind::Song).unwrap();
        let second = graph.create_vertex("Hey Jude", VertexKind::Song).unwrap();

        assert_eq!(first, second);
        assert_eq!(graph.vertex_count(), 1);
    }

    #[test]
    fn test_same_name_different_kind_is_distinct() {
        let mut graph = Graph::new();
        let song = graph.create_vertex("Queen", VertexKind::Song).unwrap();
        let artist = graph.create_vertex("Queen", VertexKind::Artist).unwrap();

        assert_ne!(song, artist);
        assert_eq!(graph.find_by_name("Queen"), Some(song));
        assert_eq!(graph.find("Queen", VertexKind::Artist), Some(artist));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut graph = Graph::new();
        let result = graph.create_vertex("   ", VertexKind::Song);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_names_are_trimmed() {
        let mut graph = Graph::new();
        let a = graph.create_vertex("  Kashmir ", VertexKind::Song).unwrap();
        let b = graph.create_vertex("Kashmir", VertexKind::Song).unwrap();
        assert_eq!(a, b);
        assert_eq!(graph.vertex(a).unwrap().name, "Kashmir");
        assert_eq!(graph.find(" Kashmir", VertexKind::Song), Some(a));
        assert_eq!(graph.find_exact(" Kashmir", VertexKind::Song), None);
        assert_eq!(graph.find_exact("Kashmir", VertexKind::Song), Some(a));
    }

    #[test]
    fn test_connect_replaces_weight() {
        let mut graph = Graph::new();
        let a = graph.create_vertex("a", VertexKind::Song).unwrap();
        let b = graph.create_vertex("b", VertexKind::Genre).unwrap();

        assert_eq!(graph.connect(a, b, 1.0).unwrap(), ConnectOutcome::Inserted);
        assert_eq!(graph.connect(b, a, 2.5).unwrap(), ConnectOutcome::Updated);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge_weight(a, b), Some(2.5));
        assert_eq!(graph.neighbors(a).unwrap(), vec![Neighbor { id: b, weight: 2.5 }]);
        assert_eq!(graph.neighbors(b).unwrap(), vec![Neighbor { id: a, weight: 2.5 }]);
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut graph = Graph::new();
        let a = graph.create_vertex("a", VertexKind::Song).unwrap();
        assert!(matches!(graph.connect(a, a, 1.0), Err(Error::InvalidArgument(_))));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_connect_unknown_vertex() {
        let mut graph = Graph::new();
        let a = graph.create_vertex("a", VertexKind::Song).unwrap();
        assert!(matches!(graph.connect(a, 99, 1.0), Err(Error::NotFound(_))));
        assert!(graph.neighbors(a).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_weight_rejected() {
        let mut graph = Graph::new();
        let a = graph.create_vertex("a", VertexKind::Song).unwrap();
        let b = graph.create_vertex("b", VertexKind::Artist).unwrap();
        assert!(graph.connect(a, b, -1.0).is_err());
        assert!(graph.connect(a, b, f64::NAN).is_err());
        assert!(graph.connect(a, b, 0.0).is_ok());
    }

    #[test]
    fn test_neighbors_unknown_vertex() {
        let graph = Graph::new();
        assert!(matches!(graph.neighbors(5), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_remove_vertex_drops_incident_edges() {
        let (mut graph, ids) = path_graph();
        let removed = graph.remove_vertex(ids[1]).unwrap();

        assert_eq!(removed.name, "b");
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.neighbors(ids[0]).unwrap().is_empty());
        assert_eq!(graph.degree(ids[2]), 1);
        assert_eq!(graph.find("b", VertexKind::Unknown), None);
        assert_eq!(graph.count_by_kind(VertexKind::Unknown), 3);
    }

    #[test]
    fn test_ids_not_reused_after_removal() {
        let mut graph = Graph::new();
        let a = graph.create_vertex("a", VertexKind::Song).unwrap();
        graph.remove_vertex(a).unwrap();
        let again = graph.create_vertex("a", VertexKind::Song).unwrap();
        assert_ne!(a, again);
    }

    #[test]
    fn test_disconnect() {
        let (mut graph, ids) = path_graph();
        assert!(graph.disconnect(ids[1], ids[0]).unwrap());
        assert!(!graph.disconnect(ids[0], ids[1]).unwrap());
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.degree(ids[0]), 0);
    }

    #[test]
    fn test_vertices_by_kind_ordered() {
        let mut graph = Graph::new();
        let s1 = graph.create_vertex("s1", VertexKind::Song).unwrap();
        graph.create_vertex("g", VertexKind::Genre).unwrap();
        let s2 = graph.create_vertex("s2", VertexKind::Song).unwrap();

        let songs: Vec<VertexId> = graph
            .vertices_by_kind(VertexKind::Song)
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(songs, vec![s1, s2]);
        assert!(graph.vertices_by_kind(VertexKind::Artist).is_empty());
    }

    #[test]
    fn test_restore_preserves_ids() {
        let vertices = vec![
            Vertex { id: 3, name: "x".into(), kind: VertexKind::Song },
            Vertex { id: 10, name: "y".into(), kind: VertexKind::Genre },
        ];
        let edges = vec![Edge { a: 10, b: 3, weight: 0.5 }];
        let graph = Graph::restore(11, vertices, edges).unwrap();

        assert_eq!(graph.vertex(3).unwrap().name, "x");
        assert_eq!(graph.edge_weight(3, 10), Some(0.5));
        assert_eq!(graph.next_id(), 11);
    }

    #[test]
    fn test_restore_rejects_broken_input() {
        let v = |id, name: &str| Vertex { id, name: name.into(), kind: VertexKind::Song };

        assert!(Graph::restore(5, vec![v(1, "a"), v(1, "b")], vec![]).is_err());
        assert!(Graph::restore(5, vec![v(1, "a"), v(2, "a")], vec![]).is_err());
        assert!(Graph::restore(2, vec![v(1, "a"), v(2, "b")], vec![]).is_err());
        assert!(Graph::restore(5, vec![v(1, "a")], vec![Edge { a: 1, b: 1, weight: 1.0 }]).is_err());
        assert!(Graph::restore(5, vec![v(1, "a")], vec![Edge { a: 1, b: 4, weight: 1.0 }]).is_err());
        assert!(Graph::restore(
            5,
            vec![v(1, "a"), v(2, "b")],
            vec![Edge { a: 1, b: 2, weight: 1.0 }, Edge { a: 2, b: 1, weight: 2.0 }]
        )
        .is_err());
    }

    #[test]
    fn test_restore_rejects_exhausted_id_space() {
        let vertices = vec![Vertex { id: 0, name: "x".into(), kind: VertexKind::Song }];
        assert!(matches!(
            Graph::restore(VertexId::MAX, vertices, vec![]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_allocation_never_wraps() {
        let vertices = vec![Vertex { id: 0, name: "x".into(), kind: VertexKind::Song }];
        let mut graph = Graph::restore(VertexId::MAX - 1, vertices, vec![]).unwrap();

        let last = graph.create_vertex("y", VertexKind::Song).unwrap();
        assert_eq!(last, VertexId::MAX - 1);

        let err = graph.create_vertex("z", VertexKind::Song).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(graph.vertex(0).unwrap().name, "x");
        assert_eq!(graph.vertex_count(), 2);
    }
}
