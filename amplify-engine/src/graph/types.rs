//! Vertex and edge types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vertex identifier. Allocated monotonically, never reused.
pub type VertexId = u64;

/// Default edge weight for catalog relations
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Kind of a vertex
///
/// Wire names are the ones the dashboard uses (`musica`, `artista`,
/// `genero`); anything else is `desconhecido`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VertexKind {
    #[serde(rename = "musica")]
    Song,
    #[serde(rename = "artista")]
    Artist,
    #[serde(rename = "genero")]
    Genre,
    #[serde(rename = "desconhecido")]
    Unknown,
}

impl VertexKind {
    pub const ALL: [VertexKind; 4] = [
        VertexKind::Song,
        VertexKind::Artist,
        VertexKind::Genre,
        VertexKind::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VertexKind::Song => "musica",
            VertexKind::Artist => "artista",
            VertexKind::Genre => "genero",
            VertexKind::Unknown => "desconhecido",
        }
    }

    /// Lenient parse: unrecognised names map to `Unknown`
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse_strict(s).unwrap_or(VertexKind::Unknown)
    }

    /// Strict parse, used when reading persisted files
    pub fn parse_strict(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "musica" => Some(VertexKind::Song),
            "artista" => Some(VertexKind::Artist),
            "genero" => Some(VertexKind::Genre),
            "desconhecido" => Some(VertexKind::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for VertexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A song, artist, or genre node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub name: String,
    pub kind: VertexKind,
}

/// Neighbor entry returned by adjacency lookups
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: VertexId,
    pub weight: f64,
}

/// Unordered vertex pair identifying an edge (stored as `(min, max)`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(VertexId, VertexId);

impl EdgeKey {
    pub fn new(a: VertexId, b: VertexId) -> Self {
        if a <= b {
            EdgeKey(a, b)
        } else {
            EdgeKey(b, a)
        }
    }

    pub fn low(&self) -> VertexId {
        self.0
    }

    pub fn high(&self) -> VertexId {
        self.1
    }

    pub fn other(&self, id: VertexId) -> VertexId {
        if id == self.0 {
            self.1
        } else {
            self.0
        }
    }
}

/// Undirected weighted edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: VertexId,
    pub b: VertexId,
    pub weight: f64,
}

/// Outcome of a `connect` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// No edge existed between the pair
    Inserted,
    /// Edge existed; weight replaced (possibly with the same value)
    Updated,
}
