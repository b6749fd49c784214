//! Service Facade
//!
//! Request/response operations over the shared graph. Handlers in `api`
//! translate these results to JSON; nothing here knows about HTTP.

use amplify_common::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::graph::{ConnectOutcome, Graph, SharedGraph, Vertex, VertexId, VertexKind, DEFAULT_WEIGHT};
use crate::ingest::catalog::{CatalogArtist, CatalogProvider, CatalogStatus, CatalogTrack};
use crate::ingest::{DemoReport, ImportReport, IngestionPipeline};
use crate::persistence;
use crate::similarity;
use crate::stats::{self, GraphStats};

/// A song with its artists and genres, each ordered by id
#[derive(Debug, Clone, PartialEq)]
pub struct SongSummary {
    pub song: Vertex,
    pub artists: Vec<Vertex>,
    pub genres: Vec<Vertex>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedSong {
    pub summary: SongSummary,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationSet {
    pub base: SongSummary,
    pub items: Vec<RankedSong>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub vertex: Vertex,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VertexDetail {
    pub vertex: Vertex,
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeOutcome {
    pub a: Vertex,
    pub b: Vertex,
    pub weight: f64,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersistOutcome {
    pub path: PathBuf,
    pub vertices: usize,
    pub edges: usize,
}

/// Optional `/api/musicas` filters; matching is case-insensitive and exact
#[derive(Debug, Clone, Default)]
pub struct SongFilter {
    pub genre: Option<String>,
    pub artist: Option<String>,
}

impl SongFilter {
    fn matches(&self, summary: &SongSummary) -> bool {
        fn any_named(vertices: &[Vertex], wanted: &Option<String>) -> bool {
            match wanted.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
                None => true,
                Some(wanted) => vertices.iter().any(|v| v.name.to_lowercase() == wanted.to_lowercase()),
            }
        }
        any_named(&summary.genres, &self.genre) && any_named(&summary.artists, &self.artist)
    }
}

/// Facade shared by every request handler
pub struct GraphService {
    graph: SharedGraph,
    pipeline: IngestionPipeline,
    data_folder: PathBuf,
    default_file: String,
}

impl GraphService {
    pub fn new(
        graph: SharedGraph,
        catalog: Arc<dyn CatalogProvider>,
        catalog_timeout: Duration,
        data_folder: PathBuf,
        default_file: impl Into<String>,
    ) -> Self {
        let pipeline = IngestionPipeline::new(graph.clone(), catalog, catalog_timeout);
        Self {
            graph,
            pipeline,
            data_folder,
            default_file: default_file.into(),
        }
    }

    pub fn graph(&self) -> &SharedGraph {
        &self.graph
    }

    pub fn data_folder(&self) -> &std::path::Path {
        &self.data_folder
    }

    pub async fn stats(&self) -> GraphStats {
        stats::snapshot(&*self.graph.read().await)
    }

    pub async fn list_vertices(&self, kind: Option<VertexKind>) -> Vec<Vertex> {
        let graph = self.graph.read().await;
        match kind {
            Some(kind) => graph.vertices_by_kind(kind).into_iter().cloned().collect(),
            None => graph.vertices().cloned().collect(),
        }
    }

    /// Create (or find) a vertex; the flag is true when it was newly created
    pub async fn create_vertex(&self, name: &str, kind: VertexKind) -> Result<(Vertex, bool)> {
        let mut graph = self.graph.write().await;
        let (id, created) = graph.ensure_vertex(name, kind)?;
        Ok((graph.vertex(id)?.clone(), created))
    }

    pub async fn vertex_detail(&self, id: VertexId) -> Result<VertexDetail> {
        let graph = self.graph.read().await;
        let vertex = graph.vertex(id)?.clone();
        let connections = graph
            .neighbors(id)?
            .into_iter()
            .map(|n| {
                Ok(Connection {
                    vertex: graph.vertex(n.id)?.clone(),
                    weight: n.weight,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(VertexDetail { vertex, connections })
    }

    pub async fn remove_vertex(&self, id: VertexId) -> Result<Vertex> {
        let removed = self.graph.write().await.remove_vertex(id)?;
        info!(id, name = %removed.name, "Vertex removed");
        Ok(removed)
    }

    /// Connect two vertices identified by name (first-created match per name)
    pub async fn connect_by_names(&self, a: &str, b: &str, weight: Option<f64>) -> Result<EdgeOutcome> {
        let weight = weight.unwrap_or(DEFAULT_WEIGHT);
        let mut graph = self.graph.write().await;

        let a_id = resolve_name(&graph, a)?;
        let b_id = resolve_name(&graph, b)?;
        let outcome = graph.connect(a_id, b_id, weight)?;

        Ok(EdgeOutcome {
            a: graph.vertex(a_id)?.clone(),
            b: graph.vertex(b_id)?.clone(),
            weight,
            created: outcome == ConnectOutcome::Inserted,
        })
    }

    pub async fn disconnect(&self, a: VertexId, b: VertexId) -> Result<()> {
        if self.graph.write().await.disconnect(a, b)? {
            Ok(())
        } else {
            Err(Error::not_found("edge", format!("{}-{}", a, b)))
        }
    }

    pub async fn songs(&self, filter: &SongFilter) -> Vec<SongSummary> {
        let graph = self.graph.read().await;
        graph
            .vertices_by_kind(VertexKind::Song)
            .into_iter()
            .map(|song| summarize(&graph, song))
            .filter(|summary| filter.matches(summary))
            .collect()
    }

    pub async fn song_detail(&self, id: VertexId) -> Result<SongSummary> {
        let graph = self.graph.read().await;
        let vertex = graph.vertex(id)?;
        if vertex.kind != VertexKind::Song {
            return Err(Error::invalid(format!("vertex {} is a {}, not a song", id, vertex.kind)));
        }
        Ok(summarize(&graph, vertex))
    }

    /// Recommend songs similar to the song with exactly this name
    pub async fn recommend(&self, song_name: &str, limit: usize) -> Result<RecommendationSet> {
        let graph = self.graph.read().await;
        let song_id = graph
            .find_exact(song_name, VertexKind::Song)
            .ok_or_else(|| Error::not_found("song", song_name))?;

        let items = similarity::recommend(&graph, song_id, limit)?
            .into_iter()
            .map(|r| RankedSong {
                summary: summarize(&graph, &r.vertex),
                score: r.score,
            })
            .collect();

        Ok(RecommendationSet {
            base: summarize(&graph, graph.vertex(song_id)?),
            items,
        })
    }

    pub async fn import_artist(&self, artist_name: &str) -> Result<ImportReport> {
        self.pipeline.import_artist(artist_name).await
    }

    pub async fn seed_demo(&self) -> Result<DemoReport> {
        self.pipeline.seed_demo().await
    }

    pub async fn catalog_status(&self) -> CatalogStatus {
        self.pipeline.catalog().status().await
    }

    pub async fn search_artists(&self, query: &str, limit: usize) -> Result<Vec<CatalogArtist>> {
        if query.trim().is_empty() {
            return Err(Error::invalid("artist name must not be empty"));
        }
        let catalog = self.pipeline.catalog();
        self.pipeline.with_timeout(catalog.search_artists(query.trim(), limit)).await
    }

    /// Top tracks of a catalog artist; tracks that fail to resolve are dropped
    pub async fn top_tracks(&self, artist_id: &str) -> Result<Vec<CatalogTrack>> {
        let catalog = self.pipeline.catalog();
        let results = self.pipeline.with_timeout(catalog.top_tracks(artist_id)).await?;
        Ok(results.into_iter().filter_map(|r| r.ok()).collect())
    }

    /// Path inside the data folder; `None` means the configured default file
    pub fn resolve_path(&self, requested: Option<&str>) -> Result<PathBuf> {
        let requested = requested
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(self.default_file.as_str());
        persistence::resolve_in_folder(&self.data_folder, requested)
    }

    /// Persist the current graph
    pub async fn save(&self, requested: Option<&str>) -> Result<PersistOutcome> {
        let path = self.resolve_path(requested)?;

        let (text, vertices, edges) = {
            let graph = self.graph.read().await;
            (persistence::encode(&graph), graph.vertex_count(), graph.edge_count())
        };
        persistence::save_to(&text, &path).await?;

        info!(path = %path.display(), vertices, edges, "Graph saved");
        Ok(PersistOutcome { path, vertices, edges })
    }

    /// Replace the live graph with a persisted one
    ///
    /// The file is parsed and validated before the swap; on any failure the
    /// live graph is untouched.
    pub async fn load(&self, requested: Option<&str>) -> Result<PersistOutcome> {
        let path = self.resolve_path(requested)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(Error::Storage(format!("graph file not found: {}", path.display())));
        }

        let loaded = persistence::load_from(&path).await?;
        let vertices = loaded.vertex_count();
        let edges = loaded.edge_count();
        self.graph.replace(loaded).await;

        info!(path = %path.display(), vertices, edges, "Graph loaded");
        Ok(PersistOutcome { path, vertices, edges })
    }
}

fn resolve_name(graph: &Graph, name: &str) -> Result<VertexId> {
    graph
        .find_by_name(name)
        .ok_or_else(|| Error::not_found("vertex", name.trim()))
}

fn summarize(graph: &Graph, song: &Vertex) -> SongSummary {
    let mut artists = Vec::new();
    let mut genres = Vec::new();
    for id in graph.neighbor_ids(song.id) {
        if let Ok(v) = graph.vertex(id) {
            match v.kind {
                VertexKind::Artist => artists.push(v.clone()),
                VertexKind::Genre => genres.push(v.clone()),
                _ => {}
            }
        }
    }
    SongSummary {
        song: song.clone(),
        artists,
        genres,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::catalog::StaticCatalog;

    fn service(folder: PathBuf) -> GraphService {
        GraphService::new(
            SharedGraph::default(),
            Arc::new(StaticCatalog::new()),
            Duration::from_secs(5),
            folder,
            "Grafo.txt",
        )
    }

    #[tokio::test]
    async fn test_songs_filter_case_insensitive() {
        let svc = service(PathBuf::from("."));
        svc.seed_demo().await.unwrap();

        let queen = svc
            .songs(&SongFilter {
                artist: Some("queen".into()),
                ..Default::default()
            })
            .await;
        assert_eq!(queen.len(), 2);

        let alt_rock = svc
            .songs(&SongFilter {
                genre: Some("ALTERNATIVE".into()),
                artist: Some("Arctic Monkeys".into()),
            })
            .await;
        assert_eq!(alt_rock.len(), 2);

        let partial = svc
            .songs(&SongFilter {
                genre: Some("Roc".into()),
                ..Default::default()
            })
            .await;
        assert!(partial.is_empty());
    }

    #[tokio::test]
    async fn test_recommend_unknown_song() {
        let svc = service(PathBuf::from("."));
        let err = svc.recommend("Nope", 5).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recommend_requires_exact_name() {
        let svc = service(PathBuf::from("."));
        svc.seed_demo().await.unwrap();

        assert!(matches!(svc.recommend(" Hey Jude", 5).await, Err(Error::NotFound(_))));
        assert!(matches!(svc.recommend("hey jude", 5).await, Err(Error::NotFound(_))));
        assert!(svc.recommend("Hey Jude", 5).await.is_ok());
    }

    #[tokio::test]
    async fn test_recommend_demo() {
        let svc = service(PathBuf::from("."));
        svc.seed_demo().await.unwrap();

        let set = svc.recommend("Hey Jude", 3).await.unwrap();
        assert_eq!(set.base.song.name, "Hey Jude");
        assert_eq!(set.items[0].summary.song.name, "Let It Be");
        assert_eq!(set.items[0].score, 1.0);
        assert!(set.items.len() <= 3);
    }

    #[tokio::test]
    async fn test_connect_by_names() {
        let svc = service(PathBuf::from("."));
        svc.create_vertex("A", VertexKind::Song).await.unwrap();
        svc.create_vertex("B", VertexKind::Genre).await.unwrap();

        let first = svc.connect_by_names("A", "B", None).await.unwrap();
        assert!(first.created);
        assert_eq!(first.weight, 1.0);

        let second = svc.connect_by_names("A", "B", Some(2.5)).await.unwrap();
        assert!(!second.created);
        assert_eq!(svc.stats().await.edges, 1);

        assert!(matches!(
            svc.connect_by_names("A", "missing", None).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_disconnect_missing_edge() {
        let svc = service(PathBuf::from("."));
        let (a, _) = svc.create_vertex("A", VertexKind::Song).await.unwrap();
        let (b, _) = svc.create_vertex("B", VertexKind::Artist).await.unwrap();
        assert!(matches!(svc.disconnect(a.id, b.id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_song_detail_rejects_non_song() {
        let svc = service(PathBuf::from("."));
        let (artist, _) = svc.create_vertex("Queen", VertexKind::Artist).await.unwrap();
        assert!(matches!(
            svc.song_detail(artist.id).await,
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_resolve_path_default() {
        let svc = service(PathBuf::from("/data"));
        assert_eq!(svc.resolve_path(None).unwrap(), PathBuf::from("/data/Grafo.txt"));
        assert_eq!(svc.resolve_path(Some(" ")).unwrap(), PathBuf::from("/data/Grafo.txt"));
        assert!(svc.resolve_path(Some("../x")).is_err());
    }
}
