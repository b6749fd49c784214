//! Ingestion Pipeline
//!
//! Fetch first, then mutate: catalog lookups run without holding the graph
//! lock, and the resulting batch is applied under a single write guard so
//! readers never see a song connected to only part of its artists/genres.
//! Every create/connect is idempotent, so re-importing known data adds
//! nothing.

pub mod catalog;
pub mod demo;
pub mod spotify_client;

use amplify_common::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::graph::{Graph, SharedGraph, VertexKind, DEFAULT_WEIGHT};
use catalog::{CatalogArtist, CatalogError, CatalogProvider, CatalogTrack, TrackResult};

/// One song with the names of its artists and genres
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRecord {
    pub title: String,
    pub artists: Vec<String>,
    pub genres: Vec<String>,
}

/// Everything one import writes to the graph
#[derive(Debug, Clone, Default)]
pub struct Batch {
    /// Vertices created even without songs (the imported artist, its genres)
    pub standalone: Vec<(String, VertexKind)>,
    pub songs: Vec<SongRecord>,
}

/// Vertices/edges actually added by a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub new_vertices: usize,
    pub new_edges: usize,
}

/// Result of `import_artist`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    /// Artist name as the catalog spells it
    pub artist: String,
    pub songs_imported: usize,
    pub songs_skipped: usize,
    pub new_vertices: usize,
    pub new_edges: usize,
    pub warnings: Vec<String>,
}

/// Result of `seed_demo`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoReport {
    pub songs: usize,
    pub artists: usize,
    pub genres: usize,
    pub new_vertices: usize,
    pub new_edges: usize,
    pub vertices: usize,
    pub edges: usize,
}

/// Apply a batch to the graph, connecting each song to its artists and genres
///
/// Blank artist/genre names are ignored. Artists and genres are never
/// connected to each other directly.
pub fn apply_batch(graph: &mut Graph, batch: &Batch) -> Result<MergeOutcome> {
    let vertices_before = graph.vertex_count();
    let edges_before = graph.edge_count();

    for (name, kind) in &batch.standalone {
        if !name.trim().is_empty() {
            graph.create_vertex(name, *kind)?;
        }
    }

    for song in &batch.songs {
        let song_id = graph.create_vertex(&song.title, VertexKind::Song)?;

        let related = song
            .artists
            .iter()
            .map(|name| (name, VertexKind::Artist))
            .chain(song.genres.iter().map(|name| (name, VertexKind::Genre)));

        for (name, kind) in related {
            if name.trim().is_empty() {
                continue;
            }
            let other = graph.create_vertex(name, kind)?;
            graph.connect(song_id, other, DEFAULT_WEIGHT)?;
        }
    }

    Ok(MergeOutcome {
        new_vertices: graph.vertex_count().saturating_sub(vertices_before),
        new_edges: graph.edge_count().saturating_sub(edges_before),
    })
}

/// Merges catalog data into a shared graph
pub struct IngestionPipeline {
    graph: SharedGraph,
    catalog: Arc<dyn CatalogProvider>,
    timeout: Duration,
}

impl IngestionPipeline {
    pub fn new(graph: SharedGraph, catalog: Arc<dyn CatalogProvider>, timeout: Duration) -> Self {
        Self {
            graph,
            catalog,
            timeout,
        }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogProvider> {
        &self.catalog
    }

    /// Run a catalog call under the pipeline timeout
    pub async fn with_timeout<T, F>(&self, call: F) -> Result<T>
    where
        F: std::future::Future<Output = std::result::Result<T, CatalogError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(Error::from),
            Err(_) => Err(CatalogError::Timeout(self.timeout).into()),
        }
    }

    /// Import an artist and its top tracks from the catalog
    pub async fn import_artist(&self, artist_name: &str) -> Result<ImportReport> {
        let query = artist_name.trim();
        if query.is_empty() {
            return Err(Error::invalid("artist name must not be empty"));
        }

        info!(
            provider = self.catalog.name(),
            query = %query,
            "Importing artist from catalog"
        );

        let (artist, tracks) = self.with_timeout(self.fetch(query)).await?;

        let (batch, warnings) = build_batch(&artist, tracks);
        let songs_imported = batch.songs.len();
        let songs_skipped = warnings.len();

        let outcome = {
            let mut graph = self.graph.write().await;
            apply_batch(&mut graph, &batch)?
        };

        info!(
            artist = %artist.name,
            songs_imported,
            songs_skipped,
            new_vertices = outcome.new_vertices,
            new_edges = outcome.new_edges,
            "Artist import complete"
        );

        Ok(ImportReport {
            artist: artist.name,
            songs_imported,
            songs_skipped,
            new_vertices: outcome.new_vertices,
            new_edges: outcome.new_edges,
            warnings,
        })
    }

    /// Merge the fixed demonstration catalog
    pub async fn seed_demo(&self) -> Result<DemoReport> {
        let batch = Batch {
            standalone: demo::DEMO_ARTISTS
                .iter()
                .map(|a| (a.to_string(), VertexKind::Artist))
                .chain(demo::DEMO_GENRES.iter().map(|g| (g.to_string(), VertexKind::Genre)))
                .collect(),
            songs: demo::demo_records(),
        };

        let mut graph = self.graph.write().await;
        let outcome = apply_batch(&mut graph, &batch)?;

        info!(
            new_vertices = outcome.new_vertices,
            new_edges = outcome.new_edges,
            "Demo catalog merged"
        );

        Ok(DemoReport {
            songs: demo::demo_song_count(),
            artists: demo::DEMO_ARTISTS.len(),
            genres: demo::DEMO_GENRES.len(),
            new_vertices: outcome.new_vertices,
            new_edges: outcome.new_edges,
            vertices: graph.vertex_count(),
            edges: graph.edge_count(),
        })
    }

    async fn fetch(
        &self,
        query: &str,
    ) -> std::result::Result<(CatalogArtist, Vec<TrackResult>), CatalogError> {
        let artist = self
            .catalog
            .search_artists(query, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::ArtistNotFound(query.to_string()))?;

        let tracks = self.catalog.top_tracks(&artist.id).await?;
        Ok((artist, tracks))
    }
}

/// Turn catalog results into a batch, collecting per-track warnings
fn build_batch(artist: &CatalogArtist, tracks: Vec<TrackResult>) -> (Batch, Vec<String>) {
    let mut batch = Batch {
        standalone: std::iter::once((artist.name.clone(), VertexKind::Artist))
            .chain(artist.genres.iter().map(|g| (g.clone(), VertexKind::Genre)))
            .collect(),
        songs: Vec::new(),
    };
    let mut warnings = Vec::new();

    for (index, track) in tracks.into_iter().enumerate() {
        match track {
            Ok(track) if !track.name.trim().is_empty() => {
                batch.songs.push(song_record(artist, track));
            }
            Ok(track) => {
                let message = format!("track #{} ({}) has no name; skipped", index + 1, track.id);
                warn!(artist = %artist.name, "{}", message);
                warnings.push(message);
            }
            Err(e) => {
                let message = format!("track #{} could not be resolved: {}", index + 1, e);
                warn!(artist = %artist.name, "{}", message);
                warnings.push(message);
            }
        }
    }

    (batch, warnings)
}

fn song_record(artist: &CatalogArtist, track: CatalogTrack) -> SongRecord {
    let mut artists: Vec<String> = track
        .artists
        .into_iter()
        .filter(|a| !a.trim().is_empty())
        .collect();
    if artists.is_empty() {
        artists.push(artist.name.clone());
    }

    SongRecord {
        title: track.name,
        artists,
        genres: artist.genres.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::catalog::StaticCatalog;

    fn pipeline(catalog: StaticCatalog) -> (SharedGraph, IngestionPipeline) {
        let graph = SharedGraph::default();
        let pipeline = IngestionPipeline::new(graph.clone(), Arc::new(catalog), Duration::from_secs(5));
        (graph, pipeline)
    }

    #[test]
    fn test_apply_batch_counts_and_idempotence() {
        let mut graph = Graph::new();
        let batch = Batch {
            standalone: vec![("Queen".into(), VertexKind::Artist)],
            songs: vec![SongRecord {
                title: "Bohemian Rhapsody".into(),
                artists: vec!["Queen".into()],
                genres: vec!["Rock".into(), " ".into()],
            }],
        };

        let first = apply_batch(&mut graph, &batch).unwrap();
        assert_eq!(first, MergeOutcome { new_vertices: 3, new_edges: 2 });

        let second = apply_batch(&mut graph, &batch).unwrap();
        assert_eq!(second, MergeOutcome::default());
    }

    #[test]
    fn test_artists_and_genres_not_linked() {
        let mut graph = Graph::new();
        let batch = Batch {
            standalone: vec![],
            songs: vec![SongRecord {
                title: "Song".into(),
                artists: vec!["A".into()],
                genres: vec!["G".into()],
            }],
        };
        apply_batch(&mut graph, &batch).unwrap();

        let a = graph.find("A", VertexKind::Artist).unwrap();
        let g = graph.find("G", VertexKind::Genre).unwrap();
        assert_eq!(graph.edge_weight(a, g), None);
    }

    #[tokio::test]
    async fn test_import_artist() {
        let catalog = StaticCatalog::new().with_artist(
            "Queen",
            &["Rock", "Glam Rock"],
            &[("Bohemian Rhapsody", &[]), ("Under Pressure", &["David Bowie"])],
        );
        let (graph, pipeline) = pipeline(catalog);

        let report = pipeline.import_artist("queen").await.unwrap();
        assert_eq!(report.artist, "Queen");
        assert_eq!(report.songs_imported, 2);
        assert_eq!(report.songs_skipped, 0);
        // Queen, Rock, Glam Rock, 2 songs, David Bowie
        assert_eq!(report.new_vertices, 6);
        // 2 songs x (artists + 2 genres): 3 + 4
        assert_eq!(report.new_edges, 7);

        let g = graph.read().await;
        let pressure = g.find("Under Pressure", VertexKind::Song).unwrap();
        assert_eq!(g.degree(pressure), 4);
    }

    #[tokio::test]
    async fn test_reimport_adds_nothing() {
        let catalog = StaticCatalog::new().with_artist("Queen", &["Rock"], &[("We Will Rock You", &[])]);
        let (_, pipeline) = pipeline(catalog);

        pipeline.import_artist("Queen").await.unwrap();
        let again = pipeline.import_artist("Queen").await.unwrap();
        assert_eq!(again.new_vertices, 0);
        assert_eq!(again.new_edges, 0);
    }

    #[tokio::test]
    async fn test_broken_tracks_are_skipped() {
        let catalog = StaticCatalog::new()
            .with_artist("Queen", &["Rock"], &[("Good Song", &[]), ("  ", &[])])
            .with_broken_track("malformed payload");
        let (graph, pipeline) = pipeline(catalog);

        let report = pipeline.import_artist("Queen").await.unwrap();
        assert_eq!(report.songs_imported, 1);
        assert_eq!(report.songs_skipped, 2);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(graph.read().await.count_by_kind(VertexKind::Song), 1);
    }

    #[tokio::test]
    async fn test_unknown_artist_is_not_found() {
        let (graph, pipeline) = pipeline(StaticCatalog::new());
        let result = pipeline.import_artist("Nobody").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(graph.read().await.vertex_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_artist_rejected() {
        let (_, pipeline) = pipeline(StaticCatalog::new());
        assert!(matches!(pipeline.import_artist("  ").await, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_seed_demo_idempotent() {
        let (graph, pipeline) = pipeline(StaticCatalog::new());

        let first = pipeline.seed_demo().await.unwrap();
        assert_eq!(first.songs, 14);
        assert_eq!(first.artists, 7);
        assert_eq!(first.genres, 5);
        assert_eq!(first.new_vertices, 26);
        assert_eq!(first.vertices, 26);

        let second = pipeline.seed_demo().await.unwrap();
        assert_eq!(second.new_vertices, 0);
        assert_eq!(second.new_edges, 0);
        assert_eq!(second.vertices, first.vertices);
        assert_eq!(second.edges, first.edges);
        assert_eq!(graph.read().await.edge_count(), first.edges);
    }
}
