//! External catalog collaborator contract

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use amplify_common::Error;

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Artist not found: {0}")]
    ArtistNotFound(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Catalog request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ArtistNotFound(name) => Error::not_found("artist", name),
            other => Error::UpstreamUnavailable(other.to_string()),
        }
    }
}

/// Artist metadata as reported by the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogArtist {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
    pub popularity: u32,
    pub image_url: Option<String>,
}

/// Track metadata as reported by the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogTrack {
    pub id: String,
    pub name: String,
    pub album: Option<String>,
    pub artists: Vec<String>,
    pub duration_ms: u64,
    pub popularity: u32,
    pub preview_url: Option<String>,
}

/// Reachability/configuration of the collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStatus {
    pub configured: bool,
    pub connected: bool,
    pub message: String,
}

/// Per-track lookup result; individual failures do not fail the batch
pub type TrackResult = Result<CatalogTrack, CatalogError>;

/// Source of artist and track metadata for ingestion
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Provider identifier (e.g., "spotify")
    fn name(&self) -> &'static str;

    /// Report configuration and reachability
    async fn status(&self) -> CatalogStatus;

    /// Search artists by name, best match first
    async fn search_artists(&self, query: &str, limit: usize)
        -> Result<Vec<CatalogArtist>, CatalogError>;

    /// Top tracks of an artist, one result per track
    async fn top_tracks(&self, artist_id: &str) -> Result<Vec<TrackResult>, CatalogError>;
}

/// In-memory catalog, used offline and in tests
#[derive(Debug, Default)]
pub struct StaticCatalog {
    artists: Vec<CatalogArtist>,
    tracks: HashMap<String, Vec<TrackEntry>>,
}

#[derive(Debug, Clone)]
enum TrackEntry {
    Ok(CatalogTrack),
    Broken(String),
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artist with its tracks; each track is `(title, featured artists)`
    pub fn with_artist(mut self, name: &str, genres: &[&str], tracks: &[(&str, &[&str])]) -> Self {
        let id = format!("static-{}", self.artists.len());
        self.artists.push(CatalogArtist {
            id: id.clone(),
            name: name.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            popularity: 50,
            image_url: None,
        });

        let entries = tracks
            .iter()
            .enumerate()
            .map(|(i, (title, featured))| {
                let mut artists = vec![name.to_string()];
                artists.extend(featured.iter().map(|a| a.to_string()));
                TrackEntry::Ok(CatalogTrack {
                    id: format!("{}-t{}", id, i),
                    name: title.to_string(),
                    album: None,
                    artists,
                    duration_ms: 180_000,
                    popularity: 50,
                    preview_url: None,
                })
            })
            .collect();
        self.tracks.insert(id, entries);
        self
    }

    /// Append a track that fails to resolve for the most recently added artist
    pub fn with_broken_track(mut self, reason: &str) -> Self {
        if let Some(artist) = self.artists.last() {
            self.tracks
                .entry(artist.id.clone())
                .or_default()
                .push(TrackEntry::Broken(reason.to_string()));
        }
        self
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn status(&self) -> CatalogStatus {
        CatalogStatus {
            configured: true,
            connected: true,
            message: format!("Static catalog with {} artists", self.artists.len()),
        }
    }

    async fn search_artists(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CatalogArtist>, CatalogError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .artists
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn top_tracks(&self, artist_id: &str) -> Result<Vec<TrackResult>, CatalogError> {
        let entries = self
            .tracks
            .get(artist_id)
            .ok_or_else(|| CatalogError::ArtistNotFound(artist_id.to_string()))?;

        Ok(entries
            .iter()
            .map(|entry| match entry {
                TrackEntry::Ok(track) => Ok(track.clone()),
                TrackEntry::Broken(reason) => Err(CatalogError::Parse(reason.clone())),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_search_is_case_insensitive() {
        let catalog = StaticCatalog::new()
            .with_artist("Queen", &["Rock"], &[("Bohemian Rhapsody", &[])])
            .with_artist("Queens of the Stone Age", &["Stoner Rock"], &[]);

        let hits = catalog.search_artists("queen", 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "Queen");

        let limited = catalog.search_artists("queen", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_static_broken_track() {
        let catalog = StaticCatalog::new()
            .with_artist("Queen", &["Rock"], &[("We Will Rock You", &[])])
            .with_broken_track("missing name");

        let artist = &catalog.search_artists("Queen", 1).await.unwrap()[0];
        let tracks = catalog.top_tracks(&artist.id).await.unwrap();
        assert_eq!(tracks.len(), 2);
        assert!(tracks[0].is_ok());
        assert!(tracks[1].is_err());
    }

    #[test]
    fn test_error_mapping() {
        let not_found: Error = CatalogError::ArtistNotFound("X".into()).into();
        assert!(matches!(not_found, Error::NotFound(_)));

        let timeout: Error = CatalogError::Timeout(Duration::from_secs(30)).into();
        assert!(matches!(timeout, Error::UpstreamUnavailable(_)));
    }
}
