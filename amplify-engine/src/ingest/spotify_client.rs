//! Spotify Web API client
//!
//! Client-credentials OAuth flow with a cached bearer token, rate limiting
//! between requests, and per-track parsing so one malformed track does not
//! fail the whole top-tracks lookup.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::catalog::{
    CatalogArtist, CatalogError, CatalogProvider, CatalogStatus, CatalogTrack, TrackResult,
};

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/api/token";
const USER_AGENT: &str = concat!("Amplify/", env!("CARGO_PKG_VERSION"));
const RATE_LIMIT_MS: u64 = 100;
/// Refresh tokens this long before Spotify says they expire
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Client credentials for the Spotify accounts service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    artists: ArtistPage,
}

#[derive(Debug, Deserialize)]
struct ArtistPage {
    #[serde(default)]
    items: Vec<SpotifyArtist>,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    id: String,
    name: String,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    popularity: u32,
    #[serde(default)]
    images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
struct SpotifyImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    id: String,
    name: String,
    #[serde(default)]
    album: Option<SpotifyAlbum>,
    #[serde(default)]
    artists: Vec<SpotifyArtistRef>,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    popularity: u32,
    #[serde(default)]
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpotifyAlbum {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtistRef {
    name: String,
}

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Spotify catalog client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    credentials: Option<SpotifyCredentials>,
    market: String,
    api_base: String,
    auth_url: String,
    token: Mutex<Option<CachedToken>>,
    rate_limiter: Arc<RateLimiter>,
}

impl SpotifyClient {
    /// Build a client; `credentials = None` yields an unconfigured client
    /// whose lookups fail with `CatalogError::NotConfigured`.
    pub fn new(
        credentials: Option<SpotifyCredentials>,
        market: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            credentials,
            market: market.into(),
            api_base: SPOTIFY_API_BASE.to_string(),
            auth_url: SPOTIFY_AUTH_URL.to_string(),
            token: Mutex::new(None),
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
        })
    }

    /// Point the client at alternative endpoints (self-hosted mirrors, stubs)
    pub fn with_endpoints(mut self, api_base: impl Into<String>, auth_url: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.auth_url = auth_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Return a valid bearer token, requesting a new one when expired
    async fn access_token(&self) -> Result<String, CatalogError> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            CatalogError::NotConfigured(
                "Spotify credentials missing; set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET"
                    .to_string(),
            )
        })?;

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        tracing::debug!(url = %self.auth_url, "Requesting Spotify access token");
        let response = self
            .http_client
            .post(&self.auth_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        tracing::info!(expires_in = token.expires_in, "Obtained Spotify access token");

        Ok(token.access_token)
    }

    /// Authenticated, rate-limited GET returning the JSON body
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, CatalogError> {
        let token = self.access_token().await?;
        self.rate_limiter.wait().await;

        tracing::debug!(url = %url, "Querying Spotify API");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Force a fresh token on the next call
            *self.token.lock().await = None;
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::ArtistNotFound(url.to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CatalogProvider for SpotifyClient {
    fn name(&self) -> &'static str {
        "spotify"
    }

    async fn status(&self) -> CatalogStatus {
        if !self.is_configured() {
            return CatalogStatus {
                configured: false,
                connected: false,
                message: "Spotify não configurado. Defina SPOTIFY_CLIENT_ID e SPOTIFY_CLIENT_SECRET."
                    .to_string(),
            };
        }

        match self.access_token().await {
            Ok(_) => CatalogStatus {
                configured: true,
                connected: true,
                message: "Spotify configurado e conectado".to_string(),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Spotify credentials configured but token request failed");
                CatalogStatus {
                    configured: true,
                    connected: false,
                    message: format!("Falha ao conectar ao Spotify: {}", e),
                }
            }
        }
    }

    async fn search_artists(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CatalogArtist>, CatalogError> {
        let url = format!("{}/search", self.api_base);
        let body = self
            .get_json(
                &url,
                &[
                    ("q", format!("artist:{}", query)),
                    ("type", "artist".to_string()),
                    ("limit", limit.clamp(1, 50).to_string()),
                ],
            )
            .await?;

        let artists = parse_search_response(body)?;
        tracing::info!(query = %query, hits = artists.len(), "Spotify artist search");
        Ok(artists)
    }

    async fn top_tracks(&self, artist_id: &str) -> Result<Vec<TrackResult>, CatalogError> {
        let url = format!("{}/artists/{}/top-tracks", self.api_base, artist_id);
        let body = self
            .get_json(&url, &[("market", self.market.clone())])
            .await
            .map_err(|e| match e {
                CatalogError::ArtistNotFound(_) => CatalogError::ArtistNotFound(artist_id.to_string()),
                other => other,
            })?;

        parse_top_tracks(body)
    }
}

fn parse_search_response(body: Value) -> Result<Vec<CatalogArtist>, CatalogError> {
    let response: SearchResponse =
        serde_json::from_value(body).map_err(|e| CatalogError::Parse(e.to_string()))?;

    Ok(response
        .artists
        .items
        .into_iter()
        .map(|a| CatalogArtist {
            id: a.id,
            name: a.name,
            genres: a.genres,
            popularity: a.popularity,
            image_url: a.images.into_iter().next().map(|i| i.url),
        })
        .collect())
}

fn parse_top_tracks(body: Value) -> Result<Vec<TrackResult>, CatalogError> {
    let items = match body {
        Value::Object(mut map) => match map.remove("tracks") {
            Some(Value::Array(items)) => items,
            _ => return Err(CatalogError::Parse("response has no 'tracks' array".to_string())),
        },
        _ => return Err(CatalogError::Parse("response is not an object".to_string())),
    };

    Ok(items.into_iter().map(parse_track).collect())
}

fn parse_track(item: Value) -> TrackResult {
    let track: SpotifyTrack =
        serde_json::from_value(item).map_err(|e| CatalogError::Parse(e.to_string()))?;

    Ok(CatalogTrack {
        id: track.id,
        name: track.name,
        album: track.album.map(|a| a.name),
        artists: track.artists.into_iter().map(|a| a.name).collect(),
        duration_ms: track.duration_ms,
        popularity: track.popularity,
        preview_url: track.preview_url,
    })
}
