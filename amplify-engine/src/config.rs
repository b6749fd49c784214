//! Configuration resolution for amplify-engine
//!
//! Spotify credentials resolve with ENV → TOML priority. Missing credentials
//! are not fatal: the catalog client reports itself as unconfigured and the
//! rest of the engine keeps working.

use amplify_common::config::TomlConfig;
use std::time::Duration;
use tracing::{info, warn};

use crate::ingest::spotify_client::SpotifyCredentials;

pub const CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "SPOTIFY_CLIENT_SECRET";

/// Values shipped in the sample `.env` that must be replaced by the user
const PLACEHOLDERS: &[&str] = &["Inserir_Client_ID", "Inserir_Client_Secret"];

const DEFAULT_MARKET: &str = "US";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolve Spotify credentials from environment and TOML
///
/// Returns `None` when either half is missing after resolution.
pub fn resolve_spotify_credentials(toml_config: &TomlConfig) -> Option<SpotifyCredentials> {
    let client_id = resolve_value(
        "Spotify client id",
        std::env::var(CLIENT_ID_ENV).ok(),
        toml_config.spotify.client_id.clone(),
    );
    let client_secret = resolve_value(
        "Spotify client secret",
        std::env::var(CLIENT_SECRET_ENV).ok(),
        toml_config.spotify.client_secret.clone(),
    );

    match (client_id, client_secret) {
        (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
            client_id,
            client_secret,
        }),
        (None, None) => {
            warn!(
                "Spotify credentials not configured. Set {} and {} or add a [spotify] section to amplify.toml",
                CLIENT_ID_ENV, CLIENT_SECRET_ENV
            );
            None
        }
        _ => {
            warn!("Spotify credentials incomplete: both client id and client secret are required");
            None
        }
    }
}

/// Market used for top-track lookups
pub fn spotify_market(toml_config: &TomlConfig) -> String {
    toml_config
        .spotify
        .market
        .clone()
        .filter(|m| is_valid_key(m))
        .unwrap_or_else(|| DEFAULT_MARKET.to_string())
}

/// Whole-import timeout
pub fn catalog_timeout(toml_config: &TomlConfig) -> Duration {
    let secs = toml_config
        .spotify
        .timeout_secs
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

fn resolve_value(label: &str, env_value: Option<String>, toml_value: Option<String>) -> Option<String> {
    let env_value = env_value.filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in multiple sources: environment, TOML. Using environment (highest priority).",
            label
        );
    }

    if let Some(value) = env_value {
        info!("{} loaded from environment variable", label);
        return Some(value.trim().to_string());
    }

    if let Some(value) = toml_value {
        info!("{} loaded from TOML config", label);
        return Some(value.trim().to_string());
    }

    None
}

/// Validate credential (non-empty, non-whitespace, not a placeholder)
pub fn is_valid_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && !PLACEHOLDERS.contains(&key)
}
