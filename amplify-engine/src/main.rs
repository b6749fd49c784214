//! amplify-engine - HTTP server for the Amplify dashboard
//!
//! Configuration priority: command line → environment → amplify.toml →
//! compiled defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use amplify_common::config::{self as common_config, TomlConfig};
use amplify_engine::config::{catalog_timeout, resolve_spotify_credentials, spotify_market};
use amplify_engine::graph::SharedGraph;
use amplify_engine::ingest::spotify_client::SpotifyClient;
use amplify_engine::{build_router, AppState, GraphService};

/// Command-line arguments for amplify-engine
#[derive(Parser, Debug)]
#[command(name = "amplify-engine")]
#[command(about = "Graph-based music similarity and recommendation engine")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "AMPLIFY_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "AMPLIFY_BIND_ADDRESS")]
    bind: Option<String>,

    /// Path to amplify.toml
    #[arg(short, long, env = "AMPLIFY_CONFIG")]
    config: Option<PathBuf>,

    /// Folder for persisted graph files
    #[arg(short, long)]
    data_folder: Option<PathBuf>,

    /// Graph file used by save/load when no path is given
    #[arg(short, long, env = "AMPLIFY_GRAPH_FILE")]
    graph_file: Option<String>,

    /// Skip restoring the graph file at startup
    #[arg(long)]
    no_load: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(common_config::default_config_path);
    let toml_config = common_config::load_toml_config(&config_path)
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{},tower_http=debug", toml_config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Amplify engine (amplify-engine) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if !config_path.exists() {
        warn!("No config file at {}, using defaults", config_path.display());
    }

    let data_folder = common_config::resolve_data_folder(args.data_folder.as_deref(), &toml_config);
    common_config::ensure_directory_exists(&data_folder)
        .context("Failed to create data folder")?;
    info!("Data folder: {}", data_folder.display());

    let graph_file = args.graph_file.clone().unwrap_or_else(|| toml_config.graph_file());

    let credentials = resolve_spotify_credentials(&toml_config);
    let timeout = catalog_timeout(&toml_config);
    let catalog = SpotifyClient::new(credentials, spotify_market(&toml_config), timeout)
        .context("Failed to initialize Spotify client")?;

    let service = GraphService::new(
        SharedGraph::default(),
        Arc::new(catalog),
        timeout,
        data_folder,
        graph_file,
    );

    if toml_config.load_on_startup() && !args.no_load {
        restore_on_startup(&service).await;
    }

    let app = build_router(AppState::new(service))
        .layer(cors_layer(&toml_config))
        .layer(TraceLayer::new_for_http());

    let bind = args.bind.unwrap_or_else(|| toml_config.bind_address());
    let port = args.port.unwrap_or_else(|| toml_config.port());
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("amplify-engine listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Restore the default graph file if present; failures leave an empty graph
async fn restore_on_startup(service: &GraphService) {
    let path = match service.resolve_path(None) {
        Ok(path) => path,
        Err(e) => {
            warn!("Invalid graph file setting: {}", e);
            return;
        }
    };
    if !path.exists() {
        info!("No saved graph at {}, starting empty", path.display());
        return;
    }
    match service.load(None).await {
        Ok(outcome) => info!(
            "✓ Restored graph from {} ({} vertices, {} edges)",
            outcome.path.display(),
            outcome.vertices,
            outcome.edges
        ),
        Err(e) => warn!("Could not restore {}: {}", path.display(), e),
    }
}

fn cors_layer(config: &TomlConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
