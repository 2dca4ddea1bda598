//! Forge API server - HTTP facade over the prompt-to-project pipeline.

mod routes;
mod state;

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use forge::client::HttpChatClient;
use forge::config::load_config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::state::AppState;

/// How often the background task sweeps expired registry entries.
const REGISTRY_PRUNE_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Parser)]
#[command(name = "forge-api")]
#[command(about = "Generate runnable projects from natural-language prompts")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Directory holding one subdirectory per generated job
    #[arg(long, default_value = "jobs")]
    jobs_root: PathBuf,

    /// Path to the TOML config file (defaults apply if missing)
    #[arg(long, default_value = "forge.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    forge::logging::init();

    let args = Args::parse();
    let config = load_config(&args.config)?;
    let client = Arc::new(HttpChatClient::from_config(&config)?);

    fs::create_dir_all(&args.jobs_root)?;
    let jobs_root = args.jobs_root.canonicalize().unwrap_or(args.jobs_root);
    info!(jobs_root = %jobs_root.display(), model = %config.model, "starting forge-api");

    let state = AppState::new(jobs_root.clone(), config, client);

    // Sweep expired registry entries in the background; the registry also
    // prunes lazily on insert.
    let registry = state.registry.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(REGISTRY_PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            registry.prune_expired();
        }
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::api_router()
        .nest_service("/jobs", ServeDir::new(&jobs_root))
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
