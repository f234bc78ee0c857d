//! Herdwatch HTTP Server Binary
//!
//! Loads the configuration, resolves the time index, and serves the map
//! pipeline to the browser front-end.
//!
//! # Usage
//!
//! ```bash
//! # Serve a published data tree from disk
//! HERDWATCH_DATA_ROOT=./data cargo run --bin herdwatch-server
//!
//! # Serve from a static host, latest folder only
//! HERDWATCH_DATA_ROOT=https://example.org/herdwatch/data HERDWATCH_MODE=latest \
//!   cargo run --bin herdwatch-server
//! ```
//!
//! # Environment Variables
//!
//! - `HERDWATCH_SOURCE`, `HERDWATCH_DATA_ROOT`, `HERDWATCH_MODE`,
//!   `HERDWATCH_TEMPORAL`, `HERDWATCH_FADE`, `HERDWATCH_TIMEOUT_SECS`:
//!   override `herdwatch.toml`
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use herdwatch::http::{create_router, AppState};
use herdwatch::services::{MapController, SceneMap};
use herdwatch::source::{PipelineConfig, SourceFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Herdwatch HTTP Server");

    let config = PipelineConfig::load()?;
    let source = SourceFactory::create(&config.source)?;
    if !source.source_type().is_externally_published() {
        anyhow::bail!(
            "{:?} source cannot receive published layers; use an http or local source",
            source.source_type()
        );
    }
    info!(
        "Reading layers from {} ({:?} mode)",
        source.locate(""),
        config.pipeline.mode
    );

    let controller = MapController::from_config(&config, source, SceneMap::new());
    match controller.initialize().await {
        Ok(Some(navigation)) => info!(
            "Time index ready: {} key(s), active {}",
            navigation.keys.len(),
            navigation.active
        ),
        Ok(None) => info!("Temporal navigation disabled, serving the latest folder"),
        // The index may be published later; /v1/dates reports it until then.
        Err(e) => warn!("{}", e),
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(Arc::new(controller), Arc::new(config));
    let app = create_router(state);

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
