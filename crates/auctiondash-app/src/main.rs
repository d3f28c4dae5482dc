// Dashboard entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file)
// 2. Load config
// 3. Load the auction CSV and compute the base charts
// 4. Spawn the application loop
// 5. Spawn the WebSocket server
// 6. Spawn the page server
// 7. Wait for Ctrl+C, then shut down

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use auctiondash_app::{app, logging, page_server, ws_server};
use auctiondash_core::config;
use auctiondash_core::dashboard::Dashboard;
use auctiondash_core::dataset::Dataset;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    let log_dir = std::env::current_dir()?.join("logs");
    logging::init_tracing(&log_dir)?;
    info!("Auction dashboard starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    let ip = config.server.ip().context("server.host is not an IP address")?;
    info!(
        "Config loaded: data={}, http port {}, ws port {}",
        config.data.players_csv, config.server.http_port, config.server.ws_port
    );

    // 3. Load the dataset; any bad row aborts startup
    let dataset = Dataset::load(Path::new(&config.data.players_csv))
        .with_context(|| format!("failed to load {}", config.data.players_csv))?;
    info!("Loaded {} sold players", dataset.len());
    let dashboard = Dashboard::new(dataset);

    // 4. Spawn the application loop
    let (ws_tx, ws_rx) = mpsc::channel(64);
    let state = app::AppState::new(dashboard, config.dashboard.title.clone());
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(ws_rx, state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 5. Spawn the WebSocket server
    let ws_addr = SocketAddr::new(ip, config.server.ws_port);
    let listener = ws_server::TungsteniteListener::bind(ws_addr)
        .await
        .with_context(|| format!("failed to bind WebSocket server on {ws_addr}"))?;
    info!("WebSocket server listening on {}", listener.local_addr()?);
    let ws_handle = tokio::spawn(async move {
        if let Err(e) = ws_server::run(listener, ws_tx).await {
            error!("WebSocket server error: {}", e);
        }
    });

    // 6. Spawn the page server
    let page = page_server::render_index(&config.dashboard.title, config.server.ws_port);
    let (http_addr, server) = page_server::bind(SocketAddr::new(ip, config.server.http_port), page)
        .context("failed to bind page server")?;
    let http_handle = tokio::spawn(server);
    info!("Dashboard ready at http://{http_addr}/");
    println!("Dashboard running at http://{http_addr}/ (Ctrl+C to stop)");

    // 7. Run until interrupted
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("Shutdown requested");

    http_handle.abort();
    // Aborting the server drops its sender, which lets the app loop drain and exit.
    ws_handle.abort();
    let _ = tokio::time::timeout(Duration::from_secs(5), app_handle).await;

    info!("Auction dashboard shut down cleanly");
    Ok(())
}
