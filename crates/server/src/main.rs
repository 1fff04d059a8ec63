use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use replaylink_core::{
    load_config, validate_config, Analyzer, Browser, CommandDecoder, FileMonitor,
    HttpUploadClient, JsonReplayStore, Manager, NotifyMonitor, PreMatchProcessor, ReplayAnalyzer,
    ReplayDecoder, ReplayStore, SystemBrowser, UploadClient,
};
use replaylink_server::api::{create_router, WsBroadcaster};
use replaylink_server::state::AppState;

/// Interval between WebSocket keep-alive messages
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("REPLAYLINK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Replay directory: {:?}", config.paths.replay_dir);
    info!("History file: {:?}", config.paths.history_file());

    let browser: Arc<dyn Browser> = Arc::new(SystemBrowser);

    let decoder = CommandDecoder::new(config.analyzer.clone());
    if let Err(e) = decoder.validate().await {
        // Replays will fail with UploadError and can be retried once it is installed.
        warn!("Replay decoder unavailable: {}", e);
    }
    let decoder: Arc<dyn ReplayDecoder> = Arc::new(decoder);

    let analyzer: Arc<dyn Analyzer> =
        Arc::new(ReplayAnalyzer::new(Arc::clone(&decoder), &config.analyzer));
    let uploader: Arc<dyn UploadClient> = Arc::new(
        HttpUploadClient::new(
            config.api.clone(),
            config.post_match.clone(),
            Arc::clone(&browser),
        )
        .context("Failed to create upload client")?,
    );
    let prematch = PreMatchProcessor::new(Arc::clone(&decoder), Arc::clone(&browser), &config.api)
        .context("Failed to create pre-match processor")?;
    let store: Arc<dyn ReplayStore> =
        Arc::new(JsonReplayStore::new(config.paths.history_file()));
    let monitor: Arc<dyn FileMonitor> = Arc::new(NotifyMonitor::new(&config.paths));

    let manager = Arc::new(Manager::new(
        config.manager.clone(),
        config.features,
        store,
        monitor,
        analyzer,
        uploader,
        Some(Arc::new(prematch)),
    ));

    let ws_broadcaster = WsBroadcaster::default();
    let relay = ws_broadcaster.forward(manager.subscribe());
    let heartbeat = ws_broadcaster.spawn_heartbeat(HEARTBEAT_INTERVAL);

    manager.start().await;

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::clone(&manager),
        ws_broadcaster,
    ));
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    manager.stop().await;
    heartbeat.abort();
    relay.abort();

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
