use gsm_server::{AppState, build_router, error::ServerError, logger};

use gsm_config::Config;
use gsm_core::HostServices;

use std::error::Error;

use log::{error, info, warn};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A .env file is optional
    let _ = dotenvy::dotenv();

    // Load and validate configuration
    let config = Config::load()?;
    config.validate()?;

    let log_file = logger::log_file_path(&config.logging, &Config::config_dir()?)?;
    logger::initialize(&config.logging, log_file.as_deref())?;

    info!("Starting gsm-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics {
            message: e.to_string(),
        })?;

    // Root token: cancelled on shutdown so a running provisioning tool is killed
    let cancel = CancellationToken::new();
    let host = HostServices::system(&config.provisioning);
    let state = AppState::new(&config, host, cancel.clone()).with_prometheus(prometheus);

    match state.orchestrator.status().await {
        Ok(status) => info!(
            "Game server is {} (pid {:?})",
            status.state.as_str(),
            status.pid
        ),
        Err(e) => warn!("Initial process scan failed: {e}"),
    }

    let app = build_router(state);

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await?;

    info!("Graceful shutdown complete; the game server keeps running");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM after cancelling the root token.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }

    cancel.cancel();
}
