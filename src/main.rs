use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::anyhow;
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use convai_relay::{RelayConfig, routes, state::AppState};

/// ConvAI Relay - browser websocket relay for conversational voice agents
#[derive(Parser, Debug)]
#[command(name = "convai-relay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Both the TLS listener and the upstream wss:// client need a provider
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    let config = if let Some(config_path) = cli.config {
        info!("Loading configuration from {}", config_path.display());
        RelayConfig::from_file(&config_path).map_err(|e| anyhow!(e.to_string()))?
    } else {
        RelayConfig::from_env().map_err(|e| anyhow!(e.to_string()))?
    };

    info!(
        agent_id = %config.agent_id,
        private = config.agent_private,
        "Relay configured"
    );

    let address = config.address();
    let tls_config = config.tls.clone();

    let app_state = AppState::new(config).map_err(|e| anyhow!(e.to_string()))?;
    let shutdown = app_state.shutdown.clone();

    let app = routes::create_router().with_state(app_state);

    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    if let Some(tls) = tls_config {
        let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
            .await
            .map_err(|e| {
                anyhow!(
                    "Failed to load TLS certificates from {} and {}: {}",
                    tls.cert_path.display(),
                    tls.key_path.display(),
                    e
                )
            })?;

        let handle = axum_server::Handle::new();
        tokio::spawn(shutdown_on_signal(shutdown, Some(handle.clone())));

        info!("Relay listening on wss://{}", socket_addr);

        axum_server::bind_rustls(socket_addr, rustls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .map_err(|e| anyhow!("TLS server error: {}", e))?;
    } else {
        info!("Relay listening on ws://{}", socket_addr);

        let listener = TcpListener::bind(&socket_addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_on_signal(shutdown, None))
            .await?;
    }

    info!("Relay stopped");
    Ok(())
}

/// Wait for Ctrl-C, then cancel every session and stop accepting connections.
async fn shutdown_on_signal(shutdown: CancellationToken, handle: Option<axum_server::Handle>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }

    info!("Shutdown requested, closing sessions");
    shutdown.cancel();
    if let Some(handle) = handle {
        handle.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
    }
}
