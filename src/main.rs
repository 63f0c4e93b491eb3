//! REST Express server binary.
//!
//! Startup flow: parse CLI → init tracing → load config → apply overrides
//! → optional metrics exporter → bind listener → run server.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rest_express::config::loader::load_config;
use rest_express::config::schema::Environment;
use rest_express::HttpServer;
use rest_express::ServerConfig;

#[derive(Debug, Parser)]
#[command(name = "rest-express", version, about = "REST Express HTTP/WebSocket server")]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listener port.
    #[arg(long)]
    port: Option<u16>,

    /// Run in production mode (restricted CORS).
    #[arg(long)]
    production: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rest_express=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    if let Some(port) = args.port {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{host}:{port}");
    }

    if args.production {
        config.environment = Environment::Production;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = ?config.environment,
        rate_limit_window_secs = config.rate_limit.window_secs,
        rate_limit_max_requests = config.rate_limit.max_requests,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => rest_express::observability::metrics::init_metrics(addr),
            Err(e) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    error = %e,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
