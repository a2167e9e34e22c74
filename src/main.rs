use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_relay::config::{load_config, RelayConfig};
use user_relay::http::HttpServer;
use user_relay::relay::RelayClient;

#[derive(Parser)]
#[command(name = "user-relay")]
#[command(about = "CRUD edge service relaying to a backing user service", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let relay = RelayClient::new(&config.upstream)?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let server = HttpServer::new(config, relay);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
