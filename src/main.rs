mod config;
mod handler;
mod logging;
mod metrics;

use anyhow::Result;
use clap::Parser;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::ProxyConfig;
use crate::handler::state::ProxyState;

#[derive(Parser, Debug)]
#[command(version, about)]
pub(crate) struct Args {
    /// Optional TOML file; `Proxy:*` environment variables override it.
    #[arg(long)]
    config_file: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, action)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init(&args)?;

    let config = ProxyConfig::load(args.config_file.as_deref())?;
    tracing::debug!(?config);

    let metrics_socket_addr = SocketAddr::new(config.bind_address, config.metrics_port);
    metrics::init(metrics_socket_addr)?;

    let proxy_socket_addr = SocketAddr::new(config.bind_address, config.proxy_port);
    let state = ProxyState::new(config.clone(), http_client(&config)?);

    let listener = tokio::net::TcpListener::bind(proxy_socket_addr).await?;

    tracing::info!("Starting server on {proxy_socket_addr}...");

    axum::serve(listener, handler::router(state)).await?;

    Ok(())
}

fn http_client(config: &ProxyConfig) -> Result<reqwest::Client> {
    let http_client = reqwest::Client::builder()
        .https_only(config.https_only)
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .build()?;
    Ok(http_client)
}
