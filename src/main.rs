// src/main.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use proxy_info::{
    config,
    inspect::ProxyInspector,
    probe::IcmpPinger,
    server::{shutdown_signal, RequestHandler, ServerBuilder},
    transport::TransportPool,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("proxy_info=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config_or_default(&config_path).await?;

    let transports = Arc::new(
        TransportPool::new(config.upstream.timeout()).context("Failed to build HTTP client")?,
    );
    let inspector = ProxyInspector::from_config(&config, transports, Arc::new(IcmpPinger::new()))
        .context("Invalid upstream configuration")?;

    let handler = RequestHandler::new(Arc::new(inspector), config.server.request_timeout());

    info!("Starting proxy info service on {}", config.server.listen_addr);

    ServerBuilder::new(config.server.listen_addr)
        .with_handler(handler)
        .serve_with_shutdown(shutdown_signal()?)
        .await?;

    Ok(())
}
