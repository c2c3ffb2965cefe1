// src/server/builder.rs
use anyhow::{anyhow, Context, Result};
use hyper::{server::conn::Http, Body, Request, Response};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::Service;

/// Binds the configured address and serves one handler on it.
pub struct ServerBuilder<H> {
    addr: SocketAddr,
    handler: Option<H>,
}

impl<H> ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            handler: None,
        }
    }

    pub fn with_handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Bind the TCP listener and serve until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let handler = self
            .handler
            .ok_or_else(|| anyhow!("handler must be set via with_handler()"))?;

        let listener = TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.addr))?;
        tracing::info!(addr = %self.addr, "Listening for proxy info requests");

        serve_listener(listener, handler, shutdown).await
    }
}

/// Accept loop over an already bound listener, one Tokio task per connection.
/// Connections in flight are left to finish on their own after shutdown.
pub async fn serve_listener<H, F>(listener: TcpListener, handler: H, shutdown: F) -> Result<()>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = &mut shutdown => {
                tracing::info!("HTTP server stopped accepting connections");
                return Ok(());
            }
        };
        let svc = handler.clone();

        tokio::spawn(async move {
            let http = Http::new();
            if let Err(err) = http.serve_connection(stream, svc).await {
                tracing::warn!(%peer, %err, "connection error");
            }
        });
    }
}
