// src/transport/mod.rs
mod http;
mod pool;

pub use http::{HttpTransport, UnavailableTransport};
pub use pool::TransportPool;

use crate::inspect::ProxyAddress;
use crate::probe::ProbeError;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// Something that can issue an outbound GET and hand back the body text.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_text(&self, url: &Url) -> Result<String, ProbeError>;
}

/// Hands out transports; proxied ones are shared per proxy address.
pub trait TransportProvider: Send + Sync {
    fn proxied(&self, proxy: &ProxyAddress) -> Arc<dyn Transport>;

    fn direct(&self) -> Arc<dyn Transport>;
}
