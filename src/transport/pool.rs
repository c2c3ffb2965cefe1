// src/transport/pool.rs
use super::{HttpTransport, Transport, TransportProvider, UnavailableTransport};
use crate::inspect::ProxyAddress;
use crate::probe::describe;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// Default number of proxy addresses whose clients are kept.
const MAX_POOLED_PROXIES: usize = 1024;

/// Memoizes one proxied client per proxy address next to a shared direct client.
#[derive(Clone)]
pub struct TransportPool {
    direct: Arc<dyn Transport>,
    proxied: Arc<DashMap<ProxyAddress, Arc<dyn Transport>>>,
    timeout: Duration,
    max_pooled: usize,
}

impl TransportPool {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_limit(timeout, MAX_POOLED_PROXIES)
    }

    /// Once `max_pooled` addresses are cached, clients for further
    /// addresses are built per request and dropped with it.
    pub fn with_limit(timeout: Duration, max_pooled: usize) -> Result<Self, reqwest::Error> {
        let direct = Arc::new(HttpTransport::direct(timeout)?);

        Ok(Self {
            direct,
            proxied: Arc::new(DashMap::new()),
            timeout,
            max_pooled,
        })
    }

    /// Number of distinct proxies a client has been built for.
    pub fn len(&self) -> usize {
        self.proxied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxied.is_empty()
    }
}

impl TransportProvider for TransportPool {
    fn proxied(&self, proxy: &ProxyAddress) -> Arc<dyn Transport> {
        if let Some(existing) = self.proxied.get(proxy) {
            return existing.value().clone();
        }

        match HttpTransport::through(proxy, self.timeout) {
            Ok(transport) if self.proxied.len() >= self.max_pooled => {
                tracing::debug!(%proxy, "Transport pool full, using an uncached client");
                Arc::new(transport)
            }
            Ok(transport) => {
                // Racing builders for the same address all end up with the first insert.
                let entry = self
                    .proxied
                    .entry(proxy.clone())
                    .or_insert_with(|| Arc::new(transport));
                tracing::debug!(%proxy, "Proxied transport ready");
                entry.value().clone()
            }
            Err(err) => {
                let reason = describe(&err);
                tracing::error!(%proxy, %reason, "Failed to build proxied transport");
                Arc::new(UnavailableTransport::new(format!(
                    "cannot route through proxy {}: {}",
                    proxy, reason
                )))
            }
        }
    }

    fn direct(&self) -> Arc<dyn Transport> {
        self.direct.clone()
    }
}
