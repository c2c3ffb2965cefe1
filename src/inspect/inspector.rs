// src/inspect/inspector.rs
use super::address::{ProxyAddress, ValidationError};
use crate::config::{Config, ConfigError};
use crate::probe::{
    Country, CountryProber, LatencyProber, Pinger, PublicIpProber, Verification,
};
use crate::transport::{Transport, TransportProvider};
use serde::Serialize;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Everything learned about one proxy in one request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_to_proxy: Option<Verification<()>>,
    proxy_public_ip: Verification<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    proxy_country: Option<Verification<Country>>,
    server_public_ip: Verification<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_country: Option<Verification<Country>>,
}

impl ProxyInfo {
    pub fn latency_to_proxy(&self) -> Option<&Verification<()>> {
        self.latency_to_proxy.as_ref()
    }

    pub fn proxy_public_ip(&self) -> &Verification<IpAddr> {
        &self.proxy_public_ip
    }

    pub fn proxy_country(&self) -> Option<&Verification<Country>> {
        self.proxy_country.as_ref()
    }

    pub fn server_public_ip(&self) -> &Verification<IpAddr> {
        &self.server_public_ip
    }

    pub fn server_country(&self) -> Option<&Verification<Country>> {
        self.server_country.as_ref()
    }

    /// Number of probes that ran and recorded an error.
    pub fn failures(&self) -> usize {
        [
            self.latency_to_proxy.as_ref().map(Verification::is_success),
            Some(self.proxy_public_ip.is_success()),
            self.proxy_country.as_ref().map(Verification::is_success),
            Some(self.server_public_ip.is_success()),
            self.server_country.as_ref().map(Verification::is_success),
        ]
        .into_iter()
        .flatten()
        .filter(|succeeded| !succeeded)
        .count()
    }
}

/// Runs the five probes for a proxy address and assembles a `ProxyInfo`.
pub struct ProxyInspector {
    transports: Arc<dyn TransportProvider>,
    public_ip: PublicIpProber,
    country: CountryProber,
    latency: LatencyProber,
}

impl ProxyInspector {
    pub fn new(
        transports: Arc<dyn TransportProvider>,
        public_ip: PublicIpProber,
        country: CountryProber,
        latency: LatencyProber,
    ) -> Self {
        Self {
            transports,
            public_ip,
            country,
            latency,
        }
    }

    pub fn from_config(
        config: &Config,
        transports: Arc<dyn TransportProvider>,
        pinger: Arc<dyn Pinger>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            transports,
            PublicIpProber::new(config.upstream.public_ip_url()?),
            CountryProber::new(config.upstream.geo_base_url()?),
            LatencyProber::new(pinger, config.ping.timeout()),
        ))
    }

    /// Validates `raw_address` before touching any transport or socket.
    pub async fn inspect(&self, raw_address: &str) -> Result<ProxyInfo, ValidationError> {
        let address: ProxyAddress = raw_address.parse()?;
        let span = info_span!("proxy_info", proxy = %address, request_id = %Uuid::new_v4());
        Ok(self.inspect_address(&address).instrument(span).await)
    }

    pub async fn inspect_address(&self, address: &ProxyAddress) -> ProxyInfo {
        let proxied = self.transports.proxied(address);
        let direct = self.transports.direct();

        // The server's own country is also looked up through the proxy,
        // matching the existing public behaviour of this endpoint.
        let proxy_side = self.ip_then_country(proxied.as_ref(), proxied.as_ref());
        let server_side = self.ip_then_country(direct.as_ref(), proxied.as_ref());
        let latency = self.latency.probe(Some(address.host()));

        let ((proxy_public_ip, proxy_country), (server_public_ip, server_country), latency_to_proxy) =
            tokio::join!(proxy_side, server_side, latency);

        let info = ProxyInfo {
            latency_to_proxy,
            proxy_public_ip,
            proxy_country,
            server_public_ip,
            server_country,
        };
        info!(failures = info.failures(), "Proxy inspection complete");
        info
    }

    async fn ip_then_country(
        &self,
        ip_transport: &dyn Transport,
        country_transport: &dyn Transport,
    ) -> (Verification<IpAddr>, Option<Verification<Country>>) {
        let ip = self.public_ip.probe(ip_transport).await;
        let country = self
            .country
            .probe(ip.value().copied(), country_transport)
            .await;
        (ip, country)
    }
}
