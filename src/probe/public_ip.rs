// src/probe/public_ip.rs
use super::error::ProbeError;
use super::verification::{verify, Verification};
use crate::transport::Transport;
use std::net::IpAddr;
use url::Url;

const PROBE: &str = "public_ip";

/// Asks an IP echo service which address a transport's traffic comes from.
#[derive(Debug, Clone)]
pub struct PublicIpProber {
    echo_url: Url,
}

impl PublicIpProber {
    pub fn new(echo_url: Url) -> Self {
        Self { echo_url }
    }

    pub async fn probe(&self, transport: &dyn Transport) -> Verification<IpAddr> {
        verify(PROBE, transport.get_text(&self.echo_url))
            .await
            .and_then(|body| parse_ip(&body))
    }
}

fn parse_ip(body: &str) -> Result<IpAddr, ProbeError> {
    body.trim()
        .parse()
        .map_err(|_| ProbeError::parse("an IP address", body))
}
