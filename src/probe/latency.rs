// src/probe/latency.rs
use super::error::{PingStatus, ProbeError};
use super::verification::{verify, Verification};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const PROBE: &str = "latency";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoReply {
    pub status: PingStatus,
    pub round_trip: Duration,
}

/// Sends exactly one ICMP echo per call.
#[async_trait]
pub trait Pinger: Send + Sync {
    async fn echo(&self, hostname: &str, timeout: Duration) -> Result<EchoReply, ProbeError>;
}

pub struct LatencyProber {
    pinger: Arc<dyn Pinger>,
    timeout: Duration,
}

impl LatencyProber {
    pub fn new(pinger: Arc<dyn Pinger>, timeout: Duration) -> Self {
        Self { pinger, timeout }
    }

    /// On success the latency is the echo round trip; otherwise it is the
    /// wall time spent waiting, up to the full timeout.
    pub async fn probe(&self, hostname: Option<&str>) -> Option<Verification<()>> {
        let hostname = hostname?;
        let verification = verify(PROBE, async {
            let reply = self.pinger.echo(hostname, self.timeout).await?;
            match reply.status {
                PingStatus::Success => Ok(reply.round_trip),
                status => Err(ProbeError::PingStatus(status)),
            }
        })
        .await;
        Some(verification.into_round_trip())
    }
}
