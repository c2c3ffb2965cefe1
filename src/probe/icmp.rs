// src/probe/icmp.rs
use super::error::{PingStatus, ProbeError};
use super::latency::{EchoReply, Pinger};
use async_trait::async_trait;
use std::io;
use std::net::IpAddr;
use std::time::Duration;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, SurgeError, ICMP};

const PAYLOAD: [u8; 32] = [0; 32];

/// `Pinger` on top of surge-ping. A socket is opened per echo so that a
/// missing ICMP permission shows up as a probe error, not a startup failure.
#[derive(Debug, Clone, Default)]
pub struct IcmpPinger;

impl IcmpPinger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Pinger for IcmpPinger {
    async fn echo(&self, hostname: &str, timeout: Duration) -> Result<EchoReply, ProbeError> {
        let ip = resolve(hostname).await?;

        let config = match ip {
            IpAddr::V4(_) => Config::default(),
            IpAddr::V6(_) => Config::builder().kind(ICMP::V6).build(),
        };
        let client = Client::new(&config)
            .map_err(|err| ProbeError::Transport(format!("cannot open ICMP socket: {}", err)))?;

        let mut pinger = client.pinger(ip, PingIdentifier(rand::random())).await;
        pinger.timeout(timeout);

        match pinger.ping(PingSequence(0), &PAYLOAD).await {
            Ok((_, round_trip)) => Ok(EchoReply {
                status: PingStatus::Success,
                round_trip,
            }),
            Err(SurgeError::Timeout { .. }) => Ok(EchoReply {
                status: PingStatus::TimedOut,
                round_trip: timeout,
            }),
            Err(SurgeError::IOError(err)) if is_unreachable(&err) => Ok(EchoReply {
                status: PingStatus::DestinationHostUnreachable,
                round_trip: Duration::ZERO,
            }),
            Err(err) => Err(ProbeError::Transport(format!("ICMP echo to {} failed: {}", ip, err))),
        }
    }
}

async fn resolve(hostname: &str) -> Result<IpAddr, ProbeError> {
    if let Ok(ip) = hostname.parse::<IpAddr>() {
        return Ok(ip);
    }

    let mut addresses = tokio::net::lookup_host((hostname, 0))
        .await
        .map_err(|err| ProbeError::Transport(format!("cannot resolve {}: {}", hostname, err)))?;

    addresses
        .next()
        .map(|address| address.ip())
        .ok_or_else(|| ProbeError::Transport(format!("{} did not resolve to any address", hostname)))
}

fn is_unreachable(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable
    )
}
