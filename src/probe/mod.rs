// src/probe/mod.rs
mod country;
mod error;
mod icmp;
mod latency;
mod public_ip;
mod timespan;
mod verification;

pub use country::{Country, CountryProber};
pub(crate) use error::describe;
pub use error::{PingStatus, ProbeError};
pub use icmp::IcmpPinger;
pub use latency::{EchoReply, LatencyProber, Pinger};
pub use public_ip::PublicIpProber;
pub use timespan::TimeSpan;
pub use verification::{verify, Finding, Verification};
