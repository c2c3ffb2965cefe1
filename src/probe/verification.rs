// src/probe/verification.rs
use super::error::ProbeError;
use super::timespan::TimeSpan;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Settled outcome of one probe: how long it took and what it found.
///
/// The found value is present iff there is no error, and the latency is
/// always set, also for failures.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification<T> {
    latency: Duration,
    outcome: Result<T, ProbeError>,
}

impl<T> Verification<T> {
    pub fn new(latency: Duration, outcome: Result<T, ProbeError>) -> Self {
        Self { latency, outcome }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn value(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ProbeError> {
        self.outcome.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Interpret a successful value after timing has stopped. The latency is
    /// kept whether or not `interpret` accepts the value.
    pub fn and_then<U>(self, interpret: impl FnOnce(T) -> Result<U, ProbeError>) -> Verification<U> {
        let outcome = self.outcome.and_then(interpret);
        if let Err(error) = &outcome {
            debug!(latency = ?self.latency, %error, "verification rejected");
        }
        Verification::new(self.latency, outcome)
    }
}

impl Verification<Duration> {
    /// Replace the measured wall time with the reported round trip on success.
    pub fn into_round_trip(self) -> Verification<()> {
        match self.outcome {
            Ok(round_trip) => Verification::new(round_trip, Ok(())),
            Err(error) => Verification::new(self.latency, Err(error)),
        }
    }
}

/// Run `operation` once, timing it from first poll until it settles.
///
/// Failures are captured in the returned value, never propagated.
pub async fn verify<T, Fut>(probe: &'static str, operation: Fut) -> Verification<T>
where
    Fut: Future<Output = Result<T, ProbeError>>,
{
    let start = Instant::now();
    let outcome = operation.await;
    let latency = start.elapsed();

    match &outcome {
        Ok(_) => debug!(probe, latency = ?latency, "verification succeeded"),
        Err(error) => warn!(probe, latency = ?latency, %error, "verification failed"),
    }

    Verification::new(latency, outcome)
}

/// Value a probe contributes to its JSON object next to `latency`.
pub trait Finding {
    fn write_field<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error>;
}

impl Finding for () {
    fn write_field<M: SerializeMap>(&self, _map: &mut M) -> Result<(), M::Error> {
        Ok(())
    }
}

impl Finding for IpAddr {
    fn write_field<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        map.serialize_entry("ip", self)
    }
}

impl<T: Finding> Serialize for Verification<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Ok(value) = &self.outcome {
            value.write_field(&mut map)?;
        }
        map.serialize_entry("latency", &TimeSpan(self.latency))?;
        if let Err(error) = &self.outcome {
            map.serialize_entry("errorMessage", &error.to_string())?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::PingStatus;
    use serde_json::json;

    #[tokio::test]
    async fn success_keeps_value_and_measures_time() {
        let verification = verify("test", async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, ProbeError>(7)
        })
        .await;

        assert_eq!(verification.value(), Some(&7));
        assert!(verification.error().is_none());
        assert!(verification.latency() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn failure_is_captured_with_latency() {
        let verification: Verification<u8> = verify("test", async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err(ProbeError::Transport("connection refused".to_string()))
        })
        .await;

        assert!(!verification.is_success());
        assert!(verification.value().is_none());
        assert!(verification.latency() >= Duration::from_millis(10));
    }

    #[tokio::test]
    async fn operation_runs_exactly_once() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let _ = verify("test", async {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err::<(), _>(ProbeError::Transport("boom".to_string()))
        })
        .await;
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn and_then_keeps_latency_and_first_error() {
        let timed = Verification::new(Duration::from_millis(40), Ok("17".to_string()));
        let parsed = timed.and_then(|body| {
            body.parse::<u8>()
                .map_err(|_| ProbeError::parse("a number", &body))
        });
        assert_eq!(parsed.value(), Some(&17));
        assert_eq!(parsed.latency(), Duration::from_millis(40));

        let garbage = Verification::new(Duration::from_millis(40), Ok("x".to_string()))
            .and_then(|body| body.parse::<u8>().map_err(|_| ProbeError::parse("a number", &body)));
        assert!(matches!(garbage.error(), Some(ProbeError::Parse { .. })));
        assert_eq!(garbage.latency(), Duration::from_millis(40));

        let mut called = false;
        let failed: Verification<u8> = Verification::new(
            Duration::from_millis(9),
            Err::<String, _>(ProbeError::Transport("refused".to_string())),
        )
        .and_then(|_| {
            called = true;
            Ok(0)
        });
        assert!(!called);
        assert_eq!(failed.error(), Some(&ProbeError::Transport("refused".to_string())));
        assert_eq!(failed.latency(), Duration::from_millis(9));
    }

    #[test]
    fn round_trip_replaces_latency_only_on_success() {
        let ok = Verification::new(Duration::from_millis(900), Ok(Duration::from_millis(12)));
        assert_eq!(ok.into_round_trip().latency(), Duration::from_millis(12));

        let failed: Verification<Duration> = Verification::new(
            Duration::from_millis(1_000),
            Err(ProbeError::PingStatus(PingStatus::TimedOut)),
        );
        let failed = failed.into_round_trip();
        assert_eq!(failed.latency(), Duration::from_millis(1_000));
        assert_eq!(failed.error().map(ToString::to_string).as_deref(), Some("TimedOut"));
    }

    #[test]
    fn serializes_by_omission() {
        let ok = Verification::new(Duration::from_millis(5), Ok("1.2.3.4".parse::<IpAddr>().unwrap()));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "ip": "1.2.3.4", "latency": "00:00:00.0050000" })
        );

        let failed: Verification<IpAddr> = Verification::new(
            Duration::from_secs(1),
            Err(ProbeError::Transport("dns error".to_string())),
        );
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({ "latency": "00:00:01", "errorMessage": "dns error" })
        );

        let latency_only = Verification::new(Duration::ZERO, Ok(()));
        assert_eq!(
            serde_json::to_value(&latency_only).unwrap(),
            json!({ "latency": "00:00:00" })
        );
    }
}
