// src/probe/country.rs
use super::error::ProbeError;
use super::verification::{verify, Finding, Verification};
use crate::transport::Transport;
use serde::ser::SerializeMap;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;
use url::Url;

const PROBE: &str = "country";

/// Country code as returned by the geolocation service, reduced to ASCII
/// letters and digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country(String);

impl Country {
    pub fn from_response(body: &str) -> Result<Self, ProbeError> {
        let code: String = body.chars().filter(char::is_ascii_alphanumeric).collect();
        if code.is_empty() {
            return Err(ProbeError::parse("a country code", body));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Finding for Country {
    fn write_field<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        map.serialize_entry("country", &self.0)
    }
}

#[derive(Debug, Clone)]
pub struct CountryProber {
    geo_base: Url,
}

impl CountryProber {
    /// `geo_base` must end with a slash; `{ip}/country` is joined onto it.
    pub fn new(geo_base: Url) -> Self {
        Self { geo_base }
    }

    /// Nothing is looked up, and nothing timed, without an address.
    pub async fn probe(
        &self,
        ip: Option<IpAddr>,
        transport: &dyn Transport,
    ) -> Option<Verification<Country>> {
        let url = match self.lookup_url(ip?) {
            Ok(url) => url,
            Err(error) => return Some(Verification::new(Duration::ZERO, Err(error))),
        };
        let verification = verify(PROBE, transport.get_text(&url))
            .await
            .and_then(|body| Country::from_response(&body));
        Some(verification)
    }

    fn lookup_url(&self, ip: IpAddr) -> Result<Url, ProbeError> {
        // "./" keeps IPv6 literals like "fd00::1" from being read as a scheme
        self.geo_base
            .join(&format!("./{}/country", ip))
            .map_err(|err| ProbeError::Transport(format!("cannot build lookup URL: {}", err)))
    }
}
