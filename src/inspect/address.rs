// src/inspect/address.rs
use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

/// Rejected `proxy` route parameter. The only error surfaced as a 400.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("proxy address is missing")]
    Missing,

    #[error("proxy address {0:?} is not in host:port form")]
    NotHostPort(String),

    #[error("proxy address {0:?} has an invalid host")]
    InvalidHost(String),

    #[error("proxy address {0:?} has an invalid port")]
    InvalidPort(String),
}

/// `host:port` of an HTTP forward proxy. IPv6 hosts are written in brackets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyAddress {
    host: String,
    port: u16,
}

impl ProxyAddress {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Proxy URL handed to the HTTP client.
    pub fn url(&self) -> String {
        format!("http://{}", self)
    }
}

impl FromStr for ProxyAddress {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::Missing);
        }

        let (host, port) = raw
            .rsplit_once(':')
            .ok_or_else(|| ValidationError::NotHostPort(raw.to_string()))?;

        let host = match host.strip_prefix('[') {
            Some(bracketed) => {
                let inner = bracketed
                    .strip_suffix(']')
                    .ok_or_else(|| ValidationError::InvalidHost(raw.to_string()))?;
                inner
                    .parse::<Ipv6Addr>()
                    .map_err(|_| ValidationError::InvalidHost(raw.to_string()))?;
                inner
            }
            None => host,
        };

        // A bare IPv6 literal leaves its last group as the "port"; require brackets.
        if host.contains(':') && !raw.starts_with('[') {
            return Err(ValidationError::NotHostPort(raw.to_string()));
        }
        let bad_host = host.is_empty()
            || host
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '/' | '\\' | '@' | '?' | '#' | '[' | ']'));
        if bad_host {
            return Err(ValidationError::InvalidHost(raw.to_string()));
        }

        let port = match port.parse::<u16>() {
            Ok(port) if port > 0 => port,
            _ => return Err(ValidationError::InvalidPort(raw.to_string())),
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port() {
        let address: ProxyAddress = "proxy.lan:8118".parse().unwrap();
        assert_eq!(address.host(), "proxy.lan");
        assert_eq!(address.port(), 8118);
        assert_eq!(address.url(), "http://proxy.lan:8118");
    }

    #[test]
    fn parses_bracketed_ipv6() {
        let address: ProxyAddress = "[fd00::1]:3128".parse().unwrap();
        assert_eq!(address.host(), "fd00::1");
        assert_eq!(address.to_string(), "[fd00::1]:3128");
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert_eq!("".parse::<ProxyAddress>(), Err(ValidationError::Missing));
        assert_eq!("   ".parse::<ProxyAddress>(), Err(ValidationError::Missing));

        for raw in ["proxy.lan", "fd00::1"] {
            assert!(
                matches!(raw.parse::<ProxyAddress>(), Err(ValidationError::NotHostPort(_))),
                "{raw}"
            );
        }
        for raw in [":8118", "a b:1", "user@proxy:1", "proxy/x:1", "[fd00::1:1", "[nope]:1"] {
            assert!(
                matches!(raw.parse::<ProxyAddress>(), Err(ValidationError::InvalidHost(_))),
                "{raw}"
            );
        }
        for raw in ["proxy.lan:", "proxy.lan:0", "proxy.lan:70000", "proxy.lan:http"] {
            assert!(
                matches!(raw.parse::<ProxyAddress>(), Err(ValidationError::InvalidPort(_))),
                "{raw}"
            );
        }
    }
}
