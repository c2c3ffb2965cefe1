// src/config/models.rs
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} is not a valid absolute URL: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{field} must use http or https, got {scheme}")]
    UnsupportedScheme { field: &'static str, scheme: String },

    #[error(
        "server.request_timeout_secs ({configured:?}) must cover two chained upstream calls plus the ping ({required:?})"
    )]
    RequestTimeoutTooShort {
        configured: Duration,
        required: Duration,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub ping: PingConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::NotPositive {
                field: "server.request_timeout_secs",
            });
        }
        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::NotPositive {
                field: "upstream.timeout_secs",
            });
        }
        if self.ping.timeout_ms == 0 {
            return Err(ConfigError::NotPositive {
                field: "ping.timeout_ms",
            });
        }

        // IP echo then country lookup run back to back, next to the ping.
        let required = self.upstream.timeout() * 2 + self.ping.timeout();
        if self.server.request_timeout() < required {
            return Err(ConfigError::RequestTimeoutTooShort {
                configured: self.server.request_timeout(),
                required,
            });
        }

        self.upstream.public_ip_url()?;
        self.upstream.geo_base_url()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// Upper bound for a whole `/proxy/info` request, enforced by the handler.
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Service answering with the caller's public IP as plain text.
    pub public_ip_url: String,
    /// Geolocation service; `{ip}/country` is appended to it.
    pub geo_base_url: String,
    /// Timeout applied by every transport client.
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn public_ip_url(&self) -> Result<Url, ConfigError> {
        parse_http_url("upstream.public_ip_url", &self.public_ip_url)
    }

    pub fn geo_base_url(&self) -> Result<Url, ConfigError> {
        let mut url = parse_http_url("upstream.geo_base_url", &self.geo_base_url)?;
        // Url::join drops the last segment unless the base ends with a slash.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            public_ip_url: "https://api.ipify.org/".to_string(),
            geo_base_url: "https://ipapi.co/".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PingConfig {
    pub timeout_ms: u64,
}

impl PingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for PingConfig {
    fn default() -> Self {
        Self { timeout_ms: 1000 }
    }
}

fn parse_http_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme {
            field,
            scheme: other.to_string(),
        }),
    }
}
