// src/transport/http.rs
use super::Transport;
use crate::inspect::ProxyAddress;
use crate::probe::ProbeError;
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::time::Duration;
use url::Url;

/// Largest upstream body read; IP echo and country replies are a few bytes.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// reqwest-backed transport, either direct or tunnelled through one proxy.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Client that ignores proxy environment variables.
    pub fn direct(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().no_proxy().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Client sending http and https traffic through `proxy`.
    pub fn through(proxy: &ProxyAddress, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .proxy(Proxy::all(proxy.url())?)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &Url) -> Result<String, ProbeError> {
        let mut response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Transport(format!(
                "{} responded with {}",
                url, status
            )));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > MAX_BODY_BYTES {
                return Err(ProbeError::Transport(format!(
                    "{} sent more than {} bytes",
                    url, MAX_BODY_BYTES
                )));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Stand-in when a proxied client could not be built; every call fails.
#[derive(Debug, Clone)]
pub struct UnavailableTransport {
    reason: String,
}

impl UnavailableTransport {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Transport for UnavailableTransport {
    async fn get_text(&self, _url: &Url) -> Result<String, ProbeError> {
        Err(ProbeError::Transport(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_body_on_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body("84.114.1.1")
            .create_async()
            .await;

        let transport = HttpTransport::direct(Duration::from_secs(5)).unwrap();
        let url = Url::parse(&server.url()).unwrap();
        assert_eq!(transport.get_text(&url).await.unwrap(), "84.114.1.1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(503)
            .with_body("try later")
            .create_async()
            .await;

        let transport = HttpTransport::direct(Duration::from_secs(5)).unwrap();
        let url = Url::parse(&server.url()).unwrap();
        match transport.get_text(&url).await {
            Err(ProbeError::Transport(message)) => assert!(message.contains("503")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn oversized_body_is_a_transport_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(200)
            .with_body("1".repeat(MAX_BODY_BYTES + 1))
            .create_async()
            .await;

        let transport = HttpTransport::direct(Duration::from_secs(5)).unwrap();
        let url = Url::parse(&server.url()).unwrap();
        match transport.get_text(&url).await {
            Err(ProbeError::Transport(message)) => {
                assert!(message.contains("more than"), "{}", message);
                assert!(message.len() < 256);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        let transport = HttpTransport::direct(Duration::from_secs(2)).unwrap();
        // Port 9 on localhost (discard) is closed in any sane test environment.
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        assert!(matches!(
            transport.get_text(&url).await,
            Err(ProbeError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn unavailable_transport_always_fails() {
        let transport = UnavailableTransport::new("no client");
        let url = Url::parse("http://example.com/").unwrap();
        assert_eq!(
            transport.get_text(&url).await,
            Err(ProbeError::Transport("no client".to_string()))
        );
    }
}
