//! HTTP transport
//!
//! The `Transport` trait is the seam between the fetcher and the network.
//! `HttpTransport` is the reqwest implementation; tests substitute a
//! scripted one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

/// User-Agent sent with every request
pub const USER_AGENT: &str = concat!("x-radar/", env!("CARGO_PKG_VERSION"));

/// A completed HTTP exchange, whatever its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures below the HTTP layer
#[derive(Debug, Error)]
pub enum TransportError {
    /// The configured timeout elapsed
    #[error("request timed out")]
    Timeout,

    /// DNS, connect, TLS, or body read failure
    #[error("{0}")]
    Connect(String),
}

/// Performs authenticated GET requests
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url, bearer: &str) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport whose requests are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        Ok(Self { client })
    }

    /// Creates a transport around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connect(describe(&err))
    }
}

/// Innermost error message, which names the actual cause (DNS, refused, ...)
fn describe(err: &reqwest::Error) -> String {
    let mut source: &dyn std::error::Error = err;
    while let Some(next) = source.source() {
        source = next;
    }
    source.to_string()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url, bearer: &str) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}
