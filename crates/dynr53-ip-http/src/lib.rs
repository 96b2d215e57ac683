// # HTTP Public IP Source
//
// This crate provides the public-IP source for dynr53.
//
// ## Architecture
//
// Performs a single GET against a "what is my IP" service (api.ipify.org by
// default; ipv4.icanhazip.com and ifconfig.me/ip also answer in plain text)
// and parses the trimmed plain-text body as an IPv4 address.
// One request per call, no caching, no retry: every failure is returned to
// the reconciler, which treats it as "public IP unavailable".

use dynr53_core::traits::PublicIpSource;
use dynr53_core::{Error, Result};

use std::net::Ipv4Addr;
use std::time::Duration;

/// HTTP-based public IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client (carries the request timeout)
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://api.ipify.org")
    /// - `timeout`: Upper bound for the whole request
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dynr53/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// The URL this source queries
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Parse a plain-text response body as an IPv4 address
///
/// Surrounding whitespace (trailing newlines in particular) is ignored.
/// IPv6 answers are rejected: only an A record can be written.
pub fn parse_ipv4_body(body: &str) -> Result<Ipv4Addr> {
    let text = body.trim();

    text.parse::<Ipv4Addr>().map_err(|_| {
        if text.parse::<std::net::Ipv6Addr>().is_ok() {
            Error::ip_source(format!("Expected IPv4, got: {}", text))
        } else {
            Error::ip_source(format!("Invalid IP address: {:?}", text))
        }
    })
}

#[async_trait::async_trait]
impl PublicIpSource for HttpIpSource {
    async fn fetch_public_ip(&self) -> Result<Ipv4Addr> {
        tracing::debug!("Fetching public IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::ip_source(format!("Request to {} timed out", self.url))
                } else {
                    Error::ip_source(format!("Request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))?;

        parse_ipv4_body(&body)
    }

    fn source_name(&self) -> &str {
        &self.url
    }
}
