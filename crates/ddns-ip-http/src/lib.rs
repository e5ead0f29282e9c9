// # HTTP IP Source
//
// This crate provides an HTTP-based IP source for the DDNS system.
//
// ## Protocol
//
// One GET per `resolve()` to a JSON echo service:
//
// ```http
// GET https://api.ipify.org?format=json
//
// {"ip": "203.0.113.9"}
// ```
//
// The `ip` field is returned verbatim. No retry and no caching: the
// engine's next tick is the retry, and every cycle asks again.

use ddns_core::error::ResolveError;
use ddns_core::traits::{IpSource, ResolvedAddress};
use ddns_core::Result;

use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Default IP echo service (JSON flavour of ipify)
pub const DEFAULT_IP_ECHO_URL: &str = "https://api.ipify.org?format=json";

/// Default HTTP timeout for echo requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Echo service response body
#[derive(Debug, Deserialize)]
struct IpEchoResponse {
    ip: String,
}

/// HTTP-based IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create an IP source backed by ipify
    pub fn new() -> Self {
        Self::with_url(DEFAULT_IP_ECHO_URL)
    }

    /// Create an IP source for a custom echo endpoint
    ///
    /// The endpoint must answer `{"ip": "<address>"}`.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: build_client(DEFAULT_HTTP_TIMEOUT),
        }
    }

    /// Replace the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Echo endpoint in use
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpIpSource {
    fn default() -> Self {
        Self::new()
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// Extract the address from an echo response body
fn parse_echo_body(body: &str) -> std::result::Result<ResolvedAddress, ResolveError> {
    serde_json::from_str::<IpEchoResponse>(body)
        .map(|echo| ResolvedAddress::from(echo.ip))
        .map_err(|e| ResolveError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn resolve(&self) -> Result<ResolvedAddress> {
        tracing::debug!("Fetching public IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ResolveError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!("IP echo service returned {}", status);
            return Err(ResolveError::Status(status.as_u16()).into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResolveError::Body(e.to_string()))?;

        Ok(parse_echo_body(&body)?)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
