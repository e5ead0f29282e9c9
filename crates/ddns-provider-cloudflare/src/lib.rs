// # Cloudflare DNS Provider
//
// This crate provides a Cloudflare DNS provider implementation for the DDNS system.
//
// ## Behaviour
//
// - ✅ One PUT per engine cycle, to a pre-configured zone and record ID
// - ✅ Unconditional overwrite: no GET, no comparison with the current content
// - ✅ Success is HTTP 200 and nothing else
// - ✅ Error bodies are surfaced verbatim (the JSON envelope is not parsed)
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry or backoff (the engine's next tick is the retry)
// - ❌ NO caching
// - ❌ NO background tasks
//
// ## API Call
//
// ```http
// PUT /client/v4/zones/:zone_id/dns_records/:record_id
// Authorization: Bearer <token>
// Content-Type: application/json
//
// {"type":"A","name":"home.example.com","content":"203.0.113.9","proxied":false,"ttl":1}
// ```
//
// ## Security
//
// - API token is NEVER logged
// - Debug output redacts the token

use async_trait::async_trait;
use ddns_core::traits::{DnsProvider, DnsRecordUpdate, UpdateOutcome};
use ddns_core::{Config, Error, Result};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Cloudflare DNS provider
///
/// Isolated, stateless, and single-shot: each `update_record` call is one
/// PUT of the full record.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider logs the intended PUT (URL and
/// payload, never the token) and reports `UpdateOutcome::DryRun` without
/// contacting Cloudflare.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Zone holding the record
    zone_id: String,

    /// Record to overwrite
    record_id: String,

    /// API base URL (overridable for tests)
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, skip the PUT
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("record_id", &self.record_id)
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `zone_id`: Zone ID
    /// - `record_id`: DNS record ID inside the zone
    /// - `dry_run`: If true, log the update instead of sending it
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        record_id: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            api_token: api_token.into(),
            zone_id: zone_id.into(),
            record_id: record_id.into(),
            api_base: CLOUDFLARE_API_BASE.to_string(),
            client,
            dry_run,
        }
    }

    /// Create a provider for the record described by `config`
    pub fn from_config(config: &Config, dry_run: bool) -> Self {
        Self::new(
            config.api_token.clone(),
            config.zone_id.clone(),
            config.record_id.clone(),
            dry_run,
        )
    }

    /// Point the provider at a different API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether updates are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// URL of the managed record
    pub fn record_url(&self) -> String {
        format!(
            "{}/zones/{}/dns_records/{}",
            self.api_base, self.zone_id, self.record_id
        )
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// Overwrite the managed record
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateOutcome::Applied)`: Cloudflare answered 200
    /// - `Ok(UpdateOutcome::DryRun)`: Nothing sent
    /// - `Err(Error::Update(_))`: Transport failure, or any other status
    ///   with the raw response body
    async fn update_record(&self, update: &DnsRecordUpdate) -> Result<UpdateOutcome> {
        let url = self.record_url();

        if self.dry_run {
            let payload = serde_json::to_string(update)
                .unwrap_or_else(|e| format!("<unserializable payload: {}>", e));
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                payload
            );
            return Ok(UpdateOutcome::DryRun);
        }

        tracing::debug!(
            "Updating Cloudflare DNS record {} ({}) -> {}",
            update.name,
            self.record_id,
            update.content
        );

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .json(update)
            .send()
            .await
            .map_err(|e| Error::update_transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(Error::rejected(status.as_u16(), error_text));
        }

        tracing::debug!("Cloudflare accepted record {} -> {}", update.name, update.content);
        Ok(UpdateOutcome::Applied)
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::traits::ResolvedAddress;
    use ddns_core::UpdateError;
    use httpmock::prelude::*;
    use serde_json::json;

    fn update_for(address: &str) -> DnsRecordUpdate {
        DnsRecordUpdate::a_record("home.example.com", &ResolvedAddress::from(address))
    }

    fn provider_for(server: &MockServer) -> CloudflareProvider {
        CloudflareProvider::new("test_token", "zone123", "rec456", false)
            .with_api_base(server.base_url())
    }

    #[test]
    fn test_record_url() {
        let provider = CloudflareProvider::new("token", "zone123", "rec456", false);
        assert_eq!(
            provider.record_url(),
            "https://api.cloudflare.com/client/v4/zones/zone123/dns_records/rec456"
        );
    }

    #[test]
    fn test_with_api_base_trims_trailing_slash() {
        let provider = CloudflareProvider::new("token", "z", "r", false)
            .with_api_base("http://127.0.0.1:8080/");
        assert_eq!(provider.record_url(), "http://127.0.0.1:8080/zones/z/dns_records/r");
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            api_token: "tok".to_string(),
            zone_id: "zone-a".to_string(),
            domain: "home.example.com".to_string(),
            record_id: "rec-b".to_string(),
            interval_secs: 300,
        };
        let provider = CloudflareProvider::from_config(&config, true);

        assert!(provider.is_dry_run());
        assert!(provider.record_url().ends_with("/zones/zone-a/dns_records/rec-b"));
    }

    #[test]
    fn test_provider_name() {
        let provider = CloudflareProvider::new("token", "z", "r", false);
        assert_eq!(provider.provider_name(), "cloudflare");
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let provider = CloudflareProvider::new("secret_token_12345", "z", "r", false);

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("CloudflareProvider"));
    }

    #[tokio::test]
    async fn test_update_sends_full_record() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/zones/zone123/dns_records/rec456")
                    .header("authorization", "Bearer test_token")
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "type": "A",
                        "name": "home.example.com",
                        "content": "203.0.113.9",
                        "proxied": false,
                        "ttl": 1,
                    }));
                then.status(200).json_body(json!({ "success": true }));
            })
            .await;

        let outcome = provider_for(&server)
            .update_record(&update_for("203.0.113.9"))
            .await
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Applied);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_rejected_keeps_raw_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/zones/zone123/dns_records/rec456");
                then.status(400).body(r#"{"error":"invalid"}"#);
            })
            .await;

        let err = provider_for(&server)
            .update_record(&update_for("203.0.113.9"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains(r#"{"error":"invalid"}"#), "{err}");
        assert!(matches!(
            err,
            Error::Update(UpdateError::Rejected { status: 400, ref body }) if body == r#"{"error":"invalid"}"#
        ));
    }

    #[tokio::test]
    async fn test_update_only_200_is_success() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT);
                then.status(201).body("created");
            })
            .await;

        let err = provider_for(&server)
            .update_record(&update_for("203.0.113.9"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Update(UpdateError::Rejected { status: 201, .. })));
    }

    #[tokio::test]
    async fn test_update_auth_failure_is_hinted() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT);
                then.status(403).body(r#"{"success":false,"errors":[{"code":10000}]}"#);
            })
            .await;

        let err = provider_for(&server)
            .update_record(&update_for("203.0.113.9"))
            .await
            .unwrap_err();

        let text = err.to_string();
        assert!(text.contains("authentication failed"), "{text}");
        assert!(text.contains(r#""code":10000"#), "{text}");
    }

    #[tokio::test]
    async fn test_update_twice_sends_identical_payloads() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/zones/zone123/dns_records/rec456")
                    .json_body(json!({
                        "type": "A",
                        "name": "home.example.com",
                        "content": "198.51.100.7",
                        "proxied": false,
                        "ttl": 1,
                    }));
                then.status(200);
            })
            .await;

        let provider = provider_for(&server);
        let update = update_for("198.51.100.7");
        provider.update_record(&update).await.unwrap();
        provider.update_record(&update).await.unwrap();

        mock.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn test_dry_run_sends_nothing() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.any_request();
                then.status(200);
            })
            .await;

        let provider = CloudflareProvider::new("test_token", "zone123", "rec456", true)
            .with_api_base(server.base_url());
        let outcome = provider.update_record(&update_for("203.0.113.9")).await.unwrap();

        assert_eq!(outcome, UpdateOutcome::DryRun);
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_update_connection_refused() {
        let provider = CloudflareProvider::new("test_token", "zone123", "rec456", false)
            .with_api_base("http://127.0.0.1:9");

        let err = provider
            .update_record(&update_for("203.0.113.9"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Update(UpdateError::Transport(_))), "{err:?}");
    }
}
