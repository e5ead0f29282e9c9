// # DNS Provider Trait
//
// Defines the interface for writing a DNS record via a provider API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, DnsRecordUpdate, ResolvedAddress};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let update = DnsRecordUpdate::a_record("home.example.com", &ResolvedAddress::from("203.0.113.9"));
//     provider.update_record(&update).await?;
//
//     Ok(())
// }
// ```

use crate::traits::ip_source::ResolvedAddress;
use async_trait::async_trait;
use serde::Serialize;

/// Record type written on every update
pub const RECORD_TYPE_A: &str = "A";

/// Cloudflare's TTL sentinel for "automatic"
pub const AUTOMATIC_TTL: u32 = 1;

/// Desired end state of the managed DNS record
///
/// Serializes to exactly the provider payload:
///
/// ```json
/// {"type":"A","name":"home.example.com","content":"203.0.113.9","proxied":false,"ttl":1}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsRecordUpdate {
    /// Record type
    #[serde(rename = "type")]
    pub record_type: String,

    /// Record name (the configured domain)
    pub name: String,

    /// Record content (the resolved address)
    pub content: String,

    /// Whether traffic is proxied by the provider
    pub proxied: bool,

    /// Time-to-live, `AUTOMATIC_TTL` lets the provider choose
    pub ttl: u32,
}

impl DnsRecordUpdate {
    /// Unproxied A record with automatic TTL
    pub fn a_record(name: impl Into<String>, address: &ResolvedAddress) -> Self {
        Self {
            record_type: RECORD_TYPE_A.to_string(),
            name: name.into(),
            content: address.as_str().to_string(),
            proxied: false,
            ttl: AUTOMATIC_TTL,
        }
    }
}

/// Result of a DNS update operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The provider accepted the new record
    Applied,
    /// Dry-run mode: the request was logged, not sent
    DryRun,
}

/// Trait for DNS provider implementations
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Return success or failure (the engine's next tick is the retry)
///
/// ## Forbidden Capabilities
/// - ❌ Spawn tasks or threads
/// - ❌ Implement retry logic or backoff
/// - ❌ Read the record first to decide whether an update is needed
/// - ❌ Cache state beyond a single request
///
/// Every call is an unconditional overwrite. Sending the same update twice
/// must produce the same request twice.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Overwrite the managed record with `update`
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateOutcome)`: The record was written (or would have been)
    /// - `Err(Error::Update(_))`: Transport failure or provider rejection
    async fn update_record(&self, update: &DnsRecordUpdate)
    -> Result<UpdateOutcome, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
