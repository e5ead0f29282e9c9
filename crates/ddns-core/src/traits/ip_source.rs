// # IP Source Trait
//
// Defines the interface for discovering the host's current public IP.
//
// ## Implementations
//
// - HTTP echo service (ipify): `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let address = source.resolve().await?;
//     println!("public IP: {}", address);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;

/// Public address as reported by an IP source
///
/// The text is kept exactly as the source returned it. No parsing or
/// validation happens here: whatever the echo service said is what ends up
/// in the DNS record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedAddress(String);

impl ResolvedAddress {
    /// Wrap an address string as returned by the source
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The address text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResolvedAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for ResolvedAddress {
    fn from(address: String) -> Self {
        Self(address)
    }
}

/// Trait for IP source implementations
///
/// # Trust Level: Semi-Trusted
///
/// ## Allowed Capabilities
/// - ✅ One outbound request per `resolve()` call
///
/// ## Forbidden Capabilities
/// - ❌ Perform DNS updates (use `DnsProvider`)
/// - ❌ Retry or sleep (the engine's next tick is the retry)
/// - ❌ Cache an address across calls
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(ResolvedAddress)`: The address, verbatim
    /// - `Err(Error::Resolve(_))`: Transport, status or decode failure
    async fn resolve(&self) -> Result<ResolvedAddress, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
