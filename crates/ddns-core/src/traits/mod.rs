//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Discover the current public IP
//! - [`DnsProvider`]: Overwrite a DNS record via a provider API

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, ResolvedAddress};
pub use dns_provider::{DnsProvider, DnsRecordUpdate, UpdateOutcome, AUTOMATIC_TTL, RECORD_TYPE_A};
