//! Test doubles and common utilities for engine contract tests
//!
//! The doubles record every call into a shared journal so tests can assert
//! both counts and ordering without touching the network.

#![allow(dead_code)]

use ddns_core::error::{Error, ResolveError, Result};
use ddns_core::traits::{DnsProvider, DnsRecordUpdate, IpSource, ResolvedAddress, UpdateOutcome};
use ddns_core::Config;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Ordered log of calls made by the doubles
pub type Journal = Arc<Mutex<Vec<&'static str>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// An IpSource that always returns the same address
pub struct StaticIpSource {
    address: ResolvedAddress,
    resolve_call_count: Arc<AtomicUsize>,
    journal: Journal,
}

impl StaticIpSource {
    pub fn new(address: &str, journal: Journal) -> Self {
        Self {
            address: ResolvedAddress::from(address),
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
            journal,
        }
    }

    /// Get the number of times resolve() was called
    pub fn resolve_call_count(&self) -> usize {
        self.resolve_call_count.load(Ordering::SeqCst)
    }

    /// Create a new StaticIpSource that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            address: other.address.clone(),
            resolve_call_count: Arc::clone(&other.resolve_call_count),
            journal: Arc::clone(&other.journal),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn resolve(&self) -> Result<ResolvedAddress> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().unwrap().push("resolve");
        Ok(self.address.clone())
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// An IpSource whose echo service is always down
pub struct FailingIpSource {
    resolve_call_count: Arc<AtomicUsize>,
    journal: Journal,
}

impl FailingIpSource {
    pub fn new(journal: Journal) -> Self {
        Self {
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
            journal,
        }
    }

    pub fn resolve_call_count(&self) -> usize {
        self.resolve_call_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            resolve_call_count: Arc::clone(&other.resolve_call_count),
            journal: Arc::clone(&other.journal),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for FailingIpSource {
    async fn resolve(&self) -> Result<ResolvedAddress> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().unwrap().push("resolve");
        Err(ResolveError::Status(503).into())
    }

    fn source_name(&self) -> &'static str {
        "failing"
    }
}

/// A mock DnsProvider that records every payload it receives
pub struct MockDnsProvider {
    /// Payloads received by update_record(), in order
    updates: Arc<Mutex<Vec<DnsRecordUpdate>>>,
    /// Status to reject with, or None to accept
    reject_with: Option<(u16, &'static str)>,
    journal: Journal,
}

impl MockDnsProvider {
    pub fn new(journal: Journal) -> Self {
        Self {
            updates: Arc::new(Mutex::new(Vec::new())),
            reject_with: None,
            journal,
        }
    }

    /// A provider that rejects every update with `status` and `body`
    pub fn rejecting(journal: Journal, status: u16, body: &'static str) -> Self {
        Self {
            reject_with: Some((status, body)),
            ..Self::new(journal)
        }
    }

    /// Get the number of times update_record() was called
    pub fn update_call_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    /// Get the payloads that were sent
    pub fn updates(&self) -> Vec<DnsRecordUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Create a new MockDnsProvider that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            updates: Arc::clone(&other.updates),
            reject_with: other.reject_with,
            journal: Arc::clone(&other.journal),
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn update_record(&self, update: &DnsRecordUpdate) -> Result<UpdateOutcome> {
        self.updates.lock().unwrap().push(update.clone());
        self.journal.lock().unwrap().push("update");

        match self.reject_with {
            Some((status, body)) => Err(Error::rejected(status, body)),
            None => Ok(UpdateOutcome::Applied),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a minimal Config for testing
pub fn minimal_config(domain: &str) -> Config {
    Config {
        api_token: "test-token".to_string(),
        zone_id: "test-zone".to_string(),
        domain: domain.to_string(),
        record_id: "test-record".to_string(),
        interval_secs: 300,
    }
}
