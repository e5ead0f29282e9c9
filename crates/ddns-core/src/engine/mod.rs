//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Resolving the public IP via IpSource
//! - Overwriting the configured record via DnsProvider
//! - Repeating on a fixed interval until told to stop
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ResolvedAddress   ┌──────────────┐   DnsRecordUpdate   ┌─────────────┐
//! │  IpSource   │ ──────────────────▶ │  DdnsEngine  │ ──────────────────▶ │ DnsProvider │
//! └─────────────┘                     └──────────────┘                     └─────────────┘
//!                                            │
//!                                            ▼
//!                                     ┌─────────────┐
//!                                     │   Events    │
//!                                     └─────────────┘
//! ```
//!
//! ## Cycle
//!
//! 1. Resolve the public IP
//! 2. Build the record from config + address
//! 3. PUT it unconditionally (no comparison with the previous value)
//! 4. Sleep the configured interval, whatever the outcome
//!
//! A failed step ends the cycle early. The next tick is the only retry.

use crate::config::Config;
use crate::error::Result;
use crate::traits::{DnsProvider, DnsRecordUpdate, IpSource, ResolvedAddress, UpdateOutcome};
use std::future::Future;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

/// Capacity of the engine event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        record_name: String,
        interval_secs: u64,
    },

    /// Public IP resolved
    IpResolved { address: ResolvedAddress },

    /// Public IP could not be resolved, no update attempted
    ResolveFailed { error: String },

    /// DNS record overwritten (or logged, in dry-run mode)
    UpdateSucceeded {
        record_name: String,
        address: ResolvedAddress,
        outcome: UpdateOutcome,
    },

    /// DNS update failed
    UpdateFailed { record_name: String, error: String },

    /// Engine stopped
    Stopped { reason: String },
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Either call [`DdnsEngine::run_cycle()`] yourself, or
/// 3. Loop with [`DdnsEngine::run_until()`] / [`DdnsEngine::run_with_shutdown()`]
///
/// ## Threading
///
/// Everything runs on the caller's task. There is no shared mutable state
/// between cycles: each one starts from the config and nothing else.
pub struct DdnsEngine {
    /// IP source for resolving the public address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for writing the record
    provider: Box<dyn DnsProvider>,

    /// Immutable settings
    config: Config,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// Fails if `config` is incomplete, before any network call.
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events.
    /// Dropping the receiver is fine; events are then discarded.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: Config,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let engine = Self {
            ip_source,
            provider,
            config,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run a single resolve → update cycle
    ///
    /// # Returns
    ///
    /// - `Ok(ResolvedAddress)`: The address now in the record
    /// - `Err(Error::Resolve(_))`: Resolution failed, provider not called
    /// - `Err(Error::Update(_))`: Provider rejected or unreachable
    pub async fn run_cycle(&self) -> Result<ResolvedAddress> {
        let address = match self.ip_source.resolve().await {
            Ok(address) => address,
            Err(e) => {
                self.emit_event(EngineEvent::ResolveFailed {
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        debug!(
            "Resolved public IP {} via {}",
            address,
            self.ip_source.source_name()
        );
        self.emit_event(EngineEvent::IpResolved {
            address: address.clone(),
        });

        let update = DnsRecordUpdate::a_record(&self.config.domain, &address);

        match self.provider.update_record(&update).await {
            Ok(outcome) => {
                match outcome {
                    UpdateOutcome::Applied => {
                        info!(
                            "Successfully updated DNS record for {} to {}",
                            self.config.domain, address
                        );
                    }
                    UpdateOutcome::DryRun => {
                        info!(
                            "[DRY-RUN] DNS record for {} would be set to {}",
                            self.config.domain, address
                        );
                    }
                }
                self.emit_event(EngineEvent::UpdateSucceeded {
                    record_name: self.config.domain.clone(),
                    address: address.clone(),
                    outcome,
                });
                Ok(address)
            }
            Err(e) => {
                self.emit_event(EngineEvent::UpdateFailed {
                    record_name: self.config.domain.clone(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Run the engine until `shutdown_rx` fires or its sender is dropped
    pub async fn run_with_shutdown(&self, shutdown_rx: tokio::sync::oneshot::Receiver<()>) {
        self.run_until(async move {
            let _ = shutdown_rx.await;
        })
        .await
    }

    /// Run cycles forever, stopping when `shutdown` completes
    ///
    /// The first cycle starts immediately. Every cycle, successful or not,
    /// is followed by the same fixed sleep. `shutdown` is watched both
    /// during a cycle and during the sleep; an in-flight request is dropped.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let interval = self.config.interval();
        info!(
            "Starting DDNS updater for domain: {} (interval: {}s, source: {}, provider: {})",
            self.config.domain,
            self.config.interval_secs,
            self.ip_source.source_name(),
            self.provider.provider_name()
        );
        self.emit_event(EngineEvent::Started {
            record_name: self.config.domain.clone(),
            interval_secs: self.config.interval_secs,
        });

        loop {
            tokio::select! {
                result = self.run_cycle() => {
                    if let Err(e) = result {
                        // Continue running despite errors
                        error!("Error updating DNS: {}", e);
                    }
                }
                _ = &mut shutdown => break,
            }

            if let Some(next_at) = chrono::Duration::from_std(interval)
                .ok()
                .and_then(|delta| chrono::Utc::now().checked_add_signed(delta))
            {
                debug!("Next update at {}", next_at.to_rfc3339());
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown => break,
            }
        }

        info!("Shutdown signal received, engine stopped");
        self.emit_event(EngineEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Drain the engine event receiver.");
            }
            // Nobody is listening
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
