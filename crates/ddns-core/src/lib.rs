// # ddns-core
//
// Core library for the Cloudflare dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for dynamic DNS updates:
// - **IpSource**: Trait for resolving the current public IP
// - **DnsProvider**: Trait for overwriting a DNS record via a provider API
// - **DdnsEngine**: Runs the resolve → update cycle on a fixed interval
// - **Config**: Validated settings loaded from a `.env` file
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from HTTP implementations
// 2. **Explicit Configuration**: Settings are passed by value, never via globals
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Stateless Cycles**: Each cycle is an unconditional overwrite

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, DnsRecordUpdate, IpSource, ResolvedAddress, UpdateOutcome};
pub use engine::{DdnsEngine, EngineEvent};
pub use config::Config;
pub use error::{ConfigError, Error, ResolveError, Result, UpdateError};
