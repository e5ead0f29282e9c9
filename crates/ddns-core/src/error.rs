//! Error types for the DDNS system
//!
//! Every failure falls into one of three kinds, matching where it happens:
//! loading configuration, resolving the public IP, or updating the DNS
//! record. Callers branch on the kind; the inner text is diagnostic only.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed settings (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Public IP could not be determined (fatal to the current cycle only)
    #[error("IP resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// DNS record could not be updated (fatal to the current cycle only)
    #[error("DNS update error: {0}")]
    Update(#[from] UpdateError),
}

/// Configuration loading failures
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file could not be read or parsed
    #[error("failed to load settings from {}: {source}", .path.display())]
    Load {
        /// Path of the settings file
        path: PathBuf,
        /// Underlying parser error
        #[source]
        source: dotenvy::Error,
    },

    /// A required setting is absent or empty
    #[error("{0} is required")]
    Missing(&'static str),

    /// The update interval is not a positive integer
    #[error("invalid interval: UPDATE_INTERVAL={value:?} ({reason})")]
    InvalidInterval {
        /// Raw value as found in the settings
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Public IP resolution failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Connection, TLS or timeout failure before a response arrived
    #[error("request to IP echo service failed: {0}")]
    Transport(String),

    /// The echo service answered with something other than 200
    #[error("IP echo service returned status {0}")]
    Status(u16),

    /// The response body could not be read
    #[error("failed to read IP echo response: {0}")]
    Body(String),

    /// The response body is not the expected JSON document
    #[error("malformed IP echo response: {0}")]
    Decode(String),
}

/// DNS record update failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// Connection, TLS or timeout failure before a response arrived
    #[error("request to DNS provider failed: {0}")]
    Transport(String),

    /// The provider answered with something other than 200
    ///
    /// `body` is the provider's response text, untouched.
    #[error("{} (status {status}): {body}", status_reason(.status))]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },
}

impl UpdateError {
    /// HTTP status of a rejected update, if the provider answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            UpdateError::Rejected { status, .. } => Some(*status),
            UpdateError::Transport(_) => None,
        }
    }
}

fn status_reason(status: &u16) -> &'static str {
    match status {
        401 | 403 => "authentication failed, check the API token and its permissions",
        404 => "zone or DNS record not found",
        429 => "rate limited by provider",
        500..=599 => "provider server error",
        _ => "provider rejected the update",
    }
}

impl Error {
    /// Create an update transport error
    pub fn update_transport(msg: impl Into<String>) -> Self {
        Self::Update(UpdateError::Transport(msg.into()))
    }

    /// Create a rejected-update error carrying the raw provider response
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Update(UpdateError::Rejected {
            status,
            body: body.into(),
        })
    }
}
