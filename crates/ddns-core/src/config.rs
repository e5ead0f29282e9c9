//! Configuration for the DDNS updater
//!
//! Settings come from a `.env`-style file. A variable that is also present
//! in the process environment takes precedence over the file, but the
//! process environment is only ever read, never written.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

/// Settings file used when none is given on the command line
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Update interval used when `UPDATE_INTERVAL` is unset (5 minutes)
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 300;

/// Cloudflare API token with DNS edit permission
pub const ENV_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";
/// Identifier of the zone holding the record
pub const ENV_ZONE_ID: &str = "CLOUDFLARE_ZONE_ID";
/// Fully qualified name written into the record
pub const ENV_DOMAIN: &str = "CLOUDFLARE_DOMAIN";
/// Identifier of the record to overwrite
pub const ENV_RECORD_ID: &str = "CLOUDFLARE_RECORD_ID";
/// Seconds to sleep between cycles
pub const ENV_UPDATE_INTERVAL: &str = "UPDATE_INTERVAL";

/// Validated updater configuration
///
/// Built once at startup and passed by reference afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// Zone ID
    pub zone_id: String,

    /// Domain name the record points from (e.g., "home.example.com")
    pub domain: String,

    /// DNS record ID inside the zone
    pub record_id: String,

    /// Seconds between the end of one cycle and the start of the next
    pub interval_secs: u64,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("domain", &self.domain)
            .field("record_id", &self.record_id)
            .field("interval_secs", &self.interval_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from a `.env`-style file
    ///
    /// The file must exist and parse. Variables already present in the
    /// process environment override the file's values.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let load_error = |source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        };

        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(load_error)? {
            let (key, value) = item.map_err(load_error)?;
            vars.insert(key, value);
        }

        tracing::debug!("Read {} setting(s) from {}", vars.len(), path.display());

        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| vars.get(key).cloned()))
    }

    /// Build configuration from an arbitrary lookup function
    ///
    /// Required settings are checked in a fixed order (token, zone, domain,
    /// record) and the first missing one is reported. Empty values count
    /// as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let api_token = required(ENV_API_TOKEN)?;
        let zone_id = required(ENV_ZONE_ID)?;
        let domain = required(ENV_DOMAIN)?;
        let record_id = required(ENV_RECORD_ID)?;

        // Checked only once every required key is present
        let interval_secs = match lookup(ENV_UPDATE_INTERVAL) {
            None => DEFAULT_UPDATE_INTERVAL_SECS,
            Some(raw) if raw.is_empty() => DEFAULT_UPDATE_INTERVAL_SECS,
            Some(raw) => parse_interval(&raw)?,
        };

        let config = Self {
            api_token,
            zone_id,
            domain,
            record_id,
            interval_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Values built through the loader are always valid; this guards
    /// configurations assembled by hand.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            (ENV_API_TOKEN, &self.api_token),
            (ENV_ZONE_ID, &self.zone_id),
            (ENV_DOMAIN, &self.domain),
            (ENV_RECORD_ID, &self.record_id),
        ];
        if let Some((key, _)) = fields.iter().find(|(_, value)| value.is_empty()) {
            return Err(ConfigError::Missing(*key));
        }

        if self.interval_secs == 0 {
            return Err(ConfigError::InvalidInterval {
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Sleep between cycles
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs)
    }
}

fn parse_interval(raw: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidInterval {
        value: raw.to_string(),
        reason,
    };

    match raw.trim().parse::<u64>() {
        Ok(0) => Err(invalid("must be greater than zero".to_string())),
        Ok(secs) => Ok(secs),
        Err(e) => Err(invalid(e.to_string())),
    }
}
