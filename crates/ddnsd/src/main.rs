// # ddnsd - DDNS Daemon
//
// Keeps one Cloudflare DNS record pointed at this host's public IP.
//
// This is a THIN integration layer: it parses the command line, sets up
// logging, loads the settings file and hands everything to `DdnsEngine`.
// All update logic lives in ddns-core and the provider/source crates.
//
// ## Configuration
//
// Settings are read from a `.env` file (`--env`, default `.env`). A
// variable also present in the process environment wins over the file.
//
// - `CLOUDFLARE_API_TOKEN`: API token with DNS edit permission (required)
// - `CLOUDFLARE_ZONE_ID`: Zone ID (required)
// - `CLOUDFLARE_DOMAIN`: Record name, e.g. home.example.com (required)
// - `CLOUDFLARE_RECORD_ID`: Record ID (required)
// - `UPDATE_INTERVAL`: Seconds between updates (optional, default 300)
//
// Daemon options may also come from the environment:
//
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `DDNS_MODE=dry-run`: same as `--dry-run`
// - `DDNS_IP_SOURCE_URL`: IP echo service (default ipify)
//
// ## Example
//
// ```bash
// cat > .env <<EOF
// CLOUDFLARE_API_TOKEN=your_token
// CLOUDFLARE_ZONE_ID=your_zone
// CLOUDFLARE_DOMAIN=home.example.com
// CLOUDFLARE_RECORD_ID=your_record
// EOF
//
// ddnsd --env .env
// ```

use anyhow::{Context, Result};
use clap::Parser;
use ddns_core::config::DEFAULT_ENV_FILE;
use ddns_core::{Config, DdnsEngine};
use ddns_ip_http::{DEFAULT_IP_ECHO_URL, HttpIpSource};
use ddns_provider_cloudflare::{CLOUDFLARE_API_BASE, CloudflareProvider};
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected, or a failed `--once` cycle)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Command line interface
#[derive(Parser, Debug)]
#[command(
    name = "ddnsd",
    version,
    about = "Keep a Cloudflare DNS record pointed at this host's public IP"
)]
struct Cli {
    /// Path to .env file
    #[arg(long = "env", value_name = "FILE", default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Run a single update cycle and exit
    #[arg(long)]
    once: bool,

    /// Log the intended update instead of sending it (also DDNS_MODE=dry-run)
    #[arg(long)]
    dry_run: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, value_name = "LEVEL", env = "DDNS_LOG_LEVEL", default_value = "info")]
    log_level: Level,

    /// IP echo service answering {"ip": "<address>"}
    #[arg(long, value_name = "URL", env = "DDNS_IP_SOURCE_URL", default_value = DEFAULT_IP_ECHO_URL)]
    ip_echo_url: String,

    /// Cloudflare API base URL
    #[arg(long, value_name = "URL", env = "DDNS_CLOUDFLARE_API_BASE", default_value = CLOUDFLARE_API_BASE, hide = true)]
    api_base: String,
}

impl Cli {
    /// Dry-run is on if either the flag or DDNS_MODE asks for it
    fn dry_run_requested(&self) -> bool {
        self.dry_run
            || std::env::var("DDNS_MODE")
                .unwrap_or_default()
                .eq_ignore_ascii_case("dry-run")
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    // Fatal before any network call
    let config = match Config::from_env_file(&cli.env_file) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Error loading config: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // One logical thread of execution
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(&cli, config).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(cli: &Cli, config: Config) -> Result<()> {
    let dry_run = cli.dry_run_requested();
    if dry_run {
        warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
    }

    let engine = build_engine(cli, config, dry_run)?;

    if cli.once {
        let address = engine
            .run_cycle()
            .await
            .context("update cycle failed")?;
        info!("Single update cycle complete: {}", address);
        return Ok(());
    }

    let shutdown = shutdown_signal()?;
    engine
        .run_until(async move {
            let signal = shutdown.await;
            info!("Received shutdown signal: {}", signal);
        })
        .await;

    info!("Shutting down daemon");
    Ok(())
}

/// Wire the HTTP IP source and the Cloudflare provider into an engine
///
/// The event receiver is dropped right away: nobody consumes engine events
/// here and logging covers them. A held but unread receiver would fill up
/// after a few dozen cycles.
fn build_engine(cli: &Cli, config: Config, dry_run: bool) -> Result<DdnsEngine> {
    let ip_source = HttpIpSource::with_url(cli.ip_echo_url.clone());
    let provider =
        CloudflareProvider::from_config(&config, dry_run).with_api_base(cli.api_base.clone());

    let (engine, _) = DdnsEngine::new(Box::new(ip_source), Box::new(provider), config)
        .context("failed to create DDNS engine")?;

    Ok(engine)
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// Handlers are installed eagerly so a failure surfaces at startup.
///
/// # Returns
///
/// A future resolving to the name of the signal received.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
        "SIGINT"
    })
}
