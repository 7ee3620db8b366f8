//! Structured logging setup for host applications.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the host, which may call [`init`] or bring its own.
//!
//! # Telemetry invariants
//!
//! - **No key material, access tokens, or field values** appear in any span
//!   attribute or log field. Entity names, field names, session ids, key
//!   fingerprints and error descriptions are fine.
//! - Log level comes from `FIELDCRYPT_LOG_LEVEL` (default: `info`);
//!   `RUST_LOG` overrides it.

use anyhow::{Context, Result};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Initialise a JSON tracing subscriber.
///
/// `fieldcrypt` events are enabled at `log_level`; every other target (the
/// HTTP stack included) stays at `warn` unless `RUST_LOG` says otherwise.
///
/// # Errors
///
/// Returns an error if `log_level` is not a valid level or a global subscriber
/// has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => default_filter(log_level)?,
    };

    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise fieldcrypt tracing subscriber: {e}"))
}

fn default_filter(log_level: &str) -> Result<EnvFilter> {
    let level: LevelFilter = log_level
        .parse()
        .with_context(|| format!("invalid log level {log_level:?}"))?;
    Ok(EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(format!("{}={level}", env!("CARGO_CRATE_NAME"))))
}
