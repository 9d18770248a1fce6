//! # Observability Infrastructure
//!
//! Structured logging for the unigate service via the tracing ecosystem.
//! Every observable event the core emits (account locked, account unlocked,
//! user registered, roles granted, password changed) is a structured
//! `tracing` event with fields; this module wires the subscriber that
//! delivers them.

use tracing_subscriber::{fmt, EnvFilter};

use crate::errors::{Error, Result};

/// Initialize the global tracing subscriber.
///
/// The filter honors `RUST_LOG` and falls back to `info`.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| Error::internal(format!("Failed to initialize tracing: {}", e)))
}
