// ABOUTME: Logging initialization for binaries and tests embedding the capture pipeline
// ABOUTME: Structured tracing output with env-filter control
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Opt-in tracing subscriber setup
//!
//! The library itself only emits `tracing` events; initializing a subscriber
//! belongs to whoever embeds it. These helpers exist so hosts and tests can
//! opt into the standard setup with one call.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging at `info` unless `RUST_LOG` says otherwise
///
/// # Errors
///
/// Returns an error when a global subscriber is already installed.
pub fn init() -> Result<()> {
    init_with_level("info")
}

/// Initialize logging with an explicit default level
///
/// `RUST_LOG` still wins when set.
///
/// # Errors
///
/// Returns an error when a global subscriber is already installed.
pub fn init_with_level(default_level: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}
