//! Logging and tracing utilities for smartex
//!
//! This module provides structured logging using the `tracing` crate,
//! with support for spans, events, and instrumentation.

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether tracing has been initialized
static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "warn,smartex=info";

/// Initialize the default tracing subscriber
///
/// This should be called once at application startup. Multiple calls are safe
/// and will be ignored.
pub fn init_default() {
    init_with_config(TracingConfig::default());
}

/// Initialize tracing with a custom configuration
pub fn init_with_config(config: TracingConfig) {
    if TRACING_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
        .is_ok()
    {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_level));

        let fmt_layer = fmt::layer()
            .with_target(config.show_target)
            .with_thread_ids(config.show_thread_ids)
            .with_file(config.show_file)
            .with_line_number(config.show_line_number)
            .with_writer(std::io::stderr);

        // Another subscriber may already be installed by the host application
        let _ = tracing_subscriber::registry().with(fmt_layer).with(filter).try_init();
    }
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Default log level filter (e.g., "info", "debug", "warn")
    pub default_level: String,
    /// Show the target (module path) in log output
    pub show_target: bool,
    /// Show thread IDs in log output
    pub show_thread_ids: bool,
    /// Show source file in log output
    pub show_file: bool,
    /// Show line number in log output
    pub show_line_number: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: DEFAULT_FILTER.to_string(),
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
        }
    }
}

/// Log the start of one fallback attempt
#[macro_export]
macro_rules! log_attempt_start {
    ($encoding:expr, $url:expr) => {
        tracing::debug!(encoding = %$encoding, url = %$url, "Trying encoding");
    };
}

/// Log a failed attempt; the loader moves on to the next encoding
#[macro_export]
macro_rules! log_attempt_failed {
    ($encoding:expr, $url:expr, $error:expr) => {
        tracing::warn!(
            encoding = %$encoding,
            url = %$url,
            error = %$error,
            "Attempt failed, falling back"
        );
    };
}

/// Log a successful load
#[macro_export]
macro_rules! log_load_complete {
    ($encoding:expr, $url:expr, $texture:expr) => {
        tracing::info!(
            encoding = %$encoding,
            url = %$url,
            format = %$texture.format,
            width = $texture.width,
            height = $texture.height,
            mip_count = $texture.mip_count(),
            "Texture loaded"
        );
    };
}

/// Log an exhausted fallback chain
#[macro_export]
macro_rules! log_load_exhausted {
    ($url:expr, $attempts:expr) => {
        tracing::error!(url = %$url, attempts = $attempts, "No supported encoding could be loaded");
    };
}

/// Instrument a parsing operation with timing
pub fn instrument_parse<T, F>(name: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let span = tracing::debug_span!("parse", parser = %name);
    let _guard = span.enter();

    let start = std::time::Instant::now();
    let result = f();
    let duration = start.elapsed();

    tracing::debug!(duration_us = %duration.as_micros(), "Parse operation complete");

    result
}
