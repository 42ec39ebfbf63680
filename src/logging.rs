//! Tracing subscriber setup for the `hsearch` binary.
//!
//! Filter priority: `HSEARCH_LOG`, then `RUST_LOG`, then the `--verbose`
//! flag (debug for this crate) or the default `info`. Logs go to stderr so
//! CLI output on stdout stays clean.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "HSEARCH_LOG";

/// Installs the global subscriber. Call once, first thing in `main`.
pub fn init(verbose: bool) {
    let filter = build_env_filter(verbose);

    let use_ansi = std::io::IsTerminal::is_terminal(&std::io::stderr());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(use_ansi)
                .with_target(true)
                .compact(),
        )
        .init();
}

fn build_env_filter(verbose: bool) -> EnvFilter {
    if let Ok(directives) = std::env::var(LOG_ENV) {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }

    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    if verbose {
        EnvFilter::new("info,health_search=debug,hsearch=debug")
    } else {
        EnvFilter::new("info")
    }
}
