//! Tracing subscriber setup for the binary.

use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Install the stderr logger.
///
/// The base level comes from config; each `-v` steps it up, `-q` drops it to
/// errors only. `RUST_LOG` directives take precedence over both.
pub fn init(config_level: &str, verbose: u8, quiet: bool) {
    let level = effective_level(config_level, verbose, quiet);

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    // A second init (tests driving `run` twice) keeps the first subscriber
    let _ = tracing_subscriber::registry().with(layer).try_init();
}

/// Level after applying `-v` / `-q` to the configured level.
pub fn effective_level(config_level: &str, verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    let base = parse_level(config_level).unwrap_or(LevelFilter::WARN);
    match verbose {
        0 => base,
        1 => base.max(LevelFilter::INFO),
        2 => base.max(LevelFilter::DEBUG),
        _ => LevelFilter::TRACE,
    }
}

pub fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.to_lowercase().as_str() {
        "off" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}
