//! Logging init: fmt subscriber on stderr, level picked from `-v` unless
//! `RUST_LOG` is set.

use tracing_subscriber::EnvFilter;

pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs the global subscriber. A second call is a no-op, so tests and
/// embedders that already set one up are left alone.
pub fn init_logging(verbose: u8, no_color: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .try_init();
}
