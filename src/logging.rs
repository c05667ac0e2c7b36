//! Logging Setup
//!
//! Installs the global `tracing` subscriber for the binaries. `RUST_LOG`
//! wins over the configured level. Logs go to stderr so command output on
//! stdout stays machine readable.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

use crate::config::LoggingConfig;

/// Filter used when `RUST_LOG` is unset
pub fn default_directives(config: &LoggingConfig, extra: &[&str]) -> String {
    let mut directives = vec![format!("techplan={}", config.level)];
    directives.extend(extra.iter().map(|d| d.to_string()));
    directives.join(",")
}

/// Install the subscriber. `extra` adds directives for other crates, e.g.
/// `tower_http=debug` for the dev server.
pub fn init(config: &LoggingConfig, extra: &[&str]) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config, extra)));

    let registry = tracing_subscriber::registry().with(filter);

    match config.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        _ => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    }
}
