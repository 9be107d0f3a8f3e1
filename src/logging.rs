//! `tracing` subscriber bootstrap.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

/// Filter directives applied when `RUST_LOG` is not set.
pub fn default_directives(config: &EnvConfig) -> &'static str {
    if config.debug {
        "debug"
    } else {
        "warn"
    }
}

/// Builds the effective filter: `RUST_LOG` wins, then `DEBUG`, then `warn`.
pub fn build_filter(config: &EnvConfig) -> EnvFilter {
    config
        .log_filter
        .as_deref()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directives(config)))
}

/// Installs the global subscriber. Logs go to the `SOCRATIC_LOG` file when
/// one is configured, otherwise to stderr.
pub fn init_logging(config: &EnvConfig) -> io::Result<()> {
    let filter = build_filter(config);
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = match config.log_file.as_deref() {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder
            .with_ansi(config.color_enabled())
            .with_writer(io::stderr)
            .try_init(),
    };

    result.map_err(|error| io::Error::other(format!("failed to install logger: {error}")))
}
