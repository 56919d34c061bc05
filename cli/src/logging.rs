//! Logging initialization.
//!
//! - **RUST_LOG**: filter, e.g. `prism=debug`. Default: `warn`, or `info` with `--verbose`.
//! - **PRISM_LOG_DIR**: when set, logs go to a daily-rolling `prism.log` in that
//!   directory (plain text); otherwise to stderr, so stdout carries only the answer.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "prism.log";

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "info,hyper_util=off"
    } else {
        "warn"
    }
}

/// Installs the global subscriber. Keep the returned guard alive until exit so the
/// file writer flushes.
pub fn init(verbose: bool) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    match std::env::var_os("PRISM_LOG_DIR").filter(|d| !d.is_empty()) {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(file_layer).try_init()?;
            tracing::info!(dir = ?dir, "prism logging to file");
            Ok(Some(guard))
        }
        None => {
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter);
            tracing_subscriber::registry().with(stderr_layer).try_init()?;
            Ok(None)
        }
    }
}
