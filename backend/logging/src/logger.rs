//! Structured Logger
//!
//! Wraps `tracing` with a console layer plus a JSON layer on a daily
//! rolling file (NDJSON). `RUST_LOG` overrides the configured level.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File name prefix; the appender adds the `.YYYY-MM-DD` suffix.
pub const LOG_FILE_PREFIX: &str = "bargain.log";

/// Target used by [`crate::NegotiationEventLogger`].
pub const EVENT_TARGET: &str = "negotiation_events";

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Same as [`env_filter`] minus per-transition negotiation events.
fn console_filter(level: &str) -> EnvFilter {
    let filter = env_filter(level);
    match format!("{EVENT_TARGET}=off").parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Initialize the global logger with console output and a rolling file under `log_dir`.
///
/// Negotiation events go to the file only. A second call is a no-op.
pub fn init_logger<P: AsRef<Path>>(log_dir: P, level: &str) -> Result<()> {
    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(env_filter(level));

    // stderr keeps log lines out of the board printed on stdout.
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true)
        .with_filter(console_filter(level));

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
    Ok(())
}

/// Console-only logger for commands that should not touch the filesystem.
pub fn init_console_logger(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter(level)),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_log_dir() {
        let dir = std::env::temp_dir().join(format!("bargain-log-test-{}", std::process::id()));
        let nested = dir.join("nested");
        init_logger(&nested, "warn").unwrap();
        assert!(nested.is_dir());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
