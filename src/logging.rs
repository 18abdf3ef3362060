//! File-based logging setup.
//!
//! The TUI owns stdout, so diagnostics go to a daily-rotated file under the
//! app config directory. `RUST_LOG` overrides the CLI-provided level.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::settings;

/// Initialize the global subscriber. The returned guard must be kept alive
/// for the duration of the process or buffered log lines are dropped.
pub fn init(level: &str) -> Result<WorkerGuard> {
    let log_dir = settings::config_dir().join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::daily(&log_dir, "imgforge.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
