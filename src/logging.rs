//! File logging.
//!
//! The terminal belongs to the UI, so log output goes to a file through a
//! non-blocking writer. Keep the returned guard alive until exit or buffered
//! lines are lost.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

#[allow(dead_code)]
pub struct LogGuard(tracing_appender::non_blocking::WorkerGuard);

/// `~/.nimbus/logs/nimbus.log`
pub fn default_log_path() -> Option<PathBuf> {
    Settings::config_dir().map(|d| d.join("logs").join("nimbus.log"))
}

/// Install the global subscriber writing to `log_file` (or the default
/// path). Returns `None` when the file cannot be opened; the browser then
/// runs without logging.
pub fn init(log_file: Option<&Path>) -> Option<LogGuard> {
    let path = match log_file {
        Some(p) => p.to_path_buf(),
        None => default_log_path()?,
    };
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("nimbus: cannot create log directory {}: {}", parent.display(), e);
            return None;
        }
    }

    let file = match fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("nimbus: cannot open log file {}: {}", path.display(), e);
            return None;
        }
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let env_filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|val| EnvFilter::try_new(val).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    // File log: plain formatting, no ANSI/color codes
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        return None;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), log = %path.display(), "nimbus starting");
    Some(LogGuard(guard))
}
