//! Tracing configuration and log routing.
//!
//! Logs go to stdout with a compact formatter and to a daily-rolling `pdf-qa.log` under
//! `PDF_QA_LOG_DIR` (default `logs`). Setting `PDF_QA_LOG_DIR` to an empty value keeps logging
//! on stdout only.
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_DIR_VAR: &str = "PDF_QA_LOG_DIR";
const DEFAULT_LOG_DIR: &str = "logs";
const LOG_FILE_PREFIX: &str = "pdf-qa.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber: `RUST_LOG` filtering (default `info`), stdout, and the file sink.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();
    let file_layer = log_directory(std::env::var(LOG_DIR_VAR).ok())
        .and_then(file_writer)
        .map(|writer| {
            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

/// Resolve the log directory from the raw `PDF_QA_LOG_DIR` value; `None` disables file logging.
fn log_directory(value: Option<String>) -> Option<PathBuf> {
    match value {
        None => Some(PathBuf::from(DEFAULT_LOG_DIR)),
        Some(dir) if dir.trim().is_empty() => None,
        Some(dir) => Some(PathBuf::from(dir.trim())),
    }
}

fn file_writer(dir: PathBuf) -> Option<NonBlocking> {
    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("Failed to create log directory {}: {err}", dir.display());
        return None;
    }
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    // Dropping the guard would stop the background writer.
    let _ = LOG_GUARD.set(guard);
    Some(non_blocking)
}
