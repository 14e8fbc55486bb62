//! Log file setup.
//!
//! The dashboard owns the terminal (alternate screen), so all tracing output
//! goes to a file. `RUST_LOG` overrides the default `info` filter.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber, appending to `log_file`.
pub fn init(log_file: &Path) -> Result<(), AppError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| {
            AppError::terminal(format!("Failed to open log file '{}': {e}", log_file.display()))
        })?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| AppError::terminal(format!("Failed to initialise logging: {e}")))
}
