//! Tracing subscriber setup.
//!
//! The terminal belongs to the TUI, so log output goes to a file.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|base| base.join("pkgmark").join("pkgmark.log"))
}

/// Installs the global subscriber writing to `log_file_path`.
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init_global(log_file_path: &Path) -> Result<()> {
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory: {}", parent.display()))?;
    }
    let log_file = File::create(log_file_path)
        .with_context(|| format!("failed to create log file: {}", log_file_path.display()))?;

    build_subscriber(log_file)
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_ansi(false).with_writer(Arc::new(log_file));

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}
