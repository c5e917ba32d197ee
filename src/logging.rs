use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub(crate) const LOG_ENV: &str = "SHOPTUI_LOG";
pub(crate) const LOG_FILE: &str = "shoptui.log";

/// `SHOPTUI_LOG` wins over the configured level; an unparsable level falls back to `info`.
fn build_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Send tracing output to `<data_dir>/shoptui.log`. The terminal belongs to
/// the dashboard, so nothing is written to stdout or stderr.
pub(crate) fn init(data_dir: &Path, level: &str) -> Result<()> {
    let path = data_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))
}
