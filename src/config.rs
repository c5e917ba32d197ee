use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::basket::{BasketError, BasketParams, RuleMetric};

pub(crate) const STORE_ENV: &str = "SHOPTUI_STORE";
const SETTINGS_FILE: &str = "settings.json";
const DEFAULT_DB: &str = "shoptui.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// Ledger location; `.csv` selects the spreadsheet file store.
    pub(crate) store_path: Option<PathBuf>,
    pub(crate) min_support: f64,
    pub(crate) rule_metric: String,
    pub(crate) min_threshold: f64,
    pub(crate) log_level: String,
    /// Channel pre-filled on a new entry.
    pub(crate) default_channel: String,
}

impl Default for Settings {
    fn default() -> Self {
        let basket = BasketParams::default();
        Self {
            store_path: None,
            min_support: basket.min_support,
            rule_metric: basket.metric.to_string(),
            min_threshold: basket.min_threshold,
            log_level: "info".into(),
            default_channel: String::new(),
        }
    }
}

impl Settings {
    /// A missing file yields defaults; an unreadable or malformed one is an error
    /// the caller may downgrade to a warning.
    pub(crate) fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    pub(crate) fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, format!("{json}\n"))
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        Ok(())
    }

    /// Apply the store override taken from the environment, if any.
    pub(crate) fn with_store_override(mut self, store: Option<String>) -> Self {
        if let Some(path) = store.filter(|s| !s.trim().is_empty()) {
            self.store_path = Some(PathBuf::from(path.trim()));
        }
        self
    }

    pub(crate) fn resolved_store(&self, paths: &AppPaths) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| paths.data_dir.join(DEFAULT_DB))
    }

    pub(crate) fn basket_params(&self) -> Result<BasketParams, BasketError> {
        if !(self.min_support > 0.0 && self.min_support <= 1.0) {
            return Err(BasketError::InvalidSupport(self.min_support));
        }
        Ok(BasketParams {
            min_support: self.min_support,
            metric: self.rule_metric.parse::<RuleMetric>()?,
            min_threshold: self.min_threshold,
        })
    }

    pub(crate) fn basket_params_or_default(&self) -> BasketParams {
        self.basket_params().unwrap_or_else(|e| {
            warn!(error = %e, "Invalid basket settings, using defaults");
            BasketParams::default()
        })
    }
}

/// Per-user directories for settings, the default database and the log file.
#[derive(Debug, Clone)]
pub(crate) struct AppPaths {
    pub(crate) config_dir: PathBuf,
    pub(crate) data_dir: PathBuf,
}

impl AppPaths {
    pub(crate) fn resolve() -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("com", "shoptui", "ShopTUI")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let paths = Self {
            config_dir: proj_dirs.config_dir().to_path_buf(),
            data_dir: proj_dirs.data_dir().to_path_buf(),
        };
        std::fs::create_dir_all(&paths.data_dir).with_context(|| {
            format!("Failed to create data directory: {}", paths.data_dir.display())
        })?;
        Ok(paths)
    }

    pub(crate) fn settings_file(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
