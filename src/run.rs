mod cli;
mod tui;

use anyhow::Result;
use tracing::info;

use crate::config::{AppPaths, Settings};
use crate::store::{open_store, Ledger};

pub(crate) use cli::{as_cli, shellexpand};
pub(crate) use tui::as_tui;

/// Open the configured store and load the whole ledger.
pub(crate) fn open_ledger(settings: &Settings, paths: &AppPaths) -> Result<Ledger> {
    let path = settings.resolved_store(paths);
    let ledger = Ledger::open(open_store(&path)?)?;
    info!(rows = ledger.sales().len(), store = %ledger.location(), "Opened ledger");
    Ok(ledger)
}
