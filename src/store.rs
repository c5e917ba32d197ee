use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::db::Database;
use crate::models::Sale;
use crate::sheet::SheetFile;

/// A backing store holding the whole ledger. Writes are bulk overwrites.
pub(crate) trait SaleStore {
    fn load(&self) -> Result<Vec<Sale>>;
    fn replace_all(&mut self, sales: &[Sale]) -> Result<()>;
    /// Human-readable location for status lines and logs.
    fn location(&self) -> String;
}

/// `.csv` paths open a spreadsheet file, anything else a SQLite database.
pub(crate) fn open_store(path: &Path) -> Result<Box<dyn SaleStore>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        Ok(Box::new(SheetFile::new(path)))
    } else {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(Box::new(Database::open(path)?))
    }
}

/// The in-memory ledger and the store it came from.
pub(crate) struct Ledger {
    store: Box<dyn SaleStore>,
    sales: Vec<Sale>,
}

impl Ledger {
    pub(crate) fn open(store: Box<dyn SaleStore>) -> Result<Self> {
        let mut ledger = Self {
            store,
            sales: Vec::new(),
        };
        ledger.reload()?;
        Ok(ledger)
    }

    pub(crate) fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub(crate) fn location(&self) -> String {
        self.store.location()
    }

    /// Drop in-memory state and read everything back from the store.
    pub(crate) fn reload(&mut self) -> Result<()> {
        self.sales = self
            .store
            .load()
            .with_context(|| format!("Failed to load sales from {}", self.store.location()))?;
        Ok(())
    }

    /// Overwrite the store with `rows`, then reload.
    pub(crate) fn commit(&mut self, rows: &[Sale]) -> Result<()> {
        self.store
            .replace_all(rows)
            .with_context(|| format!("Failed to save sales to {}", self.store.location()))?;
        self.reload()
    }

    pub(crate) fn append(&mut self, sale: Sale) -> Result<()> {
        let job_id = sale.job_id;
        let mut rows = self.sales.clone();
        rows.push(sale);
        self.commit(&rows)?;
        info!(job_id, "Appended sale");
        Ok(())
    }

    pub(crate) fn append_all(&mut self, new_rows: Vec<Sale>) -> Result<usize> {
        let count = new_rows.len();
        let mut rows = self.sales.clone();
        rows.extend(new_rows);
        self.commit(&rows)?;
        Ok(count)
    }

    /// Merge edited rows into the full ledger and commit.
    ///
    /// Keys are positions in [`Ledger::sales`], so rows that share a job
    /// number are kept apart and an edit may change the job number itself.
    /// A position past the end means the edits are stale; nothing is written.
    pub(crate) fn apply_edits(&mut self, edits: &BTreeMap<usize, Sale>) -> Result<usize> {
        if edits.is_empty() {
            return Ok(0);
        }
        let mut rows = self.sales.clone();
        for (&position, edited) in edits {
            let Some(row) = rows.get_mut(position) else {
                anyhow::bail!(
                    "Edited row {} no longer exists ({} rows loaded); reload and edit again",
                    position + 1,
                    rows.len()
                );
            };
            *row = edited.clone();
        }
        self.commit(&rows)?;
        info!(edited = edits.len(), "Saved edits");
        Ok(edits.len())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
