use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::entry_codec::decode_entries;
use crate::models::Sale;

/// Per-item quantity totals over a set of item-entry fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemTotals {
    totals: BTreeMap<String, u64>,
    skipped: usize,
}

impl ItemTotals {
    pub fn from_sales<'a>(sales: impl IntoIterator<Item = &'a Sale>) -> Self {
        sum_item_amounts(sales.into_iter().map(|s| s.item_text.as_str()))
    }

    /// Total quantity for `name`, 0 when never seen.
    pub fn get(&self, name: &str) -> u64 {
        self.totals.get(name).copied().unwrap_or(0)
    }

    /// Number of malformed segments that were skipped.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Alphabetical iteration.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.totals.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Largest totals first, ties broken by name.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    pub fn grand_total(&self) -> u64 {
        self.totals.values().sum()
    }
}

/// Sum quantities per item name across item-entry texts.
/// Empty texts are skipped; malformed segments are skipped and counted.
pub fn sum_item_amounts<'a>(texts: impl IntoIterator<Item = &'a str>) -> ItemTotals {
    let mut out = ItemTotals::default();
    for text in texts {
        if text.trim().is_empty() {
            continue;
        }
        let decoded = decode_entries(text);
        for entry in decoded.entries {
            *out.totals.entry(entry.name).or_insert(0) += u64::from(entry.quantity);
        }
        for err in &decoded.errors {
            debug!(segment = err.segment(), "Skipping malformed item entry: {err}");
        }
        out.skipped += decoded.errors.len();
    }

    if out.skipped > 0 {
        warn!(skipped = out.skipped, "Malformed item entry segments were skipped");
    }
    out
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
