use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::items::ItemTotals;
use crate::models::Sale;

/// Sorted distinct basket item names across `rows`.
pub(crate) fn unique_items(rows: &[&Sale]) -> Vec<String> {
    rows.iter()
        .flat_map(|s| s.basket())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted distinct channel labels across `rows`.
pub(crate) fn channels(rows: &[Sale]) -> Vec<String> {
    rows.iter()
        .map(|s| s.channel.clone())
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ── Summary statistics ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColumnStats {
    pub(crate) column: &'static str,
    pub(crate) count: usize,
    pub(crate) mean: f64,
    /// Sample standard deviation; `None` below two values.
    pub(crate) std: Option<f64>,
    pub(crate) min: f64,
    pub(crate) q25: f64,
    pub(crate) median: f64,
    pub(crate) q75: f64,
    pub(crate) max: f64,
}

type Extractor = fn(&Sale) -> f64;

const NUMERIC_COLUMNS: &[(&str, Extractor)] = &[
    ("Job #", |s: &Sale| s.job_id as f64),
    ("Amount", |s: &Sale| to_f64(s.amount)),
    ("Shipping", |s: &Sale| to_f64(s.shipping)),
    ("Total Amount", |s: &Sale| to_f64(s.total_amount)),
    ("Paid By", |s: &Sale| to_f64(s.paid_by)),
    ("Operator Income", |s: &Sale| to_f64(s.operator_income)),
];

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Count, mean, spread and quartiles of every numeric column.
/// Returns `None` for an empty selection.
pub(crate) fn describe(rows: &[&Sale]) -> Option<Vec<ColumnStats>> {
    if rows.is_empty() {
        return None;
    }
    Some(
        NUMERIC_COLUMNS
            .iter()
            .map(|&(column, extract)| {
                let values: Vec<f64> = rows.iter().map(|s| extract(s)).collect();
                column_stats(column, values)
            })
            .collect(),
    )
}

fn column_stats(column: &'static str, mut values: Vec<f64>) -> ColumnStats {
    values.sort_by(f64::total_cmp);
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        var.sqrt()
    });
    ColumnStats {
        column,
        count,
        mean,
        std,
        min: values[0],
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values[count - 1],
    }
}

/// Linear interpolation between the closest ranks of an ascending slice.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ── Chart series ─────────────────────────────────────────────

/// Total amount per calendar month ("YYYY-MM"), first to last month present,
/// with empty months as zero.
pub(crate) fn monthly_totals(rows: &[&Sale]) -> Vec<(String, Decimal)> {
    let mut buckets: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for sale in rows {
        *buckets
            .entry((sale.date.year(), sale.date.month()))
            .or_insert(Decimal::ZERO) += sale.total_amount;
    }

    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let (mut year, mut month) = first;
    while (year, month) <= last {
        let total = buckets.get(&(year, month)).copied().unwrap_or(Decimal::ZERO);
        out.push((format!("{year:04}-{month:02}"), total));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    out
}

/// Occurrences of each basket item, most frequent first, ties by name.
pub(crate) fn item_counts(rows: &[&Sale]) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for name in rows.iter().flat_map(|s| s.basket()) {
        *counts.entry(name).or_insert(0) += 1;
    }
    sort_counts(counts)
}

/// Number of sales containing `item`, per channel.
pub(crate) fn item_channel_distribution(rows: &[&Sale], item: &str) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for sale in rows.iter().filter(|s| s.contains_item(item)) {
        *counts.entry(sale.channel.clone()).or_insert(0) += 1;
    }
    sort_counts(counts)
}

fn sort_counts(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

// ── Item metrics ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ItemMetrics {
    pub(crate) item: String,
    /// Quantity recorded in the item-entry text of sales containing the item.
    pub(crate) items_sold: u64,
    /// Distinct job ids.
    pub(crate) customers: usize,
    pub(crate) ad_sales: usize,
    pub(crate) organic_sales: usize,
}

impl ItemMetrics {
    /// Share of sales driven by ads, in percent. `None` without sales.
    pub(crate) fn ad_percent(&self) -> Option<f64> {
        let total = self.ad_sales + self.organic_sales;
        (total > 0).then(|| self.ad_sales as f64 * 100.0 / total as f64)
    }
}

pub(crate) fn item_metrics(rows: &[&Sale], item: &str) -> ItemMetrics {
    let containing: Vec<&Sale> = rows
        .iter()
        .copied()
        .filter(|s| s.contains_item(item))
        .collect();

    let totals = ItemTotals::from_sales(containing.iter().copied());
    let customers: HashSet<i64> = containing.iter().map(|s| s.job_id).collect();
    let ad_sales = containing.iter().filter(|s| s.ad).count();

    ItemMetrics {
        item: item.to_string(),
        items_sold: totals.get(item),
        customers: customers.len(),
        ad_sales,
        organic_sales: containing.len() - ad_sales,
    }
}
