use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::models::{flag_code, parse_flag, Sale};
use crate::store::SaleStore;

/// Header written for each column, followed by any legacy names accepted on read.
const COLUMNS: [&[&str]; 12] = [
    &["Job #"],
    &["date"],
    &["Channel"],
    &["Ad"],
    &["rent"],
    &["Amount"],
    &["Shipping"],
    &["Total Amount"],
    &["Paid By", "Paid by F"],
    &["Operator Income", "Farahy Income"],
    &["Item"],
    &["items"],
];

const JOB: usize = 0;
const DATE: usize = 1;
const CHANNEL: usize = 2;
const AD: usize = 3;
const RENT: usize = 4;
const AMOUNT: usize = 5;
const SHIPPING: usize = 6;
const TOTAL: usize = 7;
const PAID_BY: usize = 8;
const INCOME: usize = 9;
const ITEM: usize = 10;
const ITEMS: usize = 11;

/// The ledger as a spreadsheet-style CSV file.
pub(crate) struct SheetFile {
    path: PathBuf,
}

impl SheetFile {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Parse every non-blank row. A missing file is an empty ledger.
    pub(crate) fn read(&self) -> Result<Vec<Sale>> {
        if !self.path.exists() {
            warn!(path = %self.path.display(), "Sheet file not found, starting empty");
            return Ok(Vec::new());
        }

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_path(&self.path)
            .with_context(|| format!("Failed to open sheet: {}", self.path.display()))?;

        let headers = rdr.headers().context("Failed to read sheet header")?.clone();
        let layout = locate_columns(headers.iter())?;

        let mut sales = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result.context("Failed to read sheet record")?;
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            // Header is line 1.
            let line = i + 2;
            let field = |col: usize| {
                layout[col]
                    .and_then(|idx| record.get(idx))
                    .map(str::trim)
                    .unwrap_or("")
            };
            sales.push(parse_row(field).with_context(|| format!("Row {line}"))?);
        }
        Ok(sales)
    }

    /// Write all rows to a sibling temporary file, then move it over the target.
    pub(crate) fn write(&self, sales: &[Sale]) -> Result<()> {
        let tmp = self.temp_path();
        {
            let mut wtr = csv::Writer::from_path(&tmp)
                .with_context(|| format!("Failed to create {}", tmp.display()))?;
            wtr.write_record(COLUMNS.iter().map(|names| names[0]))?;
            for sale in sales {
                wtr.write_record(sale_record(sale))?;
            }
            wtr.flush().context("Failed to flush sheet")?;
        }
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sheet.csv".into());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

impl SaleStore for SheetFile {
    fn load(&self) -> Result<Vec<Sale>> {
        let sales = self.read()?;
        info!(rows = sales.len(), store = %self.location(), "Loaded sales");
        Ok(sales)
    }

    fn replace_all(&mut self, sales: &[Sale]) -> Result<()> {
        self.write(sales)?;
        info!(rows = sales.len(), store = %self.location(), "Replaced sales");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Map each known column to its index in `headers`. Job # and date are required.
fn locate_columns<'a>(headers: impl Iterator<Item = &'a str>) -> Result<[Option<usize>; 12]> {
    let headers: Vec<&str> = headers.map(str::trim).collect();
    let mut layout = [None; 12];
    for (col, names) in COLUMNS.iter().enumerate() {
        layout[col] = headers
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)));
    }
    for required in [JOB, DATE] {
        if layout[required].is_none() {
            anyhow::bail!("Sheet is missing the '{}' column", COLUMNS[required][0]);
        }
    }
    Ok(layout)
}

fn parse_row<'r>(field: impl Fn(usize) -> &'r str) -> Result<Sale> {
    let job_raw = field(JOB);
    let job_id = parse_job_id(job_raw)
        .with_context(|| format!("invalid job number '{job_raw}'"))?;
    let date_raw = field(DATE);
    let date = parse_date(date_raw)?;

    Ok(Sale {
        job_id,
        date,
        channel: field(CHANNEL).to_string(),
        ad: parse_flag(field(AD)),
        rent: parse_flag(field(RENT)),
        amount: parse_decimal(field(AMOUNT))?,
        shipping: parse_decimal(field(SHIPPING))?,
        total_amount: parse_decimal(field(TOTAL))?,
        paid_by: parse_decimal(field(PAID_BY))?,
        operator_income: parse_decimal(field(INCOME))?,
        item_text: field(ITEM).to_string(),
        items_text: field(ITEMS).to_string(),
    })
}

fn sale_record(sale: &Sale) -> [String; 12] {
    [
        sale.job_id.to_string(),
        sale.date.format("%Y-%m-%d").to_string(),
        sale.channel.clone(),
        flag_code(sale.ad).to_string(),
        flag_code(sale.rent).to_string(),
        sale.amount.to_string(),
        sale.shipping.to_string(),
        sale.total_amount.to_string(),
        sale.paid_by.to_string(),
        sale.operator_income.to_string(),
        sale.item_text.clone(),
        sale.items_text.clone(),
    ]
}

/// Spreadsheet exports write integer columns as `12` or `12.0`.
pub(crate) fn parse_job_id(s: &str) -> Result<i64> {
    let value = Decimal::from_str(s.trim())?;
    if !value.fract().is_zero() {
        anyhow::bail!("job number must be whole");
    }
    value
        .to_i64()
        .ok_or_else(|| anyhow::anyhow!("job number out of range"))
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    for fmt in &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%m/%d/%y", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    anyhow::bail!("Could not parse date: '{s}'")
}

/// Blank is zero; `$`, thousands separators and accounting parentheses are accepted.
pub(crate) fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = s
        .replace(['$', ','], "")
        .replace('(', "-")
        .replace(')', "")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned).with_context(|| format!("Failed to parse '{s}' as an amount"))
}

#[cfg(test)]
#[path = "sheet_tests.rs"]
mod tests;
