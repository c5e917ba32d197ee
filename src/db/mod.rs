mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::models::{flag_code, parse_flag, Sale};
use crate::store::SaleStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

/// Column values as stored, before conversion into a `Sale`.
struct SaleRow {
    job_id: i64,
    date: String,
    channel: String,
    ad: String,
    rent: String,
    amount: String,
    shipping: String,
    total_amount: String,
    paid_by: String,
    operator_income: String,
    item: String,
    items: String,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn, path: None };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn
                .execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                debug!(from_version, "Applying schema migration");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn schema_version(&self) -> Result<i32> {
        Ok(self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })?)
    }

    // ── Sales ─────────────────────────────────────────────────

    /// Every sale in ledger order.
    pub(crate) fn get_sales(&self) -> Result<Vec<Sale>> {
        let mut stmt = self.conn.prepare(
            "SELECT job_id, date, channel, ad, rent, amount, shipping, total_amount,
                    paid_by, operator_income, item, items
             FROM sales ORDER BY position",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SaleRow {
                job_id: row.get(0)?,
                date: row.get(1)?,
                channel: row.get(2)?,
                ad: row.get(3)?,
                rent: row.get(4)?,
                amount: row.get(5)?,
                shipping: row.get(6)?,
                total_amount: row.get(7)?,
                paid_by: row.get(8)?,
                operator_income: row.get(9)?,
                item: row.get(10)?,
                items: row.get(11)?,
            })
        })?;

        let mut sales = Vec::new();
        for row in rows {
            sales.push(row?.into_sale()?);
        }
        Ok(sales)
    }

    /// Replace the whole table in one SQL transaction.
    pub(crate) fn replace_sales(&mut self, sales: &[Sale]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM sales", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO sales (job_id, date, channel, ad, rent, amount, shipping,
                                    total_amount, paid_by, operator_income, item, items)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for sale in sales {
                stmt.execute(params![
                    sale.job_id,
                    sale.date.format(DATE_FORMAT).to_string(),
                    sale.channel,
                    flag_code(sale.ad),
                    flag_code(sale.rent),
                    sale.amount.to_string(),
                    sale.shipping.to_string(),
                    sale.total_amount.to_string(),
                    sale.paid_by.to_string(),
                    sale.operator_income.to_string(),
                    sale.item_text,
                    sale.items_text,
                ])
                .with_context(|| format!("Failed to write job #{}", sale.job_id))?;
            }
        }
        tx.commit().context("Failed to commit sales")?;
        Ok(())
    }
}

impl SaleRow {
    fn into_sale(self) -> Result<Sale> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .with_context(|| format!("Job #{}: invalid stored date '{}'", self.job_id, self.date))?;
        Ok(Sale {
            job_id: self.job_id,
            date,
            channel: self.channel,
            ad: parse_flag(&self.ad),
            rent: parse_flag(&self.rent),
            amount: Decimal::from_str(&self.amount).unwrap_or_default(),
            shipping: Decimal::from_str(&self.shipping).unwrap_or_default(),
            total_amount: Decimal::from_str(&self.total_amount).unwrap_or_default(),
            paid_by: Decimal::from_str(&self.paid_by).unwrap_or_default(),
            operator_income: Decimal::from_str(&self.operator_income).unwrap_or_default(),
            item_text: self.item,
            items_text: self.items,
        })
    }
}

impl SaleStore for Database {
    fn load(&self) -> Result<Vec<Sale>> {
        let sales = self.get_sales()?;
        info!(rows = sales.len(), store = %self.location(), "Loaded sales");
        Ok(sales)
    }

    fn replace_all(&mut self, sales: &[Sale]) -> Result<()> {
        self.replace_sales(sales)?;
        info!(rows = sales.len(), store = %self.location(), "Replaced sales");
        Ok(())
    }

    fn location(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string())
    }
}
