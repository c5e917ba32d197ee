use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::items::{encode_entries, encode_item_list};
use crate::models::{normalize_name, ItemEntry, Sale};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum EntryError {
    #[error("channel is required")]
    MissingChannel,
    #[error("item name is required")]
    EmptyItemName,
    #[error("item name '{0}' must not contain a comma")]
    CommaInName(String),
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("{field} cannot be set directly")]
    ReadOnlyField { field: SaleField },
    #[error("invalid {field}: '{value}'")]
    InvalidValue { field: SaleField, value: String },
}

/// Editable columns of a sale, addressed by name from `:set` and `:entry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SaleField {
    JobId,
    Date,
    Channel,
    Ad,
    Rent,
    Amount,
    Shipping,
    TotalAmount,
    PaidBy,
    OperatorIncome,
    Item,
}

impl SaleField {
    pub(crate) fn all() -> &'static [SaleField] {
        &[
            Self::JobId,
            Self::Date,
            Self::Channel,
            Self::Ad,
            Self::Rent,
            Self::Amount,
            Self::Shipping,
            Self::TotalAmount,
            Self::PaidBy,
            Self::OperatorIncome,
            Self::Item,
        ]
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::JobId => "job",
            Self::Date => "date",
            Self::Channel => "channel",
            Self::Ad => "ad",
            Self::Rent => "rent",
            Self::Amount => "amount",
            Self::Shipping => "shipping",
            Self::TotalAmount => "total",
            Self::PaidBy => "paid-by",
            Self::OperatorIncome => "income",
            Self::Item => "item",
        }
    }
}

impl FromStr for SaleField {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('_', "-");
        match key.as_str() {
            "job" | "job-id" | "job#" | "job-#" => Ok(Self::JobId),
            "date" => Ok(Self::Date),
            "channel" => Ok(Self::Channel),
            "ad" => Ok(Self::Ad),
            "rent" => Ok(Self::Rent),
            "amount" => Ok(Self::Amount),
            "shipping" => Ok(Self::Shipping),
            "total" | "total-amount" => Ok(Self::TotalAmount),
            "paid-by" | "paid" => Ok(Self::PaidBy),
            "income" | "operator-income" => Ok(Self::OperatorIncome),
            "item" => Ok(Self::Item),
            _ => Err(EntryError::UnknownField(s.trim().to_string())),
        }
    }
}

impl std::fmt::Display for SaleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn invalid(field: SaleField, value: &str) -> EntryError {
    EntryError::InvalidValue {
        field,
        value: value.to_string(),
    }
}

fn parse_money(field: SaleField, value: &str) -> Result<Decimal, EntryError> {
    let cleaned = value.trim().replace(['$', ','], "");
    Decimal::from_str(&cleaned).map_err(|_| invalid(field, value))
}

fn parse_date(value: &str) -> Result<NaiveDate, EntryError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| invalid(SaleField::Date, value))
}

fn parse_yes_no(field: SaleField, value: &str) -> Result<bool, EntryError> {
    match value.trim().to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Ok(true),
        "n" | "no" | "false" | "0" => Ok(false),
        _ => Err(invalid(field, value)),
    }
}

/// Set one column of an existing row. Editing `item` re-derives the item list.
pub(crate) fn apply_edit(sale: &mut Sale, field: SaleField, value: &str) -> Result<(), EntryError> {
    match field {
        SaleField::JobId => {
            sale.job_id = value.trim().parse().map_err(|_| invalid(field, value))?;
        }
        SaleField::Date => sale.date = parse_date(value)?,
        SaleField::Channel => sale.channel = value.trim().to_string(),
        SaleField::Ad => sale.ad = parse_yes_no(field, value)?,
        SaleField::Rent => sale.rent = parse_yes_no(field, value)?,
        SaleField::Amount => sale.amount = parse_money(field, value)?,
        SaleField::Shipping => sale.shipping = parse_money(field, value)?,
        SaleField::TotalAmount => sale.total_amount = parse_money(field, value)?,
        SaleField::PaidBy => sale.paid_by = parse_money(field, value)?,
        SaleField::OperatorIncome => sale.operator_income = parse_money(field, value)?,
        SaleField::Item => {
            let decoded = crate::items::decode_entries(value);
            if !decoded.errors.is_empty() {
                return Err(invalid(field, value));
            }
            sale.item_text = encode_entries(&decoded.entries);
            sale.sync_items_text();
        }
    }
    Ok(())
}

/// Next job number for a new entry: one past the highest, or 1.
pub(crate) fn next_job_id(sales: &[Sale]) -> i64 {
    sales.iter().map(|s| s.job_id).max().map_or(1, |max| max + 1)
}

/// A sale being entered, plus its pending item buffer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EntryDraft {
    pub(crate) job_id: i64,
    pub(crate) date: NaiveDate,
    pub(crate) channel: String,
    pub(crate) ad: bool,
    pub(crate) rent: bool,
    pub(crate) amount: Decimal,
    pub(crate) shipping: Decimal,
    pub(crate) paid_by: Decimal,
    pub(crate) operator_income: Decimal,
    items: Vec<ItemEntry>,
}

impl EntryDraft {
    pub(crate) fn new(sales: &[Sale], today: NaiveDate, default_channel: &str) -> Self {
        Self {
            job_id: next_job_id(sales),
            date: today,
            channel: default_channel.trim().to_uppercase(),
            ad: false,
            rent: false,
            amount: Decimal::ZERO,
            shipping: Decimal::ZERO,
            paid_by: Decimal::ZERO,
            operator_income: Decimal::ZERO,
            items: Vec::new(),
        }
    }

    pub(crate) fn items(&self) -> &[ItemEntry] {
        &self.items
    }

    /// Queue an item. Adding a name already pending raises its quantity.
    pub(crate) fn add_item(&mut self, name: &str, quantity: u32) -> Result<(), EntryError> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(EntryError::EmptyItemName);
        }
        if name.contains(',') {
            return Err(EntryError::CommaInName(name));
        }
        if quantity == 0 {
            return Err(EntryError::ZeroQuantity);
        }
        match self.items.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
            None => self.items.push(ItemEntry { name, quantity }),
        }
        Ok(())
    }

    /// Queue an item typed as `"2 mug"`, or `"mug"` for a single one.
    pub(crate) fn add_item_text(&mut self, text: &str) -> Result<(), EntryError> {
        let text = text.trim();
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EntryError::EmptyItemName);
        }
        match text.split_once(' ') {
            Some((qty, name)) if qty.bytes().all(|b| b.is_ascii_digit()) => {
                let quantity = qty.parse().map_err(|_| invalid(SaleField::Item, text))?;
                self.add_item(name, quantity)
            }
            _ => self.add_item(text, 1),
        }
    }

    pub(crate) fn remove_last_item(&mut self) -> Option<ItemEntry> {
        self.items.pop()
    }

    pub(crate) fn clear_items(&mut self) {
        self.items.clear();
    }

    /// The pending items as item-entry text, e.g. `"2 mug, 1 poster"`.
    pub(crate) fn entries_text(&self) -> String {
        encode_entries(&self.items)
    }

    pub(crate) fn total(&self) -> Decimal {
        self.amount + self.shipping
    }

    /// Set a draft field by name. Total and item are derived, not set.
    pub(crate) fn set(&mut self, field: SaleField, value: &str) -> Result<(), EntryError> {
        match field {
            SaleField::JobId => {
                self.job_id = value.trim().parse().map_err(|_| invalid(field, value))?;
            }
            SaleField::Date => self.date = parse_date(value)?,
            SaleField::Channel => self.channel = value.trim().to_uppercase(),
            SaleField::Ad => self.ad = parse_yes_no(field, value)?,
            SaleField::Rent => self.rent = parse_yes_no(field, value)?,
            SaleField::Amount => self.amount = parse_money(field, value)?,
            SaleField::Shipping => self.shipping = parse_money(field, value)?,
            SaleField::PaidBy => self.paid_by = parse_money(field, value)?,
            SaleField::OperatorIncome => self.operator_income = parse_money(field, value)?,
            SaleField::TotalAmount | SaleField::Item => {
                return Err(EntryError::ReadOnlyField { field });
            }
        }
        Ok(())
    }

    /// Assemble the new row: total is amount plus shipping, the channel is
    /// trimmed and uppercased, and the item list is derived from the pending items.
    pub(crate) fn build(&self) -> Result<Sale, EntryError> {
        let channel = self.channel.trim().to_uppercase();
        if channel.is_empty() {
            return Err(EntryError::MissingChannel);
        }
        let names: Vec<&str> = self.items.iter().map(|e| e.name.as_str()).collect();
        Ok(Sale {
            job_id: self.job_id,
            date: self.date,
            channel,
            ad: self.ad,
            rent: self.rent,
            amount: self.amount,
            shipping: self.shipping,
            total_amount: self.total(),
            paid_by: self.paid_by,
            operator_income: self.operator_income,
            item_text: self.entries_text(),
            items_text: encode_item_list(&names),
        })
    }
}
