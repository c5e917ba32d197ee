use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::items::{self, EntryDecode};

/// One row of the sales ledger: a single job/order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    pub job_id: i64,
    pub date: NaiveDate,
    pub channel: String,
    pub ad: bool,
    pub rent: bool,
    pub amount: Decimal,
    pub shipping: Decimal,
    /// `amount + shipping` when the row was entered. Later edits may diverge.
    pub total_amount: Decimal,
    pub paid_by: Decimal,
    pub operator_income: Decimal,
    /// Human-authored "qty name, qty name" text.
    pub item_text: String,
    /// Machine-authored list literal derived from `item_text`.
    pub items_text: String,
}

impl Sale {
    /// Lowercased item names of this sale's basket.
    pub fn basket(&self) -> Vec<String> {
        items::decode_item_list(Some(&self.items_text))
    }

    pub fn entries(&self) -> EntryDecode {
        items::decode_entries(&self.item_text)
    }

    pub fn contains_item(&self, name: &str) -> bool {
        self.basket().iter().any(|i| i == name)
    }

    /// Re-derive `items_text` from the current `item_text`.
    pub fn sync_items_text(&mut self) {
        let names: Vec<String> = self.entries().entries.into_iter().map(|e| e.name).collect();
        self.items_text = items::encode_item_list(&names);
    }
}

/// Persisted one-character code for the ad/rent flags.
pub fn flag_code(flag: bool) -> &'static str {
    if flag {
        "Y"
    } else {
        "N"
    }
}

pub fn parse_flag(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case("y")
}
