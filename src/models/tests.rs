#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

// ── Sale ──────────────────────────────────────────────────────

fn make_sale(item_text: &str, items_text: &str) -> Sale {
    Sale {
        job_id: 1,
        date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        channel: "ETSY".into(),
        ad: false,
        rent: false,
        amount: dec!(20.00),
        shipping: dec!(5.00),
        total_amount: dec!(25.00),
        paid_by: Decimal::ZERO,
        operator_income: Decimal::ZERO,
        item_text: item_text.into(),
        items_text: items_text.into(),
    }
}

#[test]
fn test_basket_decodes_items_text() {
    let sale = make_sale("", "['Mug', ' Poster ']");
    assert_eq!(sale.basket(), vec!["mug", "poster"]);
}

#[test]
fn test_basket_empty_on_garbage() {
    let sale = make_sale("", "mug, poster");
    assert!(sale.basket().is_empty());
}

#[test]
fn test_contains_item() {
    let sale = make_sale("", "['mug', 'poster']");
    assert!(sale.contains_item("mug"));
    assert!(!sale.contains_item("sticker"));
}

#[test]
fn test_entries_decodes_item_text() {
    let sale = make_sale("2 mug, 1 poster", "");
    let decoded = sale.entries();
    assert_eq!(
        decoded.entries,
        vec![ItemEntry::new("mug", 2), ItemEntry::new("poster", 1)]
    );
    assert!(decoded.errors.is_empty());
}

#[test]
fn test_sync_items_text() {
    let mut sale = make_sale("2 Mug, 1 tote bag", "");
    sale.sync_items_text();
    assert_eq!(sale.items_text, "['mug', 'tote bag']");
    assert_eq!(sale.basket(), vec!["mug", "tote bag"]);
}

#[test]
fn test_sync_items_text_empty_entries() {
    let mut sale = make_sale("", "['stale']");
    sale.sync_items_text();
    assert_eq!(sale.items_text, "[]");
}

// ── Flags ─────────────────────────────────────────────────────

#[test]
fn test_flag_codes() {
    assert_eq!(flag_code(true), "Y");
    assert_eq!(flag_code(false), "N");
}

#[test]
fn test_parse_flag() {
    assert!(parse_flag("Y"));
    assert!(parse_flag(" y "));
    assert!(!parse_flag("N"));
    assert!(!parse_flag(""));
    assert!(!parse_flag("yes"));
}

// ── ItemEntry ─────────────────────────────────────────────────

#[test]
fn test_item_entry_normalizes_name() {
    let entry = ItemEntry::new("  Tote Bag ", 3);
    assert_eq!(entry.name, "tote bag");
    assert_eq!(entry.quantity, 3);
}

#[test]
fn test_item_entry_display() {
    assert_eq!(ItemEntry::new("mug", 4).to_string(), "4 mug");
}
