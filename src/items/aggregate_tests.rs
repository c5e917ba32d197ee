#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::*;

fn make_sale(job_id: i64, item_text: &str) -> Sale {
    Sale {
        job_id,
        date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        channel: "ETSY".into(),
        ad: false,
        rent: false,
        amount: Decimal::ZERO,
        shipping: Decimal::ZERO,
        total_amount: Decimal::ZERO,
        paid_by: Decimal::ZERO,
        operator_income: Decimal::ZERO,
        item_text: item_text.into(),
        items_text: String::new(),
    }
}

#[test]
fn test_sum_across_rows() {
    let totals = sum_item_amounts(["3 widget, 1 gadget", "2 widget"]);
    assert_eq!(totals.get("widget"), 5);
    assert_eq!(totals.get("gadget"), 1);
    assert_eq!(totals.len(), 2);
    assert_eq!(totals.skipped(), 0);
}

#[test]
fn test_unseen_item_is_zero() {
    let totals = sum_item_amounts(["1 mug"]);
    assert_eq!(totals.get("poster"), 0);
}

#[test]
fn test_skips_empty_rows() {
    let totals = sum_item_amounts(["", "  ", "4 mug"]);
    assert_eq!(totals.get("mug"), 4);
    assert_eq!(totals.skipped(), 0);
}

#[test]
fn test_counts_malformed_segments() {
    let totals = sum_item_amounts(["2 mug, x poster", "abc", "1 mug"]);
    assert_eq!(totals.get("mug"), 3);
    assert_eq!(totals.get("poster"), 0);
    assert_eq!(totals.skipped(), 2);
}

#[test]
fn test_order_independent() {
    let a = sum_item_amounts(["3 widget, 1 gadget", "2 widget", "5 gadget"]);
    let b = sum_item_amounts(["5 gadget", "2 widget", "3 widget, 1 gadget"]);
    assert_eq!(a, b);
}

#[test]
fn test_case_folds_names() {
    let totals = sum_item_amounts(["1 Mug", "2 mug"]);
    assert_eq!(totals.get("mug"), 3);
    assert_eq!(totals.len(), 1);
}

#[test]
fn test_from_sales() {
    let sales = vec![make_sale(1, "3 widget, 1 gadget"), make_sale(2, "2 widget")];
    let totals = ItemTotals::from_sales(&sales);
    assert_eq!(totals.get("widget"), 5);
    assert_eq!(totals.grand_total(), 6);
}

#[test]
fn test_ranked() {
    let totals = sum_item_amounts(["1 b, 4 a, 1 c"]);
    assert_eq!(totals.ranked(), vec![("a", 4), ("b", 1), ("c", 1)]);
}

#[test]
fn test_iter_is_alphabetical() {
    let totals = sum_item_amounts(["1 zebra, 1 apple"]);
    let names: Vec<&str> = totals.iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["apple", "zebra"]);
}
