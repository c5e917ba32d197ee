#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn make_sale(job_id: i64, day: NaiveDate, channel: &str, items_text: &str) -> Sale {
    Sale {
        job_id,
        date: day,
        channel: channel.into(),
        ad: false,
        rent: false,
        amount: Decimal::ZERO,
        shipping: Decimal::ZERO,
        total_amount: Decimal::ZERO,
        paid_by: Decimal::ZERO,
        operator_income: Decimal::ZERO,
        item_text: String::new(),
        items_text: items_text.into(),
    }
}

fn sample() -> Vec<Sale> {
    vec![
        make_sale(1, date(2024, 1, 1), "ETSY", "['mug']"),
        make_sale(2, date(2024, 1, 10), "SHOP", "['poster', 'mug']"),
        make_sale(3, date(2024, 1, 20), "ETSY", "['tote bag']"),
        make_sale(4, date(2024, 2, 1), "MARKET", "['Sticker']"),
    ]
}

fn ids(rows: &[&Sale]) -> Vec<i64> {
    rows.iter().map(|s| s.job_id).collect()
}

// ── Date range ────────────────────────────────────────────────

#[test]
fn test_date_range_inclusive_bounds() {
    let sales = sample();
    let rows = by_date_range(&sales, date(2024, 1, 1), date(2024, 1, 20));
    assert_eq!(ids(&rows), vec![1, 2, 3]);
}

#[test]
fn test_date_range_excludes_one_day_outside() {
    let sales = sample();
    let rows = by_date_range(&sales, date(2024, 1, 2), date(2024, 1, 19));
    assert_eq!(ids(&rows), vec![2]);
}

#[test]
fn test_date_range_single_day() {
    let sales = sample();
    let rows = by_date_range(&sales, date(2024, 2, 1), date(2024, 2, 1));
    assert_eq!(ids(&rows), vec![4]);
}

#[test]
fn test_date_range_inverted_is_empty() {
    let sales = sample();
    assert!(by_date_range(&sales, date(2024, 2, 1), date(2024, 1, 1)).is_empty());
}

// ── Channel ───────────────────────────────────────────────────

#[test]
fn test_channel_wildcard_keeps_all_in_order() {
    let sales = sample();
    let rows = by_channel(&sales, &ChannelFilter::All);
    assert_eq!(ids(&rows), vec![1, 2, 3, 4]);
}

#[test]
fn test_channel_exact_match() {
    let sales = sample();
    let rows = by_channel(&sales, &ChannelFilter::Only("ETSY".into()));
    assert_eq!(ids(&rows), vec![1, 3]);
}

#[test]
fn test_channel_case_sensitive() {
    let sales = sample();
    assert!(by_channel(&sales, &ChannelFilter::Only("etsy".into())).is_empty());
}

#[test]
fn test_channel_parse() {
    assert_eq!(ChannelFilter::parse("All"), ChannelFilter::All);
    assert_eq!(ChannelFilter::parse("ALL"), ChannelFilter::All);
    assert_eq!(ChannelFilter::parse("*"), ChannelFilter::All);
    assert_eq!(ChannelFilter::parse(""), ChannelFilter::All);
    assert_eq!(
        ChannelFilter::parse(" ETSY "),
        ChannelFilter::Only("ETSY".into())
    );
}

// ── Search ────────────────────────────────────────────────────

#[test]
fn test_search_case_insensitive() {
    let sales = sample();
    let rows = by_search(&sales, &Search::new("STICKER"));
    assert_eq!(ids(&rows), vec![4]);
}

#[test]
fn test_search_regex() {
    let sales = sample();
    let rows = by_search(&sales, &Search::new("mug|tote"));
    assert_eq!(ids(&rows), vec![1, 2, 3]);
}

#[test]
fn test_search_invalid_regex_falls_back_to_literal() {
    let mut sales = sample();
    sales.push(make_sale(5, date(2024, 2, 2), "SHOP", "['mug (large']"));
    let rows = by_search(&sales, &Search::new("(LARGE"));
    assert_eq!(ids(&rows), vec![5]);
}

// ── Composition ───────────────────────────────────────────────

#[test]
fn test_filters_compose() {
    let sales = sample();
    let january = by_date_range(&sales, date(2024, 1, 1), date(2024, 1, 31));
    let rows = by_channel(january, &ChannelFilter::Only("ETSY".into()));
    assert_eq!(ids(&rows), vec![1, 3]);
}

#[test]
fn test_idempotent_same_predicate() {
    let sales = sample();
    let once = by_date_range(&sales, date(2024, 1, 5), date(2024, 1, 31));
    let twice = by_date_range(once.clone(), date(2024, 1, 5), date(2024, 1, 31));
    assert_eq!(once, twice);
}

#[test]
fn test_idempotent_wider_predicate() {
    let sales = sample();
    let narrow = by_channel(&sales, &ChannelFilter::Only("ETSY".into()));
    let again = by_channel(narrow.clone(), &ChannelFilter::All);
    assert_eq!(narrow, again);
    let wider = by_date_range(narrow.clone(), date(2023, 1, 1), date(2025, 1, 1));
    assert_eq!(narrow, wider);
}

// ── SaleFilter / Selection ────────────────────────────────────

#[test]
fn test_sale_filter_all_predicates() {
    let sales = sample();
    let filter = SaleFilter {
        start: Some(date(2024, 1, 1)),
        end: Some(date(2024, 1, 31)),
        channel: ChannelFilter::Only("SHOP".into()),
        search: Some(Search::new("poster")),
    };
    let selection = filter.apply(&sales);
    assert_eq!(ids(selection.rows()), vec![2]);
    assert_eq!(selection.len(), 1);
}

#[test]
fn test_sale_filter_default_keeps_everything() {
    let sales = sample();
    let selection = SaleFilter::default().apply(&sales);
    assert_eq!(selection.len(), sales.len());
}

#[test]
fn test_selection_empty_signal() {
    let sales = sample();
    let filter = SaleFilter {
        channel: ChannelFilter::Only("NOWHERE".into()),
        ..SaleFilter::default()
    };
    let selection = filter.apply(&sales);
    assert!(selection.is_empty());
    assert_eq!(selection, Selection::Empty);
    assert!(selection.rows().is_empty());
}

#[test]
fn test_apply_indexed_keeps_positions() {
    let sales = sample();
    let filter = SaleFilter {
        channel: ChannelFilter::Only("ETSY".into()),
        ..SaleFilter::default()
    };
    let rows = filter.apply_indexed(&sales);
    let positions: Vec<usize> = rows.iter().map(|(i, _)| *i).collect();
    assert_eq!(positions, vec![0, 2]);
    assert_eq!(rows[1].1.job_id, 3);
}

#[test]
fn test_apply_indexed_matches_apply() {
    let sales = sample();
    let filter = SaleFilter {
        start: Some(date(2024, 1, 5)),
        search: Some(Search::new("mug|sticker")),
        ..SaleFilter::default()
    };
    let indexed: Vec<i64> = filter
        .apply_indexed(&sales)
        .iter()
        .map(|(_, s)| s.job_id)
        .collect();
    assert_eq!(indexed, ids(filter.apply(&sales).rows()));
    assert_eq!(indexed, vec![2, 4]);
}

#[test]
fn test_apply_indexed_distinguishes_repeated_job_ids() {
    let sales = vec![
        make_sale(1, date(2024, 1, 1), "ETSY", "['mug']"),
        make_sale(1, date(2024, 1, 2), "SHOP", "['mug']"),
    ];
    let rows = SaleFilter::default().apply_indexed(&sales);
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].0, rows[0].1.channel.as_str()), (0, "ETSY"));
    assert_eq!((rows[1].0, rows[1].1.channel.as_str()), (1, "SHOP"));
}

#[test]
fn test_without_channel() {
    let filter = SaleFilter {
        start: Some(date(2024, 1, 1)),
        channel: ChannelFilter::Only("SHOP".into()),
        ..SaleFilter::default()
    };
    let wide = filter.without_channel();
    assert_eq!(wide.channel, ChannelFilter::All);
    assert_eq!(wide.start, filter.start);
}

#[test]
fn test_date_bounds() {
    assert_eq!(
        date_bounds(&sample()),
        Some((date(2024, 1, 1), date(2024, 2, 1)))
    );
    assert_eq!(date_bounds(&[]), None);
}
