#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::*;
use crate::db::Database;
use crate::filter::Search;
use crate::store::SaleStore;

fn sale(job_id: i64, channel: &str, items: &str) -> Sale {
    let mut sale = Sale {
        job_id,
        date: NaiveDate::from_ymd_opt(2024, 2, job_id as u32).unwrap(),
        channel: channel.into(),
        ad: false,
        rent: false,
        amount: Decimal::ONE,
        shipping: Decimal::ZERO,
        total_amount: Decimal::ONE,
        paid_by: Decimal::ZERO,
        operator_income: Decimal::ZERO,
        item_text: items.into(),
        items_text: String::new(),
    };
    sale.sync_items_text();
    sale
}

fn ledger() -> Ledger {
    let mut db = Database::open_in_memory().unwrap();
    db.replace_all(&[
        sale(1, "ETSY", "1 mug"),
        sale(2, "SHOP", "1 mat, 2 mug"),
        sale(3, "ETSY", "1 tee"),
    ])
    .unwrap();
    Ledger::open(Box::new(db)).unwrap()
}

#[test]
fn test_screen_filters_use_their_parts() {
    let ledger = ledger();
    let mut app = App::new(&ledger, BasketParams::default(), "");
    app.filter.channel = ChannelFilter::Only("SHOP".into());
    app.filter.search = Some(Search::new("tee"));

    assert_eq!(app.home_filter().apply(ledger.sales()).len(), 1);
    assert_eq!(app.channel_filter().apply(ledger.sales()).len(), 1);
    assert_eq!(app.date_filter().apply(ledger.sales()).len(), 3);
}

#[test]
fn test_display_row_prefers_pending_edit() {
    let ledger = ledger();
    let mut app = App::new(&ledger, BasketParams::default(), "");
    let job_id = app
        .edit_selected(&ledger, SaleField::Channel, "MARKET")
        .unwrap();
    assert_eq!(job_id, Some(1));

    let original = &ledger.sales()[0];
    assert_eq!(original.channel, "ETSY");
    assert_eq!(app.display_row(0, original).channel, "MARKET");
    assert_eq!(app.display_row(1, &ledger.sales()[1]).channel, "SHOP");
}

#[test]
fn test_repeated_edits_accumulate_on_one_row() {
    let ledger = ledger();
    let mut app = App::new(&ledger, BasketParams::default(), "");
    app.edit_selected(&ledger, SaleField::JobId, "10").unwrap();
    app.edit_selected(&ledger, SaleField::Rent, "y").unwrap();

    assert_eq!(app.pending_edits.len(), 1);
    let edited = app.pending_edits.get(&0).unwrap();
    assert_eq!(edited.job_id, 10);
    assert!(edited.rent);
}

#[test]
fn test_edit_keeps_rows_with_same_job_number_apart() {
    let mut db = Database::open_in_memory().unwrap();
    db.replace_all(&[sale(1, "ETSY", "1 mug"), sale(1, "SHOP", "1 tee")])
        .unwrap();
    let mut ledger = Ledger::open(Box::new(db)).unwrap();
    let mut app = App::new(&ledger, BasketParams::default(), "");

    app.row_index = 1;
    app.edit_selected(&ledger, SaleField::Amount, "99").unwrap();
    assert_eq!(app.pending_edits.keys().copied().collect::<Vec<_>>(), vec![1]);

    let shown: Vec<(String, Decimal)> = app
        .home_rows(&ledger)
        .into_iter()
        .map(|(position, s)| {
            let row = app.display_row(position, s);
            (row.channel.clone(), row.amount)
        })
        .collect();
    assert_eq!(
        shown,
        vec![
            ("ETSY".to_string(), Decimal::ONE),
            ("SHOP".to_string(), Decimal::from(99)),
        ]
    );

    ledger.apply_edits(&app.pending_edits).unwrap();
    let saved: Vec<(&str, Decimal)> = ledger
        .sales()
        .iter()
        .map(|s| (s.channel.as_str(), s.amount))
        .collect();
    assert_eq!(
        saved,
        vec![("ETSY", Decimal::ONE), ("SHOP", Decimal::from(99))]
    );
}

#[test]
fn test_edit_without_selection() {
    let ledger = ledger();
    let mut app = App::new(&ledger, BasketParams::default(), "");
    app.filter.search = Some(Search::new("lamp"));
    assert_eq!(
        app.edit_selected(&ledger, SaleField::Channel, "X").unwrap(),
        None
    );
}

#[test]
fn test_clamp_cursors_after_filtering() {
    let ledger = ledger();
    let mut app = App::new(&ledger, BasketParams::default(), "");
    app.row_index = 2;
    app.row_scroll = 2;
    app.item_index = 2;
    app.row_limit = Some(1);
    app.clamp_cursors(&ledger);
    assert_eq!(app.row_index, 0);
    assert_eq!(app.row_scroll, 0);
    assert_eq!(app.item_index, 2);

    app.filter.end = NaiveDate::from_ymd_opt(2024, 2, 1);
    app.clamp_cursors(&ledger);
    assert_eq!(app.item_index, 0);
}

#[test]
fn test_item_suggestions_match_typed_prefix() {
    let ledger = ledger();
    let mut app = App::new(&ledger, BasketParams::default(), "");
    app.command_input = "2 M".into();
    assert_eq!(app.item_suggestions(&ledger), vec!["mat", "mug"]);

    app.command_input = "te".into();
    assert_eq!(app.item_suggestions(&ledger), vec!["tee"]);
}

#[test]
fn test_screen_order() {
    let names: Vec<String> = Screen::all().iter().map(|s| s.to_string()).collect();
    assert_eq!(names, vec!["Home", "Channels", "Items", "New Entry"]);
}
