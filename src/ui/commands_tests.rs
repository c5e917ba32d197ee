#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::basket::BasketParams;
use crate::db::Database;
use crate::store::SaleStore;

fn sale(job_id: i64, day: u32, channel: &str, items: &str) -> Sale {
    let mut sale = Sale {
        job_id,
        date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        channel: channel.into(),
        ad: false,
        rent: false,
        amount: dec!(20),
        shipping: dec!(5),
        total_amount: dec!(25),
        paid_by: Decimal::ZERO,
        operator_income: Decimal::ZERO,
        item_text: items.into(),
        items_text: String::new(),
    };
    sale.sync_items_text();
    sale
}

fn setup() -> (App, Ledger) {
    let mut db = Database::open_in_memory().unwrap();
    db.replace_all(&[
        sale(1, 1, "ETSY", "1 mug, 1 poster"),
        sale(2, 5, "MARKET", "2 tee"),
        sale(3, 9, "ETSY", "1 mug"),
    ])
    .unwrap();
    let ledger = Ledger::open(Box::new(db)).unwrap();
    let app = App::new(&ledger, BasketParams::default(), "ETSY");
    (app, ledger)
}

fn run(input: &str, app: &mut App, ledger: &mut Ledger) {
    handle_command(input, app, ledger).unwrap();
}

// ── Dispatch ──────────────────────────────────────────────────

#[test]
fn test_unknown_command_suggests_closest() {
    let (mut app, mut ledger) = setup();
    run("serch mug", &mut app, &mut ledger);
    assert_eq!(
        app.status_message,
        "Unknown command: :serch. Did you mean :search?"
    );
}

#[test]
fn test_edit_distance() {
    assert_eq!(edit_distance("", "abc"), 3);
    assert_eq!(edit_distance("kitten", "sitting"), 3);
    assert_eq!(edit_distance("save", "save"), 0);
}

#[test]
fn test_screen_commands() {
    let (mut app, mut ledger) = setup();
    run("channels", &mut app, &mut ledger);
    assert_eq!(app.screen, Screen::Channels);
    run("new", &mut app, &mut ledger);
    assert_eq!(app.screen, Screen::NewEntry);
    run("q", &mut app, &mut ledger);
    assert!(!app.running);
}

// ── Filters ───────────────────────────────────────────────────

#[test]
fn test_search_narrows_home_rows() {
    let (mut app, mut ledger) = setup();
    run("search MUG", &mut app, &mut ledger);
    let ids: Vec<i64> = app.home_rows(&ledger).iter().map(|(_, s)| s.job_id).collect();
    assert_eq!(ids, vec![1, 3]);

    run("search", &mut app, &mut ledger);
    assert_eq!(app.home_rows(&ledger).len(), 3);
    assert!(app.filter.search.is_none());
}

#[test]
fn test_date_range_commands() {
    let (mut app, mut ledger) = setup();
    run("from 2024-03-05", &mut app, &mut ledger);
    run("to 2024-03-05", &mut app, &mut ledger);
    let ids: Vec<i64> = app.home_rows(&ledger).iter().map(|(_, s)| s.job_id).collect();
    assert_eq!(ids, vec![2]);

    run("from 2024-03-06", &mut app, &mut ledger);
    assert_eq!(app.status_message, "Start date is after the end date");
    assert_eq!(app.filter.start, NaiveDate::from_ymd_opt(2024, 3, 5));

    run("from", &mut app, &mut ledger);
    run("to", &mut app, &mut ledger);
    assert_eq!(app.home_rows(&ledger).len(), 3);
}

#[test]
fn test_invalid_date_keeps_filter() {
    let (mut app, mut ledger) = setup();
    run("from someday", &mut app, &mut ledger);
    assert!(app.filter.start.is_none());
    assert!(app.status_message.starts_with("Invalid date"));
}

#[test]
fn test_channel_command() {
    let (mut app, mut ledger) = setup();
    run("channel MARKET", &mut app, &mut ledger);
    assert_eq!(app.filter.channel, ChannelFilter::Only("MARKET".into()));
    assert_eq!(app.screen, Screen::Channels);
    // Home ignores the channel filter
    assert_eq!(app.home_rows(&ledger).len(), 3);

    run("channel nowhere", &mut app, &mut ledger);
    assert!(app.status_message.starts_with("Unknown channel"));
    assert_eq!(app.filter.channel, ChannelFilter::Only("MARKET".into()));

    run("channel all", &mut app, &mut ledger);
    assert_eq!(app.filter.channel, ChannelFilter::All);
}

#[test]
fn test_rows_limit() {
    let (mut app, mut ledger) = setup();
    run("rows 2", &mut app, &mut ledger);
    assert_eq!(app.home_rows(&ledger).len(), 2);
    run("rows 0", &mut app, &mut ledger);
    assert_eq!(app.row_limit, Some(2));
    run("rows all", &mut app, &mut ledger);
    assert_eq!(app.home_rows(&ledger).len(), 3);
}

#[test]
fn test_item_command_selects_item() {
    let (mut app, mut ledger) = setup();
    run("item Tee", &mut app, &mut ledger);
    assert_eq!(app.screen, Screen::Items);
    assert_eq!(app.selected_item(&ledger).as_deref(), Some("tee"));

    run("item lamp", &mut app, &mut ledger);
    assert_eq!(app.status_message, "No sales of 'lamp' in the selected dates");
}

// ── Editing ───────────────────────────────────────────────────

#[test]
fn test_set_then_save_commits_edit() {
    let (mut app, mut ledger) = setup();
    app.row_index = 1;
    run("set channel SHOP", &mut app, &mut ledger);
    assert_eq!(app.pending_edits.len(), 1);
    assert_eq!(ledger.sales()[1].channel, "MARKET");

    run("save", &mut app, &mut ledger);
    assert_eq!(app.input_mode, InputMode::Confirm);
    assert_eq!(app.pending_action, Some(PendingAction::SaveEdits { count: 1 }));

    confirm_pending(&mut app, &mut ledger).unwrap();
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.pending_edits.is_empty());
    assert_eq!(ledger.sales()[1].channel, "SHOP");
}

#[test]
fn test_set_item_rederives_item_list() {
    let (mut app, mut ledger) = setup();
    run("set item 2 lamp, 1 mug", &mut app, &mut ledger);
    let edited = app.pending_edits.get(&0).unwrap();
    assert_eq!(edited.items_text, "['lamp', 'mug']");
}

#[test]
fn test_set_rejects_bad_values() {
    let (mut app, mut ledger) = setup();
    run("set amount lots", &mut app, &mut ledger);
    assert!(app.pending_edits.is_empty());
    run("set colour red", &mut app, &mut ledger);
    assert_eq!(app.status_message, "unknown field 'colour'");
    run("set", &mut app, &mut ledger);
    assert!(app.status_message.starts_with("Usage: :set"));
}

#[test]
fn test_save_without_edits() {
    let (mut app, mut ledger) = setup();
    run("save", &mut app, &mut ledger);
    assert_eq!(app.status_message, "No unsaved edits");
    assert!(app.pending_action.is_none());
}

#[test]
fn test_reload_with_edits_asks_first() {
    let (mut app, mut ledger) = setup();
    run("set rent y", &mut app, &mut ledger);
    run("reload", &mut app, &mut ledger);
    assert_eq!(app.pending_action, Some(PendingAction::Reload));

    cancel_pending(&mut app);
    assert_eq!(app.pending_edits.len(), 1);

    run("reload", &mut app, &mut ledger);
    confirm_pending(&mut app, &mut ledger).unwrap();
    assert!(app.pending_edits.is_empty());
    assert!(app.status_message.starts_with("Data updated: 3 rows"));
}

// ── Data entry ────────────────────────────────────────────────

#[test]
fn test_draft_starts_after_highest_job() {
    let (app, _ledger) = setup();
    assert_eq!(app.draft.job_id, 4);
    assert_eq!(app.draft.channel, "ETSY");
}

#[test]
fn test_submit_appends_and_resets_draft() {
    let (mut app, mut ledger) = setup();
    run("new", &mut app, &mut ledger);
    run("set amount 30", &mut app, &mut ledger);
    run("set shipping 4.50", &mut app, &mut ledger);
    run("add 2 mug", &mut app, &mut ledger);
    run("add poster", &mut app, &mut ledger);
    run("submit", &mut app, &mut ledger);
    assert_eq!(app.pending_action, Some(PendingAction::SubmitEntry { job_id: 4 }));
    assert_eq!(app.confirm_message, "Add job #4 (ETSY, $34.50)?");

    confirm_pending(&mut app, &mut ledger).unwrap();
    let added = ledger.sales().last().unwrap();
    assert_eq!(added.job_id, 4);
    assert_eq!(added.item_text, "2 mug, 1 poster");
    assert_eq!(added.total_amount, dec!(34.50));
    assert_eq!(app.draft.job_id, 5);
    assert!(app.draft.items().is_empty());
    assert_eq!(app.last_entry.as_ref().map(|s| s.job_id), Some(4));
}

#[test]
fn test_submit_requires_channel() {
    let (mut app, mut ledger) = setup();
    app.draft.channel.clear();
    run("submit", &mut app, &mut ledger);
    assert_eq!(app.status_message, "Cannot submit: channel is required");
    assert!(app.pending_action.is_none());
}

#[test]
fn test_undo_and_clear_items() {
    let (mut app, mut ledger) = setup();
    run("add 1 mug", &mut app, &mut ledger);
    run("add 1 tee", &mut app, &mut ledger);
    run("undo", &mut app, &mut ledger);
    assert_eq!(app.draft.entries_text(), "1 mug");
    run("clear-items", &mut app, &mut ledger);
    run("undo", &mut app, &mut ledger);
    assert_eq!(app.status_message, "No items to remove");
}

// ── Basket parameters / export ────────────────────────────────

#[test]
fn test_basket_parameter_commands() {
    let (mut app, mut ledger) = setup();
    run("support 0.25", &mut app, &mut ledger);
    run("metric confidence", &mut app, &mut ledger);
    run("threshold 0.5", &mut app, &mut ledger);
    assert_eq!(app.basket_params.min_support, 0.25);
    assert_eq!(app.basket_params.metric, RuleMetric::Confidence);
    assert_eq!(app.basket_params.min_threshold, 0.5);

    run("support 2", &mut app, &mut ledger);
    assert_eq!(app.basket_params.min_support, 0.25);
    run("metric magic", &mut app, &mut ledger);
    assert_eq!(app.basket_params.metric, RuleMetric::Confidence);
}

#[test]
fn test_export_writes_filtered_rows() {
    let (mut app, mut ledger) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    run("search tee", &mut app, &mut ledger);
    run(&format!("export {}", path.display()), &mut app, &mut ledger);

    let exported = SheetFile::new(&path).read().unwrap();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].job_id, 2);
}
