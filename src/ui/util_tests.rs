#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::util::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("poster", 10), "poster");
    assert_eq!(truncate("poster", 6), "poster");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("tote bag deluxe", 8), "tote ba…");
}

#[test]
fn test_truncate_edges() {
    assert_eq!(truncate("", 5), "");
    assert_eq!(truncate("mug", 0), "");
    assert_eq!(truncate("mug", 1), "…");
    assert_eq!(truncate("m", 1), "m");
}

#[test]
fn test_truncate_multibyte() {
    assert_eq!(truncate("café crème", 5), "café…");
    assert_eq!(truncate("日本語テスト", 4), "日本語…");
}

// ── format_amount ─────────────────────────────────────────────

#[test]
fn test_format_amount_groups_thousands() {
    assert_eq!(format_amount(dec!(999.99)), "$999.99");
    assert_eq!(format_amount(dec!(1234.56)), "$1,234.56");
    assert_eq!(format_amount(dec!(1234567.89)), "$1,234,567.89");
}

#[test]
fn test_format_amount_pads_cents() {
    assert_eq!(format_amount(dec!(0)), "$0.00");
    assert_eq!(format_amount(dec!(5)), "$5.00");
    assert_eq!(format_amount(dec!(1.5)), "$1.50");
}

#[test]
fn test_format_amount_negative() {
    assert_eq!(format_amount(dec!(-42.50)), "-$42.50");
    assert_eq!(format_amount(dec!(-99999.01)), "-$99,999.01");
}

// ── format_measure ────────────────────────────────────────────

#[test]
fn test_format_measure() {
    assert_eq!(format_measure(Some(1.25)), "1.2500");
    assert_eq!(format_measure(Some(0.0)), "0.0000");
    assert_eq!(format_measure(None), "inf");
    assert_eq!(format_measure(Some(f64::INFINITY)), "inf");
}

// ── scrolling ─────────────────────────────────────────────────

#[test]
fn test_scroll_down_keeps_cursor_in_window() {
    let (mut index, mut scroll) = (0, 0);
    for _ in 0..4 {
        scroll_down(&mut index, &mut scroll, 10, 3);
    }
    assert_eq!((index, scroll), (4, 2));
}

#[test]
fn test_scroll_down_stops_at_end() {
    let (mut index, mut scroll) = (2, 0);
    scroll_down(&mut index, &mut scroll, 3, 5);
    assert_eq!((index, scroll), (2, 0));
}

#[test]
fn test_scroll_up_pulls_window() {
    let (mut index, mut scroll) = (3, 3);
    scroll_up(&mut index, &mut scroll);
    assert_eq!((index, scroll), (2, 2));

    let (mut index, mut scroll) = (0, 0);
    scroll_up(&mut index, &mut scroll);
    assert_eq!((index, scroll), (0, 0));
}

#[test]
fn test_scroll_to_ends() {
    let (mut index, mut scroll) = (0, 0);
    scroll_to_bottom(&mut index, &mut scroll, 10, 4);
    assert_eq!((index, scroll), (9, 6));

    scroll_to_top(&mut index, &mut scroll);
    assert_eq!((index, scroll), (0, 0));

    scroll_to_bottom(&mut index, &mut scroll, 0, 4);
    assert_eq!((index, scroll), (0, 0));
}
