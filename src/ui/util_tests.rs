#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::util::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
}

#[test]
fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 5), "hell…");
}

#[test]
fn test_truncate_zero_max() {
    assert_eq!(truncate("hello", 0), "");
}

#[test]
fn test_truncate_hangul() {
    assert_eq!(truncate("부활절감사헌금", 4), "부활절…");
}

#[test]
fn test_truncate_one_char() {
    assert_eq!(truncate("십일조", 1), "…");
}

// ── format_won ────────────────────────────────────────────────

#[test]
fn test_format_won_basic() {
    assert_eq!(format_won(dec!(1234567)), "₩1,234,567");
}

#[test]
fn test_format_won_small() {
    assert_eq!(format_won(dec!(500)), "₩500");
}

#[test]
fn test_format_won_zero() {
    assert_eq!(format_won(dec!(0)), "₩0");
}

#[test]
fn test_format_won_negative() {
    assert_eq!(format_won(dec!(-42500)), "-₩42,500");
}

#[test]
fn test_format_won_rounds_fraction() {
    assert_eq!(format_won(dec!(1234.6)), "₩1,235");
    assert_eq!(format_won(dec!(-0.2)), "₩0");
}

#[test]
fn test_format_won_exact_thousand() {
    assert_eq!(format_won(dec!(100000)), "₩100,000");
}

// ── format_number ─────────────────────────────────────────────

#[test]
fn test_format_number() {
    assert_eq!(format_number(dec!(0)), "0");
    assert_eq!(format_number(dec!(999)), "999");
    assert_eq!(format_number(dec!(1000)), "1,000");
    assert_eq!(format_number(dec!(-1234567)), "-1,234,567");
}

// ── format_percent ────────────────────────────────────────────

#[test]
fn test_format_percent() {
    assert_eq!(format_percent(Some(dec!(76.92))), "76.9%");
    assert_eq!(format_percent(Some(dec!(0))), "0.0%");
    assert_eq!(format_percent(Some(dec!(100))), "100.0%");
    assert_eq!(format_percent(None), "");
}

// ── cursor helpers ────────────────────────────────────────────

#[test]
fn test_scroll_down_moves_window() {
    let (mut index, mut scroll) = (0, 0);
    for _ in 0..5 {
        scroll_down(&mut index, &mut scroll, 10, 3);
    }
    assert_eq!(index, 5);
    assert_eq!(scroll, 3);
}

#[test]
fn test_scroll_down_stops_at_end() {
    let (mut index, mut scroll) = (2, 0);
    scroll_down(&mut index, &mut scroll, 3, 10);
    assert_eq!(index, 2);
}

#[test]
fn test_scroll_up_follows_cursor() {
    let (mut index, mut scroll) = (3, 3);
    scroll_up(&mut index, &mut scroll);
    assert_eq!((index, scroll), (2, 2));
    scroll_to_top(&mut index, &mut scroll);
    assert_eq!((index, scroll), (0, 0));
    scroll_up(&mut index, &mut scroll);
    assert_eq!((index, scroll), (0, 0));
}

#[test]
fn test_scroll_to_bottom() {
    let (mut index, mut scroll) = (0, 0);
    scroll_to_bottom(&mut index, &mut scroll, 20, 5);
    assert_eq!((index, scroll), (19, 15));
    scroll_to_bottom(&mut index, &mut scroll, 0, 5);
    assert_eq!((index, scroll), (19, 15));
}

#[test]
fn test_clamp_cursor_after_shrink() {
    let (mut index, mut scroll) = (7, 6);
    clamp_cursor(&mut index, &mut scroll, 3);
    assert_eq!((index, scroll), (2, 2));
    clamp_cursor(&mut index, &mut scroll, 0);
    assert_eq!((index, scroll), (0, 0));
}
