#![allow(clippy::unwrap_used)]

use super::*;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_day_period() {
    let p = Period::resolve(Granularity::Day, ymd(2024, 6, 2));
    assert_eq!((p.start, p.end), (ymd(2024, 6, 2), ymd(2024, 6, 2)));
    assert_eq!(p.label, "2024년 6월 2일(일)");
}

#[test]
fn test_week_starts_on_sunday() {
    // 2024-06-05 is a Wednesday.
    let p = Period::resolve(Granularity::Week, ymd(2024, 6, 5));
    assert_eq!((p.start, p.end), (ymd(2024, 6, 2), ymd(2024, 6, 8)));
    assert_eq!(p.label, "2024년 6월 1주차(주)");
}

#[test]
fn test_week_before_first_sunday_uses_first_sunday() {
    // June 2024 begins on a Saturday.
    let p = Period::resolve(Granularity::Week, ymd(2024, 6, 1));
    assert_eq!((p.start, p.end), (ymd(2024, 6, 2), ymd(2024, 6, 8)));
}

#[test]
fn test_week_clamped_to_month_end() {
    let p = Period::resolve(Granularity::Week, ymd(2024, 6, 30));
    assert_eq!((p.start, p.end), (ymd(2024, 6, 30), ymd(2024, 6, 30)));
    assert_eq!(p.label, "2024년 6월 5주차(주)");
}

#[test]
fn test_month_period() {
    let p = Period::resolve(Granularity::Month, ymd(2024, 2, 14));
    assert_eq!((p.start, p.end), (ymd(2024, 2, 1), ymd(2024, 2, 29)));
    assert_eq!(p.label, "2024년 2월(월)");
}

#[test]
fn test_quarter_period() {
    let p = Period::resolve(Granularity::Quarter, ymd(2024, 5, 20));
    assert_eq!((p.start, p.end), (ymd(2024, 4, 1), ymd(2024, 6, 30)));
    assert_eq!(p.label, "2024년 2/4분기(분기)");

    let p = Period::resolve(Granularity::Quarter, ymd(2024, 12, 31));
    assert_eq!((p.start, p.end), (ymd(2024, 10, 1), ymd(2024, 12, 31)));
}

#[test]
fn test_year_period() {
    let p = Period::resolve(Granularity::Year, ymd(2024, 7, 4));
    assert_eq!((p.start, p.end), (ymd(2024, 1, 1), ymd(2024, 12, 31)));
    assert_eq!(p.label, "2024년(년)");
}

#[test]
fn test_periods_contain_reference_date() {
    let mut date = ymd(2024, 1, 1);
    while date <= ymd(2024, 12, 31) {
        for g in Granularity::all() {
            let p = Period::resolve(*g, date);
            assert!(p.start <= p.end);
            // The only dates outside their own week are those before a
            // month's first Sunday.
            if *g != Granularity::Week {
                assert!(p.contains(date), "{g} {date}");
            }
        }
        date = date.succ_opt().unwrap();
    }
}

#[test]
fn test_week_never_crosses_month() {
    let mut date = ymd(2024, 1, 1);
    while date <= ymd(2024, 12, 31) {
        let p = Period::resolve(Granularity::Week, date);
        assert_eq!(p.start.month(), date.month());
        assert_eq!(p.end.month(), date.month());
        assert_eq!(p.start.weekday(), Weekday::Sun);
        date = date.succ_opt().unwrap();
    }
}

#[test]
fn test_step_month_and_year() {
    let p = Period::resolve(Granularity::Month, ymd(2024, 1, 15));
    assert_eq!(p.previous().start, ymd(2023, 12, 1));
    assert_eq!(p.next().start, ymd(2024, 2, 1));

    let p = Period::resolve(Granularity::Year, ymd(2024, 1, 15));
    assert_eq!(p.previous().label, "2023년(년)");
    assert_eq!(p.next().label, "2025년(년)");
}

#[test]
fn test_step_quarter() {
    let p = Period::resolve(Granularity::Quarter, ymd(2024, 2, 1));
    assert_eq!(p.previous().label, "2023년 4/4분기(분기)");
    assert_eq!(p.next().label, "2024년 2/4분기(분기)");
}

#[test]
fn test_step_week_across_months() {
    let first = Period::resolve(Granularity::Week, ymd(2024, 6, 5));
    let prev = first.previous();
    assert_eq!((prev.start, prev.end), (ymd(2024, 5, 26), ymd(2024, 5, 31)));

    let last = Period::resolve(Granularity::Week, ymd(2024, 6, 30));
    let next = last.next();
    assert_eq!(next.start, ymd(2024, 7, 7));
    assert_eq!(next.previous(), last);
}

#[test]
fn test_step_day() {
    let p = Period::resolve(Granularity::Day, ymd(2024, 3, 1));
    assert_eq!(p.previous().start, ymd(2024, 2, 29));
    assert_eq!(p.next().start, ymd(2024, 3, 2));
}

#[test]
fn test_granularity_parse() {
    assert_eq!(Granularity::parse("Week"), Some(Granularity::Week));
    assert_eq!(Granularity::parse("분기"), Some(Granularity::Quarter));
    assert_eq!(Granularity::parse("decade"), None);
}
