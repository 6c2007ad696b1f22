#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::report::Granularity;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
}

fn inc(category: Option<IncomeItem>, amount: Option<Decimal>) -> IncomeEntry {
    let mut e = IncomeEntry::new(day());
    e.category = category;
    e.amount = amount;
    e.description = "x".into();
    e
}

fn paid(method: Option<Method>, amount: Decimal) -> ExpenseEntry {
    let mut e = ExpenseEntry::new(day());
    e.category = Some(ExpenseItem::Finance);
    e.method = method;
    e.amount = Some(amount);
    e
}

fn default_exclusions() -> Vec<IncomeItem> {
    NetExclusions::default().income
}

// ── summarize ─────────────────────────────────────────────────

#[test]
fn test_one_row_per_item_in_order() {
    let s = summarize::<IncomeItem>(&[], IncomeItem::all(), &default_exclusions());
    let items: Vec<SummaryLine<IncomeItem>> = s
        .rows
        .iter()
        .map(|r| r.line)
        .filter(|l| !l.is_total())
        .collect();
    let expected: Vec<SummaryLine<IncomeItem>> =
        IncomeItem::all().iter().map(|c| SummaryLine::Item(*c)).collect();
    assert_eq!(items, expected);
}

#[test]
fn test_empty_ledger_all_zero() {
    let s = summarize::<IncomeItem>(&[], IncomeItem::all(), &default_exclusions());
    assert!(s.rows.iter().all(|r| r.sum.is_zero()));
    assert!(s
        .rows
        .iter()
        .filter_map(|r| r.percent)
        .all(|p| p.is_zero()));
    assert!(s.unspecified().is_none());
    assert_eq!(s.rows.len(), IncomeItem::all().len() + 2);
}

#[test]
fn test_sums_and_percentages() {
    let entries = vec![
        inc(Some(IncomeItem::Tithe), Some(dec!(600))),
        inc(Some(IncomeItem::Tithe), Some(dec!(150))),
        inc(Some(IncomeItem::ThanksOffering), Some(dec!(250))),
        inc(Some(IncomeItem::MissionOffering), None),
    ];
    let s = summarize(&entries, IncomeItem::all(), &default_exclusions());
    let tithe = s.row(IncomeItem::Tithe).unwrap();
    assert_eq!(tithe.sum, dec!(750));
    assert_eq!(tithe.percent, Some(dec!(75.0)));
    assert_eq!(
        s.row(IncomeItem::ThanksOffering).unwrap().percent,
        Some(dec!(25.0))
    );
    assert_eq!(s.row(IncomeItem::MissionOffering).unwrap().sum, dec!(0));
    assert_eq!(s.grand_total(), dec!(1000));
    assert_eq!(s.net_total(), dec!(1000));
}

#[test]
fn test_unspecified_bucket() {
    let entries = vec![
        inc(None, Some(dec!(100))),
        inc(Some(IncomeItem::Tithe), Some(dec!(300))),
    ];
    let s = summarize(&entries, IncomeItem::all(), &default_exclusions());
    let unspecified = s.unspecified().unwrap();
    assert_eq!(unspecified.label, "(미지정)");
    assert_eq!(unspecified.sum, dec!(100));
    assert_eq!(unspecified.percent, Some(dec!(25.0)));
    assert_eq!(s.grand_total(), dec!(400));
}

#[test]
fn test_unspecified_bucket_omitted_when_zero() {
    let entries = vec![inc(None, None), inc(None, Some(dec!(0)))];
    let s = summarize(&entries, IncomeItem::all(), &default_exclusions());
    assert!(s.unspecified().is_none());
}

#[test]
fn test_category_outside_items_goes_to_unspecified() {
    let entries = vec![
        inc(Some(IncomeItem::Loan), Some(dec!(50))),
        inc(Some(IncomeItem::Tithe), Some(dec!(50))),
    ];
    let s = summarize(&entries, &[IncomeItem::Tithe], &[]);
    assert_eq!(s.unspecified().unwrap().sum, dec!(50));
    assert_eq!(s.rows.len(), 4);
}

#[test]
fn test_net_total_excludes_carry_over() {
    let entries = vec![
        inc(Some(IncomeItem::Tithe), Some(dec!(800))),
        inc(Some(IncomeItem::CarryForward), Some(dec!(5000))),
        inc(Some(IncomeItem::Deposit), Some(dec!(200))),
    ];
    let s = summarize(&entries, IncomeItem::all(), &default_exclusions());
    assert_eq!(s.grand_total(), dec!(6000));
    assert_eq!(s.net_total(), dec!(800));
    // Shares are of every row, excluded categories included.
    assert_eq!(s.row(IncomeItem::Tithe).unwrap().percent, Some(dec!(13.3)));
    assert_eq!(
        s.row(IncomeItem::CarryForward).unwrap().percent,
        Some(dec!(83.3))
    );
    assert_eq!(s.row(IncomeItem::Deposit).unwrap().percent, Some(dec!(3.3)));

    let net_row = s.rows.last().unwrap();
    assert_eq!(net_row.label, "순합계(예치금/이월금 제외)");
    assert_eq!(net_row.percent, None);
    assert_eq!(s.rows[s.rows.len() - 2].label, "합계 금액");
}

#[test]
fn test_excluded_categories_keep_their_share() {
    let entries = vec![
        inc(Some(IncomeItem::Tithe), Some(dec!(800))),
        inc(Some(IncomeItem::CarryForward), Some(dec!(200))),
    ];
    let s = summarize(&entries, IncomeItem::all(), &default_exclusions());
    assert_eq!(s.row(IncomeItem::Tithe).unwrap().percent, Some(dec!(80.0)));
    assert_eq!(
        s.row(IncomeItem::CarryForward).unwrap().percent,
        Some(dec!(20.0))
    );
    assert_eq!(s.net_total(), dec!(800));
}

#[test]
fn test_only_excluded_activity_gives_zero_net() {
    let entries = vec![inc(Some(IncomeItem::CarryForward), Some(dec!(900)))];
    let s = summarize(&entries, IncomeItem::all(), &default_exclusions());
    assert_eq!(s.net_total(), dec!(0));
    assert_eq!(s.grand_total(), dec!(900));
    assert_eq!(
        s.row(IncomeItem::CarryForward).unwrap().percent,
        Some(dec!(100.0))
    );
}

#[test]
fn test_percentages_sum_to_hundred() {
    let entries = vec![
        inc(Some(IncomeItem::Tithe), Some(dec!(100))),
        inc(Some(IncomeItem::WeeklyOffering), Some(dec!(100))),
        inc(Some(IncomeItem::BuildingOffering), Some(dec!(100))),
        inc(None, Some(dec!(37))),
    ];
    let s = summarize(&entries, IncomeItem::all(), &default_exclusions());
    let sum: Decimal = s.rows.iter().filter_map(|r| r.percent).sum();
    assert!((sum - dec!(100)).abs() <= dec!(0.1), "{sum}");
}

#[test]
fn test_sums_rounded_to_whole_won() {
    let entries = vec![
        inc(Some(IncomeItem::Tithe), Some(dec!(1000.6))),
        inc(None, Some(dec!(99.4))),
    ];
    let s = summarize(&entries, IncomeItem::all(), &[]);
    assert_eq!(s.row(IncomeItem::Tithe).unwrap().sum, dec!(1001));
    assert_eq!(s.unspecified().unwrap().sum, dec!(99));
    assert_eq!(s.grand_total(), dec!(1100));
    assert_eq!(s.rows.last().unwrap().label, "순합계");
}

// ── method_split ──────────────────────────────────────────────

#[test]
fn test_method_split() {
    let entries = vec![
        paid(Some(Method::Cash), dec!(300)),
        paid(Some(Method::Bank), dec!(600)),
        paid(None, dec!(100)),
    ];
    let split = method_split(&entries);
    assert_eq!(split.cash, dec!(300));
    assert_eq!(split.bank, dec!(600));
    assert_eq!(split.unassigned, dec!(100));
    assert_eq!(split.cash_percent, dec!(30.0));
    assert_eq!(split.bank_percent, dec!(60.0));
    assert_eq!(split.unassigned_percent, dec!(10.0));
}

#[test]
fn test_method_split_empty() {
    let split = method_split::<ExpenseItem>(&[]);
    assert_eq!(split, MethodSplit::default());
}

// ── PeriodReport ──────────────────────────────────────────────

#[test]
fn test_period_report_totals() {
    let period = Period::resolve(Granularity::Day, day());
    let income = vec![
        inc(Some(IncomeItem::Tithe), Some(dec!(1000))),
        inc(Some(IncomeItem::CarryForward), Some(dec!(500))),
    ];
    let expense = vec![paid(Some(Method::Cash), dec!(400))];
    let report = PeriodReport::build(period, &income, &expense, &NetExclusions::default());
    assert_eq!(report.income_total, dec!(1500));
    assert_eq!(report.expense_total, dec!(400));
    assert_eq!(report.net_balance(), dec!(1100));
    assert_eq!(report.income.net_total(), dec!(1000));
    assert_eq!(report.expense_methods.cash_percent, dec!(100.0));
}

#[test]
fn test_percent_of() {
    assert_eq!(percent_of(dec!(1), dec!(3)), dec!(33.3));
    assert_eq!(percent_of(dec!(2), dec!(3)), dec!(66.7));
    assert_eq!(percent_of(dec!(5), dec!(0)), dec!(0));
    assert_eq!(percent_of(dec!(5), dec!(-10)), dec!(0));
}
