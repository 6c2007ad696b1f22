use chrono::Datelike;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::summary::{percent_of, SummaryLine, GRAND_TOTAL_LABEL};
use crate::models::{Item, LedgerEntry, UNSPECIFIED_LABEL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MonthlyRow<C> {
    pub(crate) line: SummaryLine<C>,
    pub(crate) label: String,
    /// January first. Each cell rounded to whole won.
    pub(crate) months: [Decimal; 12],
    pub(crate) total: Decimal,
    pub(crate) percent: Decimal,
}

/// Category × month pivot of one ledger for a year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MonthlyStatus<C> {
    pub(crate) year: i32,
    pub(crate) rows: Vec<MonthlyRow<C>>,
}

impl<C: Item> MonthlyStatus<C> {
    /// "월별 현황(수입)" or "월별 현황(지출)".
    pub(crate) fn title(&self) -> String {
        format!("월별 현황({})", C::KIND.as_str())
    }

    #[cfg(test)]
    pub(crate) fn row(&self, line: SummaryLine<C>) -> Option<&MonthlyRow<C>> {
        self.rows.iter().find(|r| r.line == line)
    }
}

pub(crate) fn monthly_status<C: Item>(
    year: i32,
    entries: &[LedgerEntry<C>],
    items: &[C],
    exclusions: &[C],
) -> MonthlyStatus<C> {
    let mut cells: HashMap<SummaryLine<C>, [Decimal; 12]> = HashMap::new();
    for entry in entries {
        let Some(date) = entry.date.filter(|d| d.year() == year) else {
            continue;
        };
        let line = match entry.category.filter(|c| items.contains(c)) {
            Some(c) => SummaryLine::Item(c),
            None => SummaryLine::Unspecified,
        };
        cells.entry(line).or_insert([Decimal::ZERO; 12])[date.month0() as usize] +=
            entry.amount_or_zero();
    }

    let mut lines: Vec<SummaryLine<C>> = items.iter().map(|c| SummaryLine::Item(*c)).collect();
    if cells
        .get(&SummaryLine::Unspecified)
        .is_some_and(|m| m.iter().any(|v| !v.is_zero()))
    {
        lines.push(SummaryLine::Unspecified);
    }

    let mut rows: Vec<MonthlyRow<C>> = lines
        .into_iter()
        .map(|line| {
            let raw = cells.get(&line).copied().unwrap_or([Decimal::ZERO; 12]);
            MonthlyRow {
                label: match line {
                    SummaryLine::Item(c) => c.as_str().to_string(),
                    _ => UNSPECIFIED_LABEL.to_string(),
                },
                months: raw.map(|v| v.round_dp(0)),
                total: raw.iter().copied().sum::<Decimal>().round_dp(0),
                percent: Decimal::ZERO,
                line,
            }
        })
        .collect();

    let excluded = |line: &SummaryLine<C>| matches!(line, SummaryLine::Item(c) if exclusions.contains(c));

    let mut grand = [Decimal::ZERO; 12];
    let mut net = [Decimal::ZERO; 12];
    for row in &rows {
        for (m, value) in row.months.iter().enumerate() {
            grand[m] += *value;
            if !excluded(&row.line) {
                net[m] += *value;
            }
        }
    }
    let grand_total: Decimal = rows.iter().map(|r| r.total).sum();
    let net_total: Decimal = rows
        .iter()
        .filter(|r| !excluded(&r.line))
        .map(|r| r.total)
        .sum();

    for row in &mut rows {
        if !excluded(&row.line) {
            row.percent = percent_of(row.total, net_total);
        }
    }

    let trailing = if net_total > Decimal::ZERO {
        Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    rows.push(MonthlyRow {
        line: SummaryLine::GrandTotal,
        label: GRAND_TOTAL_LABEL.to_string(),
        months: grand,
        total: grand_total,
        percent: trailing,
    });
    rows.push(MonthlyRow {
        line: SummaryLine::NetTotal,
        label: C::KIND.net_label().to_string(),
        months: net,
        total: net_total,
        percent: trailing,
    });

    MonthlyStatus { year, rows }
}

#[cfg(test)]
#[path = "monthly_tests.rs"]
mod tests;
