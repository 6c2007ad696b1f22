use rust_decimal::Decimal;
use std::collections::HashMap;

use super::period::Period;
use crate::models::{
    total, ExpenseEntry, ExpenseItem, IncomeEntry, IncomeItem, Item, LedgerEntry, Method,
    UNSPECIFIED_LABEL,
};

pub(crate) const GRAND_TOTAL_LABEL: &str = "합계 금액";

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Categories left out of net totals and monthly percentage bases, per ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NetExclusions {
    pub(crate) income: Vec<IncomeItem>,
    pub(crate) expense: Vec<ExpenseItem>,
}

impl Default for NetExclusions {
    fn default() -> Self {
        Self {
            income: vec![IncomeItem::Deposit, IncomeItem::CarryForward],
            expense: vec![ExpenseItem::Deposit, ExpenseItem::CarryForward],
        }
    }
}

/// What a summary row stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum SummaryLine<C> {
    Item(C),
    Unspecified,
    GrandTotal,
    NetTotal,
}

impl<C: Item> SummaryLine<C> {
    pub(crate) fn is_total(&self) -> bool {
        matches!(self, Self::GrandTotal | Self::NetTotal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SummaryRow<C> {
    pub(crate) line: SummaryLine<C>,
    pub(crate) label: String,
    pub(crate) sum: Decimal,
    /// Blank on the two total rows.
    pub(crate) percent: Option<Decimal>,
}

/// Per-category totals of one ledger over a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReportSummary<C> {
    pub(crate) rows: Vec<SummaryRow<C>>,
}

impl<C: Item> ReportSummary<C> {
    #[cfg(test)]
    pub(crate) fn row(&self, item: C) -> Option<&SummaryRow<C>> {
        self.rows.iter().find(|r| r.line == SummaryLine::Item(item))
    }

    #[cfg(test)]
    pub(crate) fn unspecified(&self) -> Option<&SummaryRow<C>> {
        self.rows
            .iter()
            .find(|r| r.line == SummaryLine::Unspecified)
    }

    #[cfg(test)]
    pub(crate) fn grand_total(&self) -> Decimal {
        self.line_sum(SummaryLine::GrandTotal)
    }

    #[cfg(test)]
    pub(crate) fn net_total(&self) -> Decimal {
        self.line_sum(SummaryLine::NetTotal)
    }

    #[cfg(test)]
    fn line_sum(&self, line: SummaryLine<C>) -> Decimal {
        self.rows
            .iter()
            .find(|r| r.line == line)
            .map_or(Decimal::ZERO, |r| r.sum)
    }
}

/// "순합계(예치금/이월금 제외)", or plain "순합계" when nothing is excluded.
pub(crate) fn net_total_label<C: Item>(exclusions: &[C]) -> String {
    if exclusions.is_empty() {
        return "순합계".to_string();
    }
    let names: Vec<&str> = exclusions.iter().map(|c| c.as_str()).collect();
    format!("순합계({} 제외)", names.join("/"))
}

/// Group `entries` by category over the `items` vocabulary and append grand
/// and net totals.
pub(crate) fn summarize<C: Item>(
    entries: &[LedgerEntry<C>],
    items: &[C],
    exclusions: &[C],
) -> ReportSummary<C> {
    let mut sums: HashMap<C, Decimal> = HashMap::new();
    let mut unspecified = Decimal::ZERO;
    for entry in entries {
        match entry.category.filter(|c| items.contains(c)) {
            Some(c) => *sums.entry(c).or_default() += entry.amount_or_zero(),
            None => unspecified += entry.amount_or_zero(),
        }
    }

    let mut lines: Vec<(SummaryLine<C>, Decimal)> = items
        .iter()
        .map(|c| {
            let sum = sums.get(c).copied().unwrap_or_default();
            (SummaryLine::Item(*c), sum.round_dp(0))
        })
        .collect();
    if !unspecified.is_zero() {
        lines.push((SummaryLine::Unspecified, unspecified.round_dp(0)));
    }

    let grand: Decimal = lines.iter().map(|(_, sum)| *sum).sum();
    let excluded: Decimal = lines
        .iter()
        .filter(|(line, _)| is_excluded(line, exclusions))
        .map(|(_, sum)| *sum)
        .sum();
    let net = grand - excluded;

    let mut rows: Vec<SummaryRow<C>> = lines
        .into_iter()
        .map(|(line, sum)| SummaryRow {
            label: match line {
                SummaryLine::Item(c) => c.as_str().to_string(),
                _ => UNSPECIFIED_LABEL.to_string(),
            },
            percent: Some(percent_of(sum, grand)),
            line,
            sum,
        })
        .collect();

    rows.push(SummaryRow {
        line: SummaryLine::GrandTotal,
        label: GRAND_TOTAL_LABEL.to_string(),
        sum: grand,
        percent: None,
    });
    rows.push(SummaryRow {
        line: SummaryLine::NetTotal,
        label: net_total_label(exclusions),
        sum: net,
        percent: None,
    });

    ReportSummary { rows }
}

fn is_excluded<C: Item>(line: &SummaryLine<C>, exclusions: &[C]) -> bool {
    matches!(line, SummaryLine::Item(c) if exclusions.contains(c))
}

/// `part / whole * 100` to one decimal; 0 when `whole` is not positive.
pub(crate) fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .map_or(Decimal::ZERO, |p| p.round_dp(1))
}

/// Cash / bank breakdown of one ledger. Percentages are of the ledger total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MethodSplit {
    pub(crate) cash: Decimal,
    pub(crate) bank: Decimal,
    pub(crate) unassigned: Decimal,
    pub(crate) cash_percent: Decimal,
    pub(crate) bank_percent: Decimal,
    pub(crate) unassigned_percent: Decimal,
}

pub(crate) fn method_split<C: Item>(entries: &[LedgerEntry<C>]) -> MethodSplit {
    let mut split = MethodSplit::default();
    for entry in entries {
        let amount = entry.amount_or_zero();
        match entry.method {
            Some(Method::Cash) => split.cash += amount,
            Some(Method::Bank) => split.bank += amount,
            None => split.unassigned += amount,
        }
    }
    let all = split.cash + split.bank + split.unassigned;
    split.cash_percent = percent_of(split.cash, all);
    split.bank_percent = percent_of(split.bank, all);
    split.unassigned_percent = percent_of(split.unassigned, all);
    split
}

/// Everything the period report shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PeriodReport {
    pub(crate) period: Period,
    pub(crate) income_total: Decimal,
    pub(crate) expense_total: Decimal,
    pub(crate) income: ReportSummary<IncomeItem>,
    pub(crate) expense: ReportSummary<ExpenseItem>,
    pub(crate) income_methods: MethodSplit,
    pub(crate) expense_methods: MethodSplit,
}

impl PeriodReport {
    pub(crate) fn build(
        period: Period,
        income: &[IncomeEntry],
        expense: &[ExpenseEntry],
        exclusions: &NetExclusions,
    ) -> Self {
        Self {
            period,
            income_total: total(income),
            expense_total: total(expense),
            income: summarize(income, IncomeItem::all(), &exclusions.income),
            expense: summarize(expense, ExpenseItem::all(), &exclusions.expense),
            income_methods: method_split(income),
            expense_methods: method_split(expense),
        }
    }

    /// Income minus expense.
    pub(crate) fn net_balance(&self) -> Decimal {
        self.income_total - self.expense_total
    }
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
