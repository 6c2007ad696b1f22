mod monthly;
mod period;
mod summary;

pub(crate) use monthly::{monthly_status, MonthlyStatus};
pub(crate) use period::{Granularity, Period};
pub(crate) use summary::{MethodSplit, NetExclusions, PeriodReport, ReportSummary, SummaryLine};

use chrono::NaiveDate;

use crate::db::Database;
use crate::error::StorageError;
use crate::models::Item;

/// Load the rows of `period` and aggregate them.
pub(crate) fn load_period_report(
    db: &Database,
    period: Period,
    exclusions: &NetExclusions,
) -> Result<PeriodReport, StorageError> {
    let (income, expense) = db.fetch_range(period.start, period.end)?;
    Ok(PeriodReport::build(period, &income, &expense, exclusions))
}

/// Load one ledger for `year` and pivot it by month.
pub(crate) fn load_monthly_status<C: Item>(
    db: &Database,
    year: i32,
    exclusions: &[C],
) -> Result<MonthlyStatus<C>, StorageError> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year, 12, 31);
    let entries = match start.zip(end) {
        Some((start, end)) => db.fetch_entries::<C>(start, end)?,
        None => Vec::new(),
    };
    Ok(monthly_status(year, &entries, C::all(), exclusions))
}
