use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Settings;
use crate::db::{DayLedger, Database};
use crate::export;
use crate::import::CsvImporter;
use crate::models::{total, ExpenseItem, IncomeItem, Item, LedgerEntry, LedgerKind};
use crate::normalize::{self, RawRow};
use crate::report::{self, Granularity, Period, ReportSummary};
use crate::ui::util::{format_percent, format_won};

pub(crate) fn as_cli(args: &[String], db: &mut Database, settings: &Settings) -> Result<()> {
    match args[1].as_str() {
        "day" | "d" => cli_day(&args[2..], db),
        "save" => cli_save(&args[2..], db),
        "report" | "r" => cli_report(&args[2..], db, settings),
        "monthly" | "m" => cli_monthly(&args[2..], db, settings),
        "export-day" => cli_export_day(&args[2..], db, settings),
        "export-all" => cli_export_all(&args[2..], db, settings),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("churchledger {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("ChurchLedger: daily income and expense ledger for a church office");
    println!();
    println!("Usage: churchledger [command]");
    println!();
    println!("Commands:");
    println!("  (none)                              Launch interactive TUI");
    println!("  day [YYYY-MM-DD]                    Print the ledger of a day (default: today)");
    println!("  save <YYYY-MM-DD>                   Replace a day with rows from CSV grids");
    println!("    --income <file.csv>               Income grid (default: keep stored rows)");
    println!("    --expense <file.csv>              Expense grid (default: keep stored rows)");
    println!("  report <granularity> [YYYY-MM-DD]   Print a day/week/month/quarter/year report");
    println!("    --xlsx <path>                     Also write it as a workbook");
    println!("  monthly <income|expense> [YYYY]     Print the month-by-month status of a year");
    println!("    --xlsx <path>                     Also write it as a workbook");
    println!("  export-day <YYYY-MM-DD> [path]      Write a day workbook");
    println!("  export-all [path]                   Write every stored row to a workbook");
    println!("  --help, -h                          Show this help");
    println!("  --version, -V                       Show version");
}

// ── Argument helpers ─────────────────────────────────────────

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

/// Positional arguments, skipping `--flag value` pairs.
fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn date_arg(arg: Option<&str>) -> Result<NaiveDate> {
    match arg {
        None | Some("today") => Ok(Local::now().date_naive()),
        Some(s) => normalize::parse_date(s)
            .ok_or_else(|| anyhow::anyhow!("Invalid date: {s}. Use YYYY-MM-DD")),
    }
}

fn output_path(arg: Option<&str>, default_dir: &Path, file_name: String) -> PathBuf {
    match arg {
        Some(p) => PathBuf::from(shellexpand(p)),
        None => default_dir.join(file_name),
    }
}

// ── Commands ─────────────────────────────────────────────────

fn cli_day(args: &[String], db: &mut Database) -> Result<()> {
    let date = date_arg(positional(args).first().copied())?;
    let day = db.fetch_day(date)?;
    print_day(&day);
    Ok(())
}

fn cli_save(args: &[String], db: &mut Database) -> Result<()> {
    let Some(date) = positional(args).first().copied() else {
        anyhow::bail!("Usage: churchledger save <YYYY-MM-DD> [--income <file.csv>] [--expense <file.csv>]");
    };
    let date = date_arg(Some(date))?;
    let income_file = flag(args, "--income");
    let expense_file = flag(args, "--expense");
    if income_file.is_none() && expense_file.is_none() {
        anyhow::bail!("Nothing to save: pass --income and/or --expense");
    }

    let stored = db.fetch_day(date)?;
    let income = match income_file {
        Some(path) => read_grid(path, LedgerKind::Income)?,
        None => stored.income.iter().map(LedgerEntry::to_raw).collect(),
    };
    let expense = match expense_file {
        Some(path) => read_grid(path, LedgerKind::Expense)?,
        None => stored.expense.iter().map(LedgerEntry::to_raw).collect(),
    };

    let revision = db.save_day(date, &income, &expense)?;
    let saved = db.fetch_day(date)?;
    info!(%date, revision, "saved from cli");
    println!(
        "Saved {date}: {} income, {} expense rows (revision {revision})",
        saved.income.len(),
        saved.expense.len()
    );
    Ok(())
}

fn read_grid(path: &str, kind: LedgerKind) -> Result<Vec<RawRow>> {
    let path = PathBuf::from(shellexpand(path));
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    CsvImporter::read(&path, kind)
}

fn cli_report(args: &[String], db: &mut Database, settings: &Settings) -> Result<()> {
    let pos = positional(args);
    let Some(granularity) = pos.first().copied() else {
        anyhow::bail!("Usage: churchledger report <day|week|month|quarter|year> [YYYY-MM-DD] [--xlsx <path>]");
    };
    let granularity = Granularity::parse(granularity)
        .ok_or_else(|| anyhow::anyhow!("Unknown period: {granularity}"))?;
    let date = date_arg(pos.get(1).copied())?;

    let period = Period::resolve(granularity, date);
    let report = report::load_period_report(db, period, &settings.exclusions)?;

    println!("{} 재정보고: {}", settings.organization, report.period.label);
    println!(
        "{} ~ {}",
        report.period.start.format("%Y-%m-%d"),
        report.period.end.format("%Y-%m-%d")
    );
    println!("{}", "─".repeat(48));
    println!("  수입 합계   {:>16}", format_won(report.income_total));
    println!("  지출 합계   {:>16}", format_won(report.expense_total));
    println!("  차액        {:>16}", format_won(report.net_balance()));
    print_summary(&report.income);
    print_summary(&report.expense);

    if let Some(path) = flag(args, "--xlsx") {
        let bytes = export::export_report(&report)?;
        let path = export::write_file(Path::new(&shellexpand(path)), &bytes)?;
        println!();
        println!("Exported to {}", path.display());
    }
    Ok(())
}

fn cli_monthly(args: &[String], db: &mut Database, settings: &Settings) -> Result<()> {
    let pos = positional(args);
    let Some(kind) = pos.first().copied() else {
        anyhow::bail!("Usage: churchledger monthly <income|expense> [YYYY] [--xlsx <path>]");
    };
    let kind = LedgerKind::parse(kind).ok_or_else(|| anyhow::anyhow!("Unknown ledger: {kind}"))?;
    let year = match pos.get(1) {
        Some(y) => y
            .parse::<i32>()
            .ok()
            .filter(|y| (1900..=9999).contains(y))
            .ok_or_else(|| anyhow::anyhow!("Invalid year: {y}"))?,
        None => Local::now().year(),
    };
    let xlsx = flag(args, "--xlsx").map(shellexpand);

    match kind {
        LedgerKind::Income => {
            let status =
                report::load_monthly_status::<IncomeItem>(db, year, &settings.exclusions.income)?;
            print_monthly(&status);
            if let Some(path) = xlsx {
                write_workbook(Path::new(&path), &export::export_monthly(&status)?)?;
            }
        }
        LedgerKind::Expense => {
            let status =
                report::load_monthly_status::<ExpenseItem>(db, year, &settings.exclusions.expense)?;
            print_monthly(&status);
            if let Some(path) = xlsx {
                write_workbook(Path::new(&path), &export::export_monthly(&status)?)?;
            }
        }
    }
    Ok(())
}

fn cli_export_day(args: &[String], db: &mut Database, settings: &Settings) -> Result<()> {
    let pos = positional(args);
    let Some(date) = pos.first().copied() else {
        anyhow::bail!("Usage: churchledger export-day <YYYY-MM-DD> [path]");
    };
    let date = date_arg(Some(date))?;
    let day = db.fetch_day(date)?;
    let bytes = export::export_day(&settings.organization, &day)?;
    let path = output_path(
        pos.get(1).copied(),
        &settings.export_dir,
        export::day_file_name(date),
    );
    write_workbook(&path, &bytes)
}

fn cli_export_all(args: &[String], db: &mut Database, settings: &Settings) -> Result<()> {
    let (income, expense) = db.fetch_all()?;
    let bytes = export::export_all(&settings.organization, &income, &expense)?;
    let path = output_path(
        positional(args).first().copied(),
        &settings.export_dir,
        export::all_file_name(),
    );
    write_workbook(&path, &bytes)?;
    println!("{} income, {} expense rows", income.len(), expense.len());
    Ok(())
}

fn write_workbook(path: &Path, bytes: &[u8]) -> Result<()> {
    let path = export::write_file(path, bytes)
        .with_context(|| format!("Failed to export to {}", path.display()))?;
    println!("Exported to {}", path.display());
    Ok(())
}

// ── Printing ─────────────────────────────────────────────────

fn print_day(day: &DayLedger) {
    println!(
        "{} (revision {})",
        day.date.format("%Y-%m-%d (%a)"),
        day.revision
    );
    print_entries(&day.income);
    print_entries(&day.expense);
    println!("{}", "─".repeat(48));
    let income = total(&day.income);
    let expense = total(&day.expense);
    println!("  수입 합계   {:>16}", format_won(income));
    println!("  지출 합계   {:>16}", format_won(expense));
    println!("  차액        {:>16}", format_won(income - expense));
}

fn print_entries<C: Item>(entries: &[LedgerEntry<C>]) {
    println!();
    println!("[{}] {} rows", C::KIND, entries.len());
    for entry in entries {
        println!(
            "  {:<4} {:<14} {:>14}  {} {}",
            entry.method.map_or("", |m| m.as_str()),
            entry.category_label(),
            entry.amount.map_or_else(|| "-".to_string(), format_won),
            entry.description,
            entry.note,
        );
    }
}

fn print_summary<C: Item>(summary: &ReportSummary<C>) {
    println!();
    println!("[{}]", C::KIND);
    for row in &summary.rows {
        println!(
            "  {:<24} {:>16} {:>7}",
            row.label,
            format_won(row.sum),
            format_percent(row.percent)
        );
    }
}

fn print_monthly<C: Item>(status: &report::MonthlyStatus<C>) {
    println!("{} {}", status.title(), status.year);
    println!("{}", "─".repeat(48));
    for row in &status.rows {
        println!(
            "  {:<24} {:>16} {:>7}",
            row.label,
            format_won(row.total),
            format_percent(Some(row.percent))
        );
        for (i, amount) in row.months.iter().enumerate().filter(|(_, a)| !a.is_zero()) {
            println!("      {:>2}월 {:>16}", i + 1, format_won(*amount));
        }
    }
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
