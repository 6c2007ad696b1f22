use anyhow::{anyhow, bail, Result};
use chrono::{Datelike, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Settings;
use crate::db::{Database, DayLedger};
use crate::error::StorageError;
use crate::export;
use crate::import::CsvImporter;
use crate::models::{ExpenseItem, IncomeItem, Item, LedgerEntry, LedgerKind, Method};
use crate::normalize::{self, RawRow};
use crate::report::{self, Granularity, MonthlyStatus, Period, PeriodReport};
use crate::ui::util::{clamp_cursor, format_won, scroll_to_bottom};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Ledger,
    Report,
    Monthly,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Ledger, Self::Report, Self::Monthly]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ledger => write!(f, "Ledger"),
            Self::Report => write!(f, "Report"),
            Self::Monthly => write!(f, "Monthly"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    DeleteRow { kind: LedgerKind, index: usize },
    SwitchDay { target: NaiveDate },
    Revert,
    Quit,
}

/// Editable column of a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Method,
    Category,
    Description,
    Amount,
    Note,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) settings: Settings,

    // Ledger (working copy of the selected day)
    pub(crate) ledger: DayLedger,
    pub(crate) dirty: bool,
    pub(crate) pane: LedgerKind,
    pub(crate) income_index: usize,
    pub(crate) income_scroll: usize,
    pub(crate) expense_index: usize,
    pub(crate) expense_scroll: usize,

    // Report
    pub(crate) period: Period,
    pub(crate) report: Option<PeriodReport>,
    pub(crate) report_scroll: usize,

    // Monthly
    pub(crate) monthly_year: i32,
    pub(crate) monthly_kind: LedgerKind,
    pub(crate) monthly_income: Option<MonthlyStatus<IncomeItem>>,
    pub(crate) monthly_expense: Option<MonthlyStatus<ExpenseItem>>,
    pub(crate) monthly_index: usize,
    pub(crate) monthly_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(settings: Settings, today: NaiveDate) -> Self {
        Self {
            running: true,
            screen: Screen::Ledger,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,
            settings,

            ledger: DayLedger {
                date: today,
                income: Vec::new(),
                expense: Vec::new(),
                revision: 0,
            },
            dirty: false,
            pane: LedgerKind::Income,
            income_index: 0,
            income_scroll: 0,
            expense_index: 0,
            expense_scroll: 0,

            period: Period::resolve(Granularity::Month, today),
            report: None,
            report_scroll: 0,

            monthly_year: today.year(),
            monthly_kind: LedgerKind::Income,
            monthly_income: None,
            monthly_expense: None,
            monthly_index: 0,
            monthly_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    // ── Loading ───────────────────────────────────────────────

    /// Reload the selected day from the store, dropping unsaved edits.
    pub(crate) fn refresh_ledger(&mut self, db: &Database) -> Result<()> {
        self.ledger = db.fetch_day(self.ledger.date)?;
        self.dirty = false;
        clamp_cursor(
            &mut self.income_index,
            &mut self.income_scroll,
            self.ledger.income.len(),
        );
        clamp_cursor(
            &mut self.expense_index,
            &mut self.expense_scroll,
            self.ledger.expense.len(),
        );
        Ok(())
    }

    pub(crate) fn refresh_report(&mut self, db: &Database) -> Result<()> {
        self.report = Some(report::load_period_report(
            db,
            self.period.clone(),
            &self.settings.exclusions,
        )?);
        self.report_scroll = 0;
        Ok(())
    }

    pub(crate) fn refresh_monthly(&mut self, db: &Database) -> Result<()> {
        let exclusions = &self.settings.exclusions;
        self.monthly_income = Some(report::load_monthly_status(
            db,
            self.monthly_year,
            &exclusions.income,
        )?);
        self.monthly_expense = Some(report::load_monthly_status(
            db,
            self.monthly_year,
            &exclusions.expense,
        )?);
        let len = self.monthly_len();
        clamp_cursor(&mut self.monthly_index, &mut self.monthly_scroll, len);
        Ok(())
    }

    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        self.refresh_ledger(db)?;
        self.refresh_report(db)?;
        self.refresh_monthly(db)?;
        Ok(())
    }

    /// The ledger keeps its working copy; the aggregate views are reloaded.
    pub(crate) fn switch_screen(&mut self, db: &Database, screen: Screen) -> Result<()> {
        self.screen = screen;
        match screen {
            Screen::Ledger => {}
            Screen::Report => self.refresh_report(db)?,
            Screen::Monthly => self.refresh_monthly(db)?,
        }
        self.set_status(format!("{screen}"));
        Ok(())
    }

    // ── Selection ─────────────────────────────────────────────

    /// Move the ledger to `date`, asking first when unsaved edits would be lost.
    pub(crate) fn request_date(&mut self, db: &Database, date: NaiveDate) -> Result<()> {
        if date == self.ledger.date {
            return Ok(());
        }
        if self.dirty {
            self.confirm(
                PendingAction::SwitchDay { target: date },
                format!("Discard unsaved changes to {}?", self.ledger.date),
            );
            return Ok(());
        }
        self.load_date(db, date)
    }

    /// Select `date` unconditionally. The report period and the monthly year follow it.
    pub(crate) fn load_date(&mut self, db: &Database, date: NaiveDate) -> Result<()> {
        self.ledger.date = date;
        self.refresh_ledger(db)?;
        self.period = Period::resolve(self.period.granularity, date);
        self.monthly_year = date.year();
        self.set_status(format!("Showing {}", date.format("%Y-%m-%d (%a)")));
        Ok(())
    }

    pub(crate) fn set_granularity(&mut self, db: &Database, granularity: Granularity) -> Result<()> {
        let anchor = if self.period.contains(self.ledger.date) {
            self.ledger.date
        } else {
            self.period.start
        };
        self.period = Period::resolve(granularity, anchor);
        self.refresh_report(db)?;
        self.set_status(format!("Report: {}", self.period.label));
        Ok(())
    }

    pub(crate) fn step_period(&mut self, db: &Database, forward: bool) -> Result<()> {
        self.period = if forward {
            self.period.next()
        } else {
            self.period.previous()
        };
        self.refresh_report(db)?;
        self.set_status(format!("Report: {}", self.period.label));
        Ok(())
    }

    pub(crate) fn set_year(&mut self, db: &Database, year: i32) -> Result<()> {
        if !(1900..=9999).contains(&year) {
            bail!("Year out of range: {year}");
        }
        self.monthly_year = year;
        self.refresh_monthly(db)
    }

    pub(crate) fn set_monthly_kind(&mut self, kind: LedgerKind) {
        if self.monthly_kind != kind {
            self.monthly_kind = kind;
            self.monthly_index = 0;
            self.monthly_scroll = 0;
        }
    }

    pub(crate) fn monthly_len(&self) -> usize {
        match self.monthly_kind {
            LedgerKind::Income => self.monthly_income.as_ref().map_or(0, |s| s.rows.len()),
            LedgerKind::Expense => self.monthly_expense.as_ref().map_or(0, |s| s.rows.len()),
        }
    }

    /// Rows of the longer of the two report tables.
    pub(crate) fn report_len(&self) -> usize {
        self.report
            .as_ref()
            .map_or(0, |r| r.income.rows.len().max(r.expense.rows.len()))
    }

    /// Scroll both report tables together, never past the last page.
    pub(crate) fn scroll_report(&mut self, delta: isize) {
        let max = self.report_len().saturating_sub(self.visible_rows);
        self.report_scroll = self.report_scroll.saturating_add_signed(delta).min(max);
    }

    /// Cursor, scroll offset and row count of the list on the current screen.
    /// The report has no cursor.
    pub(crate) fn cursor(&mut self) -> Option<(&mut usize, &mut usize, usize)> {
        match self.screen {
            Screen::Ledger => Some(match self.pane {
                LedgerKind::Income => (
                    &mut self.income_index,
                    &mut self.income_scroll,
                    self.ledger.income.len(),
                ),
                LedgerKind::Expense => (
                    &mut self.expense_index,
                    &mut self.expense_scroll,
                    self.ledger.expense.len(),
                ),
            }),
            Screen::Report => None,
            Screen::Monthly => {
                let len = self.monthly_len();
                Some((&mut self.monthly_index, &mut self.monthly_scroll, len))
            }
        }
    }

    // ── Editing ───────────────────────────────────────────────

    /// Append a row to the focused ledger from `<category> <amount> [method] [description]`.
    pub(crate) fn add_row(&mut self, args: &str) -> Result<()> {
        let date = self.ledger.date;
        let page = self.visible_rows;
        match self.pane {
            LedgerKind::Income => {
                self.ledger.income.push(parse_row(date, args)?);
                let len = self.ledger.income.len();
                scroll_to_bottom(&mut self.income_index, &mut self.income_scroll, len, page);
            }
            LedgerKind::Expense => {
                self.ledger.expense.push(parse_row(date, args)?);
                let len = self.ledger.expense.len();
                scroll_to_bottom(&mut self.expense_index, &mut self.expense_scroll, len, page);
            }
        }
        self.dirty = true;
        Ok(())
    }

    /// Change one field of the selected row. `-` or an empty value clears it.
    pub(crate) fn edit_selected(&mut self, field: Field, value: &str) -> Result<()> {
        match self.pane {
            LedgerKind::Income => edit_row(&mut self.ledger.income, self.income_index, field, value)?,
            LedgerKind::Expense => {
                edit_row(&mut self.ledger.expense, self.expense_index, field, value)?
            }
        }
        self.dirty = true;
        Ok(())
    }

    pub(crate) fn request_delete(&mut self) {
        let (index, label) = match self.pane {
            LedgerKind::Income => (
                self.income_index,
                self.ledger.income.get(self.income_index).map(describe),
            ),
            LedgerKind::Expense => (
                self.expense_index,
                self.ledger.expense.get(self.expense_index).map(describe),
            ),
        };
        let Some(label) = label else {
            self.set_status("No row selected");
            return;
        };
        self.confirm(
            PendingAction::DeleteRow {
                kind: self.pane,
                index,
            },
            format!("Delete {} row '{label}'?", self.pane),
        );
    }

    pub(crate) fn delete_row(&mut self, kind: LedgerKind, index: usize) {
        let removed = match kind {
            LedgerKind::Income => remove_at(&mut self.ledger.income, index),
            LedgerKind::Expense => remove_at(&mut self.ledger.expense, index),
        };
        if !removed {
            return;
        }
        clamp_cursor(
            &mut self.income_index,
            &mut self.income_scroll,
            self.ledger.income.len(),
        );
        clamp_cursor(
            &mut self.expense_index,
            &mut self.expense_scroll,
            self.ledger.expense.len(),
        );
        self.dirty = true;
        self.set_status("Row deleted (not yet saved)");
    }

    /// Append the rows of a CSV grid to the focused ledger.
    pub(crate) fn import_grid(&mut self, path: &Path) -> Result<usize> {
        let rows = CsvImporter::read(path, self.pane)?;
        let date = self.ledger.date;
        let added = match self.pane {
            LedgerKind::Income => append_rows(&mut self.ledger.income, &rows, date),
            LedgerKind::Expense => append_rows(&mut self.ledger.expense, &rows, date),
        };
        if added > 0 {
            self.dirty = true;
        }
        Ok(added)
    }

    // ── Saving ────────────────────────────────────────────────

    /// Write the working copy back. Storage failures land in the status bar.
    pub(crate) fn save(&mut self, db: &mut Database) -> Result<()> {
        let date = self.ledger.date;
        let income: Vec<RawRow> = self.ledger.income.iter().map(LedgerEntry::to_raw).collect();
        let expense: Vec<RawRow> = self.ledger.expense.iter().map(LedgerEntry::to_raw).collect();

        match db.save_day_checked(date, self.ledger.revision, &income, &expense) {
            Ok(revision) => {
                self.refresh_ledger(db)?;
                let rows = self.ledger.income.len() + self.ledger.expense.len();
                self.set_status(format!("Saved {date}: {rows} rows (revision {revision})"));
            }
            Err(StorageError::Conflict { found, .. }) => {
                self.set_status(format!(
                    "Not saved: {date} was changed elsewhere (revision {found}). :revert reloads it"
                ));
            }
            Err(e) => {
                warn!(%date, error = %e, "save failed");
                self.set_status(format!("Save failed: {e}"));
            }
        }
        Ok(())
    }

    // ── Export ────────────────────────────────────────────────

    /// Export what the current screen shows. `target` overrides the default path.
    pub(crate) fn export_current(&mut self, target: Option<PathBuf>) {
        let result = match self.screen {
            Screen::Ledger => self.export_day(target),
            Screen::Report => self.export_report(target),
            Screen::Monthly => self.export_monthly(target),
        };
        self.report_export(result);
    }

    /// Export every stored row of both ledgers.
    pub(crate) fn export_all(&mut self, db: &Database, target: Option<PathBuf>) {
        let result = self.write_all(db, target);
        self.report_export(result);
    }

    fn write_all(&self, db: &Database, target: Option<PathBuf>) -> Result<PathBuf> {
        let (income, expense) = db.fetch_all()?;
        let bytes = export::export_all(&self.settings.organization, &income, &expense)?;
        let path = target.unwrap_or_else(|| self.export_path(export::all_file_name()));
        Ok(export::write_file(&path, &bytes)?)
    }

    fn export_day(&self, target: Option<PathBuf>) -> Result<PathBuf> {
        let bytes = export::export_day(&self.settings.organization, &self.ledger)?;
        let path =
            target.unwrap_or_else(|| self.export_path(export::day_file_name(self.ledger.date)));
        Ok(export::write_file(&path, &bytes)?)
    }

    fn export_report(&self, target: Option<PathBuf>) -> Result<PathBuf> {
        let report = self
            .report
            .as_ref()
            .ok_or_else(|| anyhow!("No report loaded"))?;
        let bytes = export::export_report(report)?;
        let path = target.unwrap_or_else(|| self.export_path(export::report_file_name(report)));
        Ok(export::write_file(&path, &bytes)?)
    }

    fn export_monthly(&self, target: Option<PathBuf>) -> Result<PathBuf> {
        let (bytes, name) = match self.monthly_kind {
            LedgerKind::Income => {
                let status = self
                    .monthly_income
                    .as_ref()
                    .ok_or_else(|| anyhow!("No monthly status loaded"))?;
                (export::export_monthly(status)?, export::monthly_file_name(status))
            }
            LedgerKind::Expense => {
                let status = self
                    .monthly_expense
                    .as_ref()
                    .ok_or_else(|| anyhow!("No monthly status loaded"))?;
                (export::export_monthly(status)?, export::monthly_file_name(status))
            }
        };
        let path = target.unwrap_or_else(|| self.export_path(name));
        Ok(export::write_file(&path, &bytes)?)
    }

    fn export_path(&self, file_name: String) -> PathBuf {
        self.settings.export_dir.join(file_name)
    }

    fn report_export(&mut self, result: Result<PathBuf>) {
        match result {
            Ok(path) => {
                info!(path = %path.display(), "exported from TUI");
                self.set_status(format!("Exported to {}", path.display()));
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                self.set_status(format!("Export failed: {e:#}"));
            }
        }
    }

    // ── Status ────────────────────────────────────────────────

    pub(crate) fn confirm(&mut self, action: PendingAction, message: String) {
        self.pending_action = Some(action);
        self.confirm_message = message;
        self.input_mode = InputMode::Confirm;
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

// ── Row helpers ───────────────────────────────────────────────

fn parse_row<C: Item>(date: NaiveDate, args: &str) -> Result<LedgerEntry<C>> {
    let mut words = args.split_whitespace();
    let (Some(category), Some(amount)) = (words.next(), words.next()) else {
        bail!("Usage: :add <category> <amount> [현금|은행] [description]");
    };

    let mut entry = LedgerEntry::new(date);
    entry.set_category(Some(parse_category(category)?));
    entry.amount = Some(parse_amount(amount)?);

    let rest: Vec<&str> = words.collect();
    let rest = match rest.first().and_then(|w| Method::parse(w)) {
        Some(method) => {
            entry.method = Some(method);
            &rest[1..]
        }
        None => &rest[..],
    };
    entry.description = rest.join(" ");
    Ok(entry)
}

fn edit_row<C: Item>(
    rows: &mut [LedgerEntry<C>],
    index: usize,
    field: Field,
    value: &str,
) -> Result<()> {
    let entry = rows
        .get_mut(index)
        .ok_or_else(|| anyhow!("No row selected"))?;
    let value = value.trim();
    let clear = value.is_empty() || value == "-";

    match field {
        Field::Method => {
            entry.method = if clear {
                None
            } else {
                Some(Method::parse(value).ok_or_else(|| {
                    let known: Vec<&str> = Method::all().iter().map(Method::as_str).collect();
                    anyhow!("Unknown method: {value} (use {})", known.join(" or "))
                })?)
            };
        }
        Field::Category => {
            entry.set_category(if clear { None } else { Some(parse_category(value)?) });
        }
        Field::Amount => {
            entry.amount = if clear { None } else { Some(parse_amount(value)?) };
        }
        Field::Description => {
            entry.description = if clear { String::new() } else { value.to_string() };
        }
        Field::Note => {
            entry.note = if clear { String::new() } else { value.to_string() };
        }
    }
    Ok(())
}

fn parse_category<C: Item>(s: &str) -> Result<C> {
    C::parse(s).ok_or_else(|| anyhow!("Unknown {} category: {s}. See :categories", C::KIND))
}

fn parse_amount(s: &str) -> Result<rust_decimal::Decimal> {
    normalize::parse_amount(s).ok_or_else(|| anyhow!("Invalid amount: {s}"))
}

fn append_rows<C: Item>(rows: &mut Vec<LedgerEntry<C>>, raw: &[RawRow], date: NaiveDate) -> usize {
    let entries = normalize::normalize::<C>(raw);
    let added = entries.len();
    rows.extend(entries.into_iter().map(|mut entry| {
        entry.id = None;
        entry.date = Some(date);
        entry
    }));
    added
}

fn remove_at<T>(rows: &mut Vec<T>, index: usize) -> bool {
    if index < rows.len() {
        rows.remove(index);
        true
    } else {
        false
    }
}

fn describe<C: Item>(entry: &LedgerEntry<C>) -> String {
    format!(
        "{} {}",
        entry.category_label(),
        format_won(entry.amount_or_zero())
    )
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
