mod schema;

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, ToSql, TransactionBehavior};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::models::{ExpenseEntry, ExpenseItem, IncomeEntry, IncomeItem, Item, LedgerEntry};
use crate::normalize::{self, Cell, RawRow};

type Result<T> = std::result::Result<T, StorageError>;

/// Both books for one calendar day, plus the revision stamp of the last save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DayLedger {
    pub(crate) date: NaiveDate,
    pub(crate) income: Vec<IncomeEntry>,
    pub(crate) expense: Vec<ExpenseEntry>,
    /// 0 when the day has never been saved.
    pub(crate) revision: i64,
}

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let mut db = Self { conn };
        db.migrate()?;
        info!(path = %path.display(), "ledger database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        self.conn.execute_batch(schema::SCHEMA_V1)?;

        let current: Option<i32> = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(current) = current else {
            // Fresh database
            for &(_, sql) in schema::MIGRATIONS {
                self.conn.execute_batch(sql)?;
            }
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        };

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            info!(from = current, to = schema::CURRENT_VERSION, "schema migrated");
        }

        Ok(())
    }

    // ── Reads ─────────────────────────────────────────────────

    pub(crate) fn fetch_day(&self, date: NaiveDate) -> Result<DayLedger> {
        let day = date.to_string();
        Ok(DayLedger {
            date,
            income: self.select_entries("date = ?1", &[&day])?,
            expense: self.select_entries("date = ?1", &[&day])?,
            revision: day_revision(&self.conn, &day)?,
        })
    }

    /// Inclusive range, ordered by date then insertion.
    pub(crate) fn fetch_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(Vec<IncomeEntry>, Vec<ExpenseEntry>)> {
        Ok((self.fetch_entries(start, end)?, self.fetch_entries(start, end)?))
    }

    /// One ledger over an inclusive range.
    pub(crate) fn fetch_entries<C: Item>(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LedgerEntry<C>>> {
        let (start, end) = (start.to_string(), end.to_string());
        self.select_entries("date >= ?1 AND date <= ?2", &[&start, &end])
    }

    pub(crate) fn fetch_all(&self) -> Result<(Vec<IncomeEntry>, Vec<ExpenseEntry>)> {
        Ok((
            self.select_entries("1 = 1", &[])?,
            self.select_entries("1 = 1", &[])?,
        ))
    }

    #[cfg(test)]
    pub(crate) fn day_revision(&self, date: NaiveDate) -> Result<i64> {
        day_revision(&self.conn, &date.to_string())
    }

    fn select_entries<C: Item>(
        &self,
        filter: &str,
        args: &[&dyn ToSql],
    ) -> Result<Vec<LedgerEntry<C>>> {
        let sql = format!(
            "SELECT id, date, method, category, description, amount, note
             FROM {} WHERE {filter} ORDER BY date, id",
            C::KIND.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(args, row_to_raw::<C>)?;
        let raw = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(table = C::KIND.table(), filter, rows = raw.len(), "entries loaded");
        // Stored rows go through the same coercion as edited ones, which
        // repairs legacy REAL amounts and keeps free-text categories as unlisted.
        Ok(normalize::normalize(&raw))
    }

    // ── Writes ────────────────────────────────────────────────

    /// Replace everything stored for `date` with the given rows. Last writer wins.
    pub(crate) fn save_day(
        &mut self,
        date: NaiveDate,
        income: &[RawRow],
        expense: &[RawRow],
    ) -> Result<i64> {
        self.write_day(date, None, income, expense)
    }

    /// Like `save_day`, but refuses with `StorageError::Conflict` when the day
    /// was saved since `expected_revision` was read.
    pub(crate) fn save_day_checked(
        &mut self,
        date: NaiveDate,
        expected_revision: i64,
        income: &[RawRow],
        expense: &[RawRow],
    ) -> Result<i64> {
        self.write_day(date, Some(expected_revision), income, expense)
    }

    fn write_day(
        &mut self,
        date: NaiveDate,
        expected_revision: Option<i64>,
        income: &[RawRow],
        expense: &[RawRow],
    ) -> Result<i64> {
        let income = pin_to_day(normalize::normalize::<IncomeItem>(income), date);
        let expense = pin_to_day(normalize::normalize::<ExpenseItem>(expense), date);
        let day = date.to_string();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(expected) = expected_revision {
            let found = day_revision(&tx, &day)?;
            if found != expected {
                warn!(%date, expected, found, "save refused, day changed since it was loaded");
                return Err(StorageError::Conflict {
                    date,
                    expected,
                    found,
                });
            }
        }

        replace_entries(&tx, &day, &income)?;
        replace_entries(&tx, &day, &expense)?;
        tx.execute(
            "INSERT INTO day_revisions (date, revision) VALUES (?1, 1)
             ON CONFLICT(date) DO UPDATE SET revision = revision + 1",
            params![day],
        )?;
        let revision = day_revision(&tx, &day)?;
        tx.commit()?;

        info!(
            %date,
            income = income.len(),
            expense = expense.len(),
            revision,
            "day saved"
        );
        Ok(revision)
    }
}

fn day_revision(conn: &Connection, day: &str) -> Result<i64> {
    let revision = conn
        .query_row(
            "SELECT revision FROM day_revisions WHERE date = ?1",
            params![day],
            |row| row.get(0),
        )
        .optional()?;
    Ok(revision.unwrap_or(0))
}

/// Rows always belong to the day being saved; a differing date is overwritten.
fn pin_to_day<C: Item>(entries: Vec<LedgerEntry<C>>, date: NaiveDate) -> Vec<LedgerEntry<C>> {
    entries
        .into_iter()
        .map(|mut e| {
            if let Some(other) = e.date.filter(|d| *d != date) {
                warn!(%date, row_date = %other, ledger = C::KIND.table(), "row re-dated to the saved day");
            }
            e.id = None;
            e.date = Some(date);
            e
        })
        .collect()
}

fn replace_entries<C: Item>(conn: &Connection, day: &str, entries: &[LedgerEntry<C>]) -> Result<()> {
    let table = C::KIND.table();
    conn.execute(&format!("DELETE FROM {table} WHERE date = ?1"), params![day])?;

    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {table} (date, method, category, description, amount, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
    ))?;
    for e in entries {
        stmt.execute(params![
            day,
            e.method.map(|m| m.as_str()),
            e.category_text(),
            non_empty(&e.description),
            e.amount.map(|a| a.to_string()),
            non_empty(&e.note),
        ])?;
    }
    Ok(())
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

fn row_to_raw<C: Item>(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    let spec = C::KIND.columns();
    let mut raw = RawRow::new()
        .with(spec.date, value_to_cell(row.get(1)?))
        .with(spec.method, value_to_cell(row.get(2)?))
        .with(spec.category, value_to_cell(row.get(3)?))
        .with(spec.description, value_to_cell(row.get(4)?))
        .with(spec.amount, value_to_cell(row.get(5)?))
        .with(spec.note, value_to_cell(row.get(6)?));
    raw.id = Some(row.get(0)?);
    Ok(raw)
}

fn value_to_cell(value: Value) -> Cell {
    match value {
        Value::Null | Value::Blob(_) => Cell::Empty,
        Value::Integer(i) => Cell::Number(Decimal::from(i)),
        Value::Real(f) => Decimal::from_f64(f).map_or(Cell::Empty, Cell::Number),
        Value::Text(s) => Cell::from(s),
    }
}
