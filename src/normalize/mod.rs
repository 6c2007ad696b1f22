use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use crate::models::{Item, LedgerEntry, Method};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// A grid cell as it arrives from the editor, a CSV file or a legacy table row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Empty,
    Text(String),
    Number(Decimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Trimmed textual form, `None` when there is nothing to read.
    fn text(&self) -> Option<String> {
        let s = match self {
            Self::Empty => return None,
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.normalize().to_string(),
            Self::Date(d) => d.to_string(),
            Self::DateTime(dt) => dt.to_string(),
        };
        (!s.is_empty()).then_some(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        if s.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }
}

impl From<Decimal> for Cell {
    fn from(n: Decimal) -> Self {
        Self::Number(n)
    }
}

impl From<NaiveDate> for Cell {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

static EMPTY: Cell = Cell::Empty;

/// One untyped row keyed by column label.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RawRow {
    pub(crate) id: Option<i64>,
    cells: HashMap<String, Cell>,
}

impl RawRow {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, column: &str, cell: impl Into<Cell>) -> Self {
        self.set(column, cell);
        self
    }

    pub(crate) fn set(&mut self, column: &str, cell: impl Into<Cell>) {
        self.cells.insert(column.to_string(), cell.into());
    }

    /// Missing columns read as `Cell::Empty`.
    pub(crate) fn get(&self, column: &str) -> &Cell {
        self.cells.get(column).unwrap_or(&EMPTY)
    }
}

/// Coerce raw rows into typed entries and drop the ones that carry nothing.
/// Input order is kept.
pub(crate) fn normalize<C: Item>(rows: &[RawRow]) -> Vec<LedgerEntry<C>> {
    rows.iter()
        .map(normalize_row::<C>)
        .filter(LedgerEntry::is_live)
        .collect()
}

fn normalize_row<C: Item>(row: &RawRow) -> LedgerEntry<C> {
    let spec = C::KIND.columns();
    let category_text = row.get(spec.category).text().unwrap_or_default();
    let category = C::parse(&category_text);
    LedgerEntry {
        id: row.id,
        date: coerce_date(row.get(spec.date)),
        method: row
            .get(spec.method)
            .text()
            .and_then(|s| Method::parse(&s)),
        category,
        unlisted_category: if category.is_some() {
            String::new()
        } else {
            category_text
        },
        description: row.get(spec.description).text().unwrap_or_default(),
        amount: coerce_amount(row.get(spec.amount)),
        note: row.get(spec.note).text().unwrap_or_default(),
    }
}

pub(crate) fn coerce_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Text(s) => parse_date(s),
        Cell::Empty | Cell::Number(_) => None,
    }
}

pub(crate) fn coerce_amount(cell: &Cell) -> Option<Decimal> {
    match cell {
        Cell::Number(n) => non_negative(*n),
        Cell::Text(s) => parse_amount(s),
        Cell::Empty | Cell::Date(_) | Cell::DateTime(_) => None,
    }
}

/// Accepts the ISO form plus the slash, dot and compact variants people type,
/// and datetimes whose time part is discarded.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Strips grouping commas, the won sign and whitespace. Negative or
/// unparseable input yields `None`.
pub(crate) fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| *c != ',' && *c != '₩' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .ok()
        .and_then(non_negative)
}

fn non_negative(n: Decimal) -> Option<Decimal> {
    (n >= Decimal::ZERO).then(|| n.normalize())
}

impl<C: Item> LedgerEntry<C> {
    /// Grid form of the entry. Feeding it back through `normalize` yields the
    /// same entry.
    pub(crate) fn to_raw(&self) -> RawRow {
        let spec = C::KIND.columns();
        let mut row = RawRow::new()
            .with(spec.date, self.date.map_or(Cell::Empty, Cell::Date))
            .with(
                spec.method,
                self.method.map_or(Cell::Empty, |m| Cell::from(m.as_str())),
            )
            .with(
                spec.category,
                self.category_text().map_or(Cell::Empty, Cell::from),
            )
            .with(spec.description, self.description.as_str())
            .with(spec.amount, self.amount.map_or(Cell::Empty, Cell::Number))
            .with(spec.note, self.note.as_str());
        row.id = self.id;
        row
    }
}
