use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::models::{ColumnSpec, LedgerKind};
use crate::normalize::RawRow;

pub(crate) struct CsvImporter;

impl CsvImporter {
    /// Read a ledger grid from a CSV file whose first row names the columns.
    pub(crate) fn read(path: &Path, kind: LedgerKind) -> Result<Vec<RawRow>> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
        Self::from_reader(file, kind)
            .with_context(|| format!("Failed to import {}", path.display()))
    }

    /// Columns are matched by label; unknown columns are skipped. Cells stay
    /// untyped until the rows are normalized.
    pub(crate) fn from_reader<R: Read>(reader: R, kind: LedgerKind) -> Result<Vec<RawRow>> {
        let spec = kind.columns();
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers = rdr.headers().context("Failed to read CSV header")?.clone();
        let columns: Vec<Option<&'static str>> =
            headers.iter().map(|h| resolve_column(h, spec)).collect();

        if columns.iter().all(Option::is_none) {
            anyhow::bail!(
                "No recognizable columns; expected some of: {}",
                spec.labels().join(", ")
            );
        }
        for (header, column) in headers.iter().zip(&columns) {
            if column.is_none() {
                debug!(header, "unrecognized CSV column skipped");
            }
        }

        let mut rows = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("Row {}: malformed record", i + 2))?;
            let mut row = RawRow::new();
            for (field, column) in record.iter().zip(&columns) {
                if let Some(column) = column {
                    row.set(column, field);
                }
            }
            rows.push(row);
        }
        debug!(ledger = kind.table(), rows = rows.len(), "CSV grid read");
        Ok(rows)
    }
}

/// Map a header to its column label. Korean labels match exactly; a few
/// English names are accepted too.
fn resolve_column(header: &str, spec: &ColumnSpec) -> Option<&'static str> {
    let header = header.trim_start_matches('\u{feff}').trim();
    if let Some(label) = spec.labels().into_iter().find(|l| *l == header) {
        return Some(label);
    }
    match header.to_lowercase().as_str() {
        "date" => Some(spec.date),
        "method" | "usage" => Some(spec.method),
        "category" | "item" => Some(spec.category),
        "description" | "detail" => Some(spec.description),
        "amount" | "금액(원)" => Some(spec.amount),
        "note" | "notes" | "memo" => Some(spec.note),
        _ => None,
    }
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
