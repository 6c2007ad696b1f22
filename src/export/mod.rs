use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::db::DayLedger;
use crate::error::ExportError;
use crate::models::{total, ExpenseEntry, IncomeEntry, Item, LedgerEntry};
use crate::report::{MonthlyStatus, PeriodReport, ReportSummary};

type Result<T> = std::result::Result<T, ExportError>;

/// Won accounting format: symbol left, grouped digits, dash for zero.
pub(crate) const WON_FORMAT: &str = r#"_-₩* #,##0_-;_-₩* -#,##0_-;_-₩* "-"_-;_-@_-"#;

const DATE_FORMAT: &str = "yyyy-mm-dd";
const HEADER_FILL: u32 = 0x1F4E79;
const HEADER_BORDER: u32 = 0xD9D9D9;
const MIN_WIDTH: usize = 10;
const MAX_WIDTH: usize = 28;
const MAX_SHEET_NAME: usize = 31;

const AMOUNT: &str = "금액";
const SUM: &str = "합계";
const PERCENT: &str = "비율(%)";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Empty,
    Text(String),
    Number(Decimal),
    Date(NaiveDate),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Self::Number(n)
    }
}

impl Value {
    fn display_len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Text(s) => s.chars().count(),
            Self::Number(n) => n.to_string().len(),
            Self::Date(_) => DATE_FORMAT.len(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Table {
    pub(crate) headers: Vec<String>,
    pub(crate) rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Sheet {
    pub(crate) name: String,
    /// Written two rows above the header when present.
    pub(crate) title: Option<String>,
    pub(crate) table: Table,
}

impl Sheet {
    pub(crate) fn new(name: &str, table: Table) -> Self {
        Self {
            name: name.to_string(),
            title: None,
            table,
        }
    }

    pub(crate) fn titled(name: &str, title: String, table: Table) -> Self {
        Self {
            name: name.to_string(),
            title: Some(title),
            table,
        }
    }
}

// ── Workbook ──────────────────────────────────────────────────

/// Render `sheets` into an xlsx workbook. Numeric cells in a column named in
/// `money_columns` get the won format.
pub(crate) fn export_tables(sheets: &[Sheet], money_columns: &[&str]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(HEADER_BORDER));
    let title_format = Format::new().set_bold().set_font_size(16);
    let money_format = Format::new()
        .set_num_format(WON_FORMAT)
        .set_align(FormatAlign::Right);
    let date_format = Format::new().set_num_format(DATE_FORMAT);

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(&sheet.name))?;

        let header_row: u32 = match &sheet.title {
            Some(title) => {
                worksheet.write_string_with_format(0, 0, title.as_str(), &title_format)?;
                2
            }
            None => 0,
        };

        for (col, header) in sheet.table.headers.iter().enumerate() {
            worksheet.write_string_with_format(header_row, col as u16, header.as_str(), &header_format)?;
        }

        let money: Vec<bool> = sheet
            .table
            .headers
            .iter()
            .map(|h| money_columns.contains(&h.as_str()))
            .collect();

        for (i, cells) in sheet.table.rows.iter().enumerate() {
            let row = header_row + 1 + i as u32;
            for (col, value) in cells.iter().enumerate() {
                let number_format = money
                    .get(col)
                    .copied()
                    .unwrap_or(false)
                    .then_some(&money_format);
                write_value(worksheet, row, col as u16, value, number_format, &date_format)?;
            }
        }

        worksheet.set_freeze_panes(header_row + 1, 0)?;
        for (col, width) in column_widths(&sheet.table).into_iter().enumerate() {
            worksheet.set_column_width(col as u16, width as f64)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_value(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
    number_format: Option<&Format>,
    date_format: &Format,
) -> Result<()> {
    match value {
        Value::Empty => {}
        Value::Text(s) => {
            worksheet.write_string(row, col, s.as_str())?;
        }
        Value::Number(n) => {
            let number = n.to_f64().unwrap_or_default();
            match number_format {
                Some(format) => worksheet.write_number_with_format(row, col, number, format)?,
                None => worksheet.write_number(row, col, number)?,
            };
        }
        Value::Date(d) => {
            let date = ExcelDateTime::from_ymd(d.year() as u16, d.month() as u8, d.day() as u8)?;
            worksheet.write_datetime_with_format(row, col, &date, date_format)?;
        }
    }
    Ok(())
}

/// Content length + 2, kept within [10, 28].
fn column_widths(table: &Table) -> Vec<usize> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let longest = table
                .rows
                .iter()
                .filter_map(|r| r.get(col))
                .map(Value::display_len)
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            (longest + 2).clamp(MIN_WIDTH, MAX_WIDTH)
        })
        .collect()
}

/// Excel rejects `[]:*?/\` in sheet names and anything past 31 characters.
fn sheet_name(name: &str) -> String {
    name.chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .take(MAX_SHEET_NAME)
        .collect()
}

// ── Tables ────────────────────────────────────────────────────

pub(crate) fn ledger_table<C: Item>(entries: &[LedgerEntry<C>]) -> Table {
    Table {
        headers: C::KIND
            .columns()
            .labels()
            .iter()
            .map(|l| l.to_string())
            .collect(),
        rows: entries
            .iter()
            .map(|e| {
                vec![
                    e.date.map_or(Value::Empty, Value::Date),
                    e.method.map_or(Value::Empty, |m| m.as_str().into()),
                    e.category_text().map_or(Value::Empty, Value::from),
                    text_or_empty(&e.description),
                    e.amount.map_or(Value::Empty, Value::Number),
                    text_or_empty(&e.note),
                ]
            })
            .collect(),
    }
}

pub(crate) fn summary_table<C: Item>(summary: &ReportSummary<C>) -> Table {
    Table {
        headers: vec![
            C::KIND.columns().category.to_string(),
            SUM.to_string(),
            PERCENT.to_string(),
        ],
        rows: summary
            .rows
            .iter()
            .map(|r| {
                vec![
                    r.label.as_str().into(),
                    r.sum.into(),
                    r.percent.map_or(Value::Empty, Value::Number),
                ]
            })
            .collect(),
    }
}

pub(crate) fn monthly_table<C: Item>(status: &MonthlyStatus<C>) -> Table {
    let mut headers = vec!["구분".to_string()];
    headers.extend((1..=12).map(|m| format!("{m}월")));
    headers.push(SUM.to_string());
    headers.push(PERCENT.to_string());

    Table {
        headers,
        rows: status
            .rows
            .iter()
            .map(|r| {
                let mut cells: Vec<Value> = vec![r.label.as_str().into()];
                cells.extend(r.months.iter().map(|m| Value::Number(*m)));
                cells.push(Value::Number(r.total));
                cells.push(Value::Number(r.percent));
                cells
            })
            .collect(),
    }
}

fn text_or_empty(s: &str) -> Value {
    if s.is_empty() {
        Value::Empty
    } else {
        Value::Text(s.to_string())
    }
}

// ── Workbooks ─────────────────────────────────────────────────

/// 수입, 지출 and 요약 sheets for one day.
pub(crate) fn export_day(organization: &str, day: &DayLedger) -> Result<Vec<u8>> {
    let date = day.date;
    let income_total = total(&day.income);
    let expense_total = total(&day.expense);
    let summary = Table {
        headers: vec!["구분".to_string(), AMOUNT.to_string()],
        rows: vec![
            vec!["수입 합계".into(), income_total.into()],
            vec!["지출 합계".into(), expense_total.into()],
            vec!["차액(수입-지출)".into(), (income_total - expense_total).into()],
        ],
    };
    export_tables(
        &[
            Sheet::titled(
                "수입",
                format!("{date} 수입 장부 ({organization})"),
                ledger_table(&day.income),
            ),
            Sheet::titled(
                "지출",
                format!("{date} 지출 장부 ({organization})"),
                ledger_table(&day.expense),
            ),
            Sheet::titled("요약", format!("{date} 재정 요약 ({organization})"), summary),
        ],
        &[AMOUNT],
    )
}

/// Every stored row, one sheet per ledger.
pub(crate) fn export_all(
    organization: &str,
    income: &[IncomeEntry],
    expense: &[ExpenseEntry],
) -> Result<Vec<u8>> {
    export_tables(
        &[
            Sheet::titled(
                "수입전체",
                format!("수입 전체 데이터 ({organization})"),
                ledger_table(income),
            ),
            Sheet::titled(
                "지출전체",
                format!("지출 전체 데이터 ({organization})"),
                ledger_table(expense),
            ),
        ],
        &[AMOUNT],
    )
}

pub(crate) fn export_report(report: &PeriodReport) -> Result<Vec<u8>> {
    export_tables(
        &[
            Sheet::new("수입", summary_table(&report.income)),
            Sheet::new("지출", summary_table(&report.expense)),
        ],
        &[SUM],
    )
}

pub(crate) fn export_monthly<C: Item>(status: &MonthlyStatus<C>) -> Result<Vec<u8>> {
    let months: Vec<String> = (1..=12).map(|m| format!("{m}월")).collect();
    let mut money: Vec<&str> = months.iter().map(String::as_str).collect();
    money.push(SUM);
    export_tables(&[Sheet::new(&status.title(), monthly_table(status))], &money)
}

// ── Files ─────────────────────────────────────────────────────

/// `<prefix>.xlsx` with path separators made harmless.
pub(crate) fn file_name(prefix: &str) -> String {
    let safe: String = prefix
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{safe}.xlsx")
}

pub(crate) fn day_file_name(date: NaiveDate) -> String {
    file_name(&format!("교회재정_일별장부_{date}"))
}

pub(crate) fn all_file_name() -> String {
    file_name("교회재정_전체")
}

pub(crate) fn report_file_name(report: &PeriodReport) -> String {
    file_name(&format!("재정보고_{}", report.period.label))
}

pub(crate) fn monthly_file_name<C: Item>(status: &MonthlyStatus<C>) -> String {
    file_name(&format!("{}_{}", status.title(), status.year))
}

/// Write `bytes` to `path`, creating parent directories as needed.
pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "workbook written");
    Ok(path.to_path_buf())
}
