#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;
use std::io::Write;
use std::time::Duration;

use super::*;
use crate::report::NetExclusions;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn settings(export_dir: PathBuf) -> Settings {
    Settings {
        organization: "평안한교회".into(),
        database: PathBuf::from(":memory:"),
        export_dir,
        busy_timeout: Duration::from_secs(1),
        exclusions: NetExclusions::default(),
    }
}

fn setup(export_dir: PathBuf) -> (App, Database) {
    let db = Database::open_in_memory().unwrap();
    let mut app = App::new(settings(export_dir), ymd(2024, 6, 2));
    app.refresh_all(&db).unwrap();
    (app, db)
}

// ── Editing ───────────────────────────────────────────────────

#[test]
fn test_add_row_parses_fields() {
    let (mut app, _db) = setup(PathBuf::from("."));
    app.add_row("십일조 100,000 현금 김 성도").unwrap();

    let entry = &app.ledger.income[0];
    assert_eq!(entry.category, Some(IncomeItem::Tithe));
    assert_eq!(entry.amount, Some(dec!(100000)));
    assert_eq!(entry.method, Some(Method::Cash));
    assert_eq!(entry.description, "김 성도");
    assert_eq!(entry.date, Some(ymd(2024, 6, 2)));
    assert!(app.dirty);
}

#[test]
fn test_add_row_without_method() {
    let (mut app, _db) = setup(PathBuf::from("."));
    app.pane = LedgerKind::Expense;
    app.add_row("전기요금 42500 6월분").unwrap();

    let entry = &app.ledger.expense[0];
    assert_eq!(entry.category, Some(ExpenseItem::Electricity));
    assert_eq!(entry.method, None);
    assert_eq!(entry.description, "6월분");
    assert!(app.ledger.income.is_empty());
}

#[test]
fn test_add_row_rejects_bad_input() {
    let (mut app, _db) = setup(PathBuf::from("."));
    assert!(app.add_row("").is_err());
    assert!(app.add_row("십일조").is_err());
    assert!(app.add_row("전기요금 1000").is_err());
    assert!(app.add_row("십일조 -5").is_err());
    assert!(app.ledger.income.is_empty());
    assert!(!app.dirty);
}

#[test]
fn test_edit_selected_sets_and_clears() {
    let (mut app, _db) = setup(PathBuf::from("."));
    app.add_row("감사헌금 30000").unwrap();

    app.edit_selected(Field::Amount, "35,000").unwrap();
    app.edit_selected(Field::Method, "은행").unwrap();
    app.edit_selected(Field::Note, "생일").unwrap();
    let entry = &app.ledger.income[0];
    assert_eq!(entry.amount, Some(dec!(35000)));
    assert_eq!(entry.method, Some(Method::Bank));
    assert_eq!(entry.note, "생일");

    app.edit_selected(Field::Category, "-").unwrap();
    app.edit_selected(Field::Amount, "").unwrap();
    let entry = &app.ledger.income[0];
    assert_eq!(entry.category, None);
    assert_eq!(entry.amount, None);

    assert!(app.edit_selected(Field::Method, "카드").is_err());
}

#[test]
fn test_edit_without_rows_fails() {
    let (mut app, _db) = setup(PathBuf::from("."));
    assert!(app.edit_selected(Field::Description, "x").is_err());
}

#[test]
fn test_delete_asks_then_removes() {
    let (mut app, _db) = setup(PathBuf::from("."));
    app.add_row("십일조 1000").unwrap();
    app.add_row("기타 2000").unwrap();

    app.request_delete();
    assert_eq!(app.input_mode, InputMode::Confirm);
    assert_eq!(
        app.pending_action,
        Some(PendingAction::DeleteRow {
            kind: LedgerKind::Income,
            index: 1
        })
    );

    app.delete_row(LedgerKind::Income, 1);
    assert_eq!(app.ledger.income.len(), 1);
    assert_eq!(app.income_index, 0);

    // Out of range is ignored.
    app.delete_row(LedgerKind::Expense, 3);
    assert_eq!(app.ledger.income.len(), 1);
}

#[test]
fn test_delete_with_empty_pane() {
    let (mut app, _db) = setup(PathBuf::from("."));
    app.request_delete();
    assert_eq!(app.pending_action, None);
    assert_eq!(app.status_message, "No row selected");
}

// ── Saving ────────────────────────────────────────────────────

#[test]
fn test_save_persists_and_reloads() {
    let (mut app, mut db) = setup(PathBuf::from("."));
    app.add_row("십일조 100000 현금").unwrap();
    app.pane = LedgerKind::Expense;
    app.add_row("전기요금 42500").unwrap();
    app.save(&mut db).unwrap();

    assert!(!app.dirty);
    assert_eq!(app.ledger.revision, 1);
    assert!(app.status_message.starts_with("Saved 2024-06-02"));

    let day = db.fetch_day(ymd(2024, 6, 2)).unwrap();
    assert_eq!(day.income.len(), 1);
    assert_eq!(day.expense.len(), 1);
    assert!(day.income[0].id.is_some());
}

#[test]
fn test_save_conflict_keeps_edits() {
    let (mut app, mut db) = setup(PathBuf::from("."));
    app.add_row("십일조 1000").unwrap();

    // Someone else saves the same day first.
    db.save_day(ymd(2024, 6, 2), &[], &[]).unwrap();

    app.save(&mut db).unwrap();
    assert!(app.status_message.starts_with("Not saved"));
    assert!(app.dirty);
    assert_eq!(app.ledger.income.len(), 1);
    assert!(db.fetch_day(ymd(2024, 6, 2)).unwrap().income.is_empty());
}

#[test]
fn test_save_drops_blank_rows() {
    let (mut app, mut db) = setup(PathBuf::from("."));
    app.add_row("십일조 1000").unwrap();
    app.edit_selected(Field::Category, "-").unwrap();
    app.edit_selected(Field::Amount, "-").unwrap();
    app.save(&mut db).unwrap();
    assert!(app.ledger.income.is_empty());
}

// ── Selection ─────────────────────────────────────────────────

#[test]
fn test_request_date_confirms_when_dirty() {
    let (mut app, db) = setup(PathBuf::from("."));
    app.add_row("십일조 1000").unwrap();

    app.request_date(&db, ymd(2024, 6, 3)).unwrap();
    assert_eq!(app.ledger.date, ymd(2024, 6, 2));
    assert_eq!(
        app.pending_action,
        Some(PendingAction::SwitchDay {
            target: ymd(2024, 6, 3)
        })
    );

    app.load_date(&db, ymd(2024, 6, 3)).unwrap();
    assert_eq!(app.ledger.date, ymd(2024, 6, 3));
    assert!(app.ledger.income.is_empty());
    assert!(!app.dirty);
}

#[test]
fn test_date_drives_period_and_year() {
    let (mut app, db) = setup(PathBuf::from("."));
    app.request_date(&db, ymd(2023, 12, 31)).unwrap();
    assert_eq!(app.period.label, "2023년 12월(월)");
    assert_eq!(app.monthly_year, 2023);
}

#[test]
fn test_granularity_and_stepping() {
    let (mut app, mut db) = setup(PathBuf::from("."));
    db.save_day(
        ymd(2024, 5, 5),
        &[LedgerEntry::<IncomeItem> {
            category: Some(IncomeItem::Tithe),
            amount: Some(dec!(7000)),
            ..LedgerEntry::new(ymd(2024, 5, 5))
        }
        .to_raw()],
        &[],
    )
    .unwrap();

    app.set_granularity(&db, Granularity::Quarter).unwrap();
    assert_eq!(app.period.label, "2024년 2/4분기(분기)");
    assert_eq!(app.report.as_ref().unwrap().income_total, dec!(7000));

    app.set_granularity(&db, Granularity::Month).unwrap();
    app.step_period(&db, false).unwrap();
    assert_eq!(app.period.label, "2024년 5월(월)");
    assert_eq!(app.report.as_ref().unwrap().income_total, dec!(7000));

    // Anchored on the stepped period, not the selected day.
    app.set_granularity(&db, Granularity::Year).unwrap();
    assert_eq!(app.period.label, "2024년(년)");
}

#[test]
fn test_monthly_year_and_kind() {
    let (mut app, db) = setup(PathBuf::from("."));
    app.set_year(&db, 2022).unwrap();
    assert_eq!(app.monthly_income.as_ref().unwrap().year, 2022);
    assert!(app.set_year(&db, 0).is_err());

    app.screen = Screen::Monthly;
    app.set_monthly_kind(LedgerKind::Expense);
    let (_, _, len) = app.cursor().unwrap();
    assert_eq!(len, ExpenseItem::all().len() + 2);

    app.screen = Screen::Report;
    assert!(app.cursor().is_none());
}

#[test]
fn test_report_scroll_bounded() {
    let (mut app, _db) = setup(PathBuf::from("."));
    app.visible_rows = 10;
    app.scroll_report(-3);
    assert_eq!(app.report_scroll, 0);
    app.scroll_report(100);
    // 20 expense categories plus the two total rows.
    assert_eq!(app.report_scroll, 22 - 10);
}

// ── Import & export ───────────────────────────────────────────

#[test]
fn test_import_grid_appends_to_focused_pane() {
    let (mut app, _db) = setup(PathBuf::from("."));
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all("날짜,지출항목,금액\n2024-01-01,상하수도요금,\"12,000\"\n,,\n".as_bytes())
        .unwrap();

    app.pane = LedgerKind::Expense;
    let added = app.import_grid(file.path()).unwrap();
    assert_eq!(added, 1);
    let entry = &app.ledger.expense[0];
    assert_eq!(entry.amount, Some(dec!(12000)));
    assert_eq!(entry.date, Some(ymd(2024, 6, 2)));
    assert!(app.dirty);
}

#[test]
fn test_export_current_day() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, _db) = setup(dir.path().to_path_buf());
    app.add_row("십일조 1000").unwrap();
    app.export_current(None);

    let path = dir.path().join("교회재정_일별장부_2024-06-02.xlsx");
    assert!(path.exists());
    assert!(app.status_message.starts_with("Exported to"));
}

#[test]
fn test_export_report_to_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, db) = setup(PathBuf::from("."));
    app.screen = Screen::Report;
    let target = dir.path().join("sub").join("report.xlsx");
    app.export_current(Some(target.clone()));
    assert!(target.exists());

    app.export_all(&db, Some(dir.path().join("all.xlsx")));
    assert!(dir.path().join("all.xlsx").exists());
}

#[test]
fn test_export_failure_reported_in_status() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, b"x").unwrap();
    let (mut app, _db) = setup(blocker.clone());
    app.export_current(None);
    assert!(app.status_message.starts_with("Export failed"));
}
