#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;
use std::io::Write;
use std::time::Duration;

use super::*;
use crate::models::{ExpenseItem, IncomeItem};
use crate::report::NetExclusions;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn argv(args: &[&str]) -> Vec<String> {
    std::iter::once("churchledger")
        .chain(args.iter().copied())
        .map(String::from)
        .collect()
}

fn settings(export_dir: &Path) -> Settings {
    Settings {
        organization: "평안한교회".into(),
        database: PathBuf::from(":memory:"),
        export_dir: export_dir.to_path_buf(),
        busy_timeout: Duration::from_secs(1),
        exclusions: NetExclusions::default(),
    }
}

fn write_csv(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path.to_string_lossy().into_owned()
}

// ── Argument helpers ──────────────────────────────────────────

#[test]
fn test_positional_skips_flag_values() {
    let args: Vec<String> = ["month", "--xlsx", "out.xlsx", "2024-06-02"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(positional(&args), vec!["month", "2024-06-02"]);
    assert_eq!(flag(&args, "--xlsx"), Some("out.xlsx"));
    assert_eq!(flag(&args, "--income"), None);
}

#[test]
fn test_date_arg() {
    assert_eq!(date_arg(Some("2024-06-02")).unwrap(), ymd(2024, 6, 2));
    assert_eq!(date_arg(None).unwrap(), Local::now().date_naive());
    let err = date_arg(Some("June")).unwrap_err();
    assert!(err.to_string().contains("Invalid date: June"));
}

#[test]
fn test_shellexpand_leaves_plain_paths() {
    assert_eq!(shellexpand("/tmp/out.xlsx"), "/tmp/out.xlsx");
    assert_eq!(shellexpand("out.xlsx"), "out.xlsx");
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn test_unknown_command_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::open_in_memory().unwrap();
    let err = as_cli(&argv(&["balance"]), &mut db, &settings(dir.path())).unwrap_err();
    assert!(err.to_string().contains("Unknown command: balance"));
}

#[test]
fn test_save_from_csv_grids() {
    let dir = tempfile::tempdir().unwrap();
    let income = write_csv(
        dir.path(),
        "income.csv",
        "적요,수입항목,수입내역,금액,비고\n현금,십일조,김성도,\"100,000\",\n",
    );
    let expense = write_csv(
        dir.path(),
        "expense.csv",
        "적요,지출항목,지출내역,금액,비고\n은행,전기요금,6월분,42500,\n",
    );
    let mut db = Database::open_in_memory().unwrap();
    let args = argv(&["save", "2024-06-02", "--income", &income, "--expense", &expense]);
    as_cli(&args, &mut db, &settings(dir.path())).unwrap();

    let day = db.fetch_day(ymd(2024, 6, 2)).unwrap();
    assert_eq!(day.revision, 1);
    assert_eq!(day.income[0].category, Some(IncomeItem::Tithe));
    assert_eq!(day.income[0].amount, Some(dec!(100000)));
    // Rows without a date column land on the saved day.
    assert_eq!(day.income[0].date, Some(ymd(2024, 6, 2)));
    assert_eq!(day.expense[0].category, Some(ExpenseItem::Electricity));
}

#[test]
fn test_save_without_grid_keeps_stored_rows() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::open_in_memory().unwrap();
    let first = write_csv(
        dir.path(),
        "first.csv",
        "지출항목,금액\n전기요금,42500\n",
    );
    as_cli(
        &argv(&["save", "2024-06-02", "--expense", &first]),
        &mut db,
        &settings(dir.path()),
    )
    .unwrap();

    let income = write_csv(dir.path(), "income.csv", "수입항목,금액\n감사헌금,30000\n");
    as_cli(
        &argv(&["save", "2024-06-02", "--income", &income]),
        &mut db,
        &settings(dir.path()),
    )
    .unwrap();

    let day = db.fetch_day(ymd(2024, 6, 2)).unwrap();
    assert_eq!(day.revision, 2);
    assert_eq!(day.income.len(), 1);
    assert_eq!(day.expense.len(), 1);
    assert_eq!(day.expense[0].amount, Some(dec!(42500)));
}

#[test]
fn test_save_requires_a_grid_and_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::open_in_memory().unwrap();
    let s = settings(dir.path());

    let err = as_cli(&argv(&["save", "2024-06-02"]), &mut db, &s).unwrap_err();
    assert!(err.to_string().contains("Nothing to save"));

    let missing = dir.path().join("missing.csv");
    let args = argv(&["save", "2024-06-02", "--income", &missing.to_string_lossy()]);
    let err = as_cli(&args, &mut db, &s).unwrap_err();
    assert!(err.to_string().contains("File not found"));
    assert_eq!(db.day_revision(ymd(2024, 6, 2)).unwrap(), 0);
}

#[test]
fn test_report_rejects_unknown_period() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::open_in_memory().unwrap();
    let err = as_cli(&argv(&["report", "decade"]), &mut db, &settings(dir.path())).unwrap_err();
    assert!(err.to_string().contains("Unknown period: decade"));
}

#[test]
fn test_report_writes_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::open_in_memory().unwrap();
    let target = dir.path().join("reports").join("june.xlsx");
    let args = argv(&[
        "report",
        "month",
        "2024-06-02",
        "--xlsx",
        &target.to_string_lossy(),
    ]);
    as_cli(&args, &mut db, &settings(dir.path())).unwrap();
    assert!(target.exists());
}

#[test]
fn test_monthly_validates_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::open_in_memory().unwrap();
    let s = settings(dir.path());

    let err = as_cli(&argv(&["monthly", "gifts"]), &mut db, &s).unwrap_err();
    assert!(err.to_string().contains("Unknown ledger: gifts"));
    let err = as_cli(&argv(&["monthly", "income", "24"]), &mut db, &s).unwrap_err();
    assert!(err.to_string().contains("Invalid year: 24"));
    as_cli(&argv(&["monthly", "지출", "2024"]), &mut db, &s).unwrap();
}

#[test]
fn test_export_day_defaults_to_export_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::open_in_memory().unwrap();
    as_cli(
        &argv(&["export-day", "2024-06-02"]),
        &mut db,
        &settings(dir.path()),
    )
    .unwrap();
    assert!(dir
        .path()
        .join(export::day_file_name(ymd(2024, 6, 2)))
        .exists());
}

#[test]
fn test_export_all_to_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::open_in_memory().unwrap();
    let target = dir.path().join("all.xlsx");
    as_cli(
        &argv(&["export-all", &target.to_string_lossy()]),
        &mut db,
        &settings(dir.path()),
    )
    .unwrap();
    assert!(target.exists());
}
