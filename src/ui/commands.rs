use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{Days, Local};
use tracing::warn;

use super::app::{App, Field, PendingAction, Screen};
use crate::db::Database;
use crate::models::{ExpenseItem, IncomeItem, Item, LedgerKind};
use crate::normalize;
use crate::report::Granularity;
use crate::run::shellexpand;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit", cmd_quit, r);
    register_command!("quit", "Quit", cmd_quit, r);
    register_command!("w", "Save the selected day", cmd_save, r);
    register_command!("save", "Save the selected day", cmd_save, r);
    register_command!("revert", "Reload the selected day, dropping edits", cmd_revert, r);
    register_command!("l", "Go to Ledger", cmd_ledger, r);
    register_command!("ledger", "Go to Ledger", cmd_ledger, r);
    register_command!("r", "Go to Report", cmd_report, r);
    register_command!("report", "Go to Report", cmd_report, r);
    register_command!("m", "Go to Monthly status", cmd_monthly, r);
    register_command!("monthly", "Go to Monthly status", cmd_monthly, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!(
        "date",
        "Select a day (e.g. :date 2024-06-02, :date today)",
        cmd_date,
        r
    );
    register_command!(
        "d",
        "Select a day (e.g. :date 2024-06-02, :date today)",
        cmd_date,
        r
    );
    register_command!("next", "Next day, period or year", cmd_next, r);
    register_command!("prev", "Previous day, period or year", cmd_prev, r);
    register_command!(
        "add",
        "Add a row (e.g. :add 십일조 100000 현금 김성도)",
        cmd_add,
        r
    );
    register_command!(
        "a",
        "Add a row (e.g. :add 십일조 100000 현금 김성도)",
        cmd_add,
        r
    );
    register_command!("cat", "Set category of the selected row", cmd_category, r);
    register_command!("amount", "Set amount of the selected row", cmd_amount, r);
    register_command!(
        "method",
        "Set method of the selected row (현금/은행)",
        cmd_method,
        r
    );
    register_command!("desc", "Set description of the selected row", cmd_description, r);
    register_command!("note", "Set note of the selected row", cmd_note, r);
    register_command!("delete", "Delete the selected row", cmd_delete, r);
    register_command!("del", "Delete the selected row", cmd_delete, r);
    register_command!(
        "import",
        "Append rows from a CSV grid (e.g. :import ~/offering.csv)",
        cmd_import,
        r
    );
    register_command!(
        "period",
        "Report granularity (day/week/month/quarter/year)",
        cmd_period,
        r
    );
    register_command!("year", "Monthly status year (e.g. :year 2024)", cmd_year, r);
    register_command!("kind", "Monthly status ledger (수입/지출)", cmd_kind, r);
    register_command!(
        "export",
        "Export the current screen to .xlsx (optional path)",
        cmd_export,
        r
    );
    register_command!(
        "export-all",
        "Export every stored row to .xlsx (optional path)",
        cmd_export_all,
        r
    );
    register_command!(
        "categories",
        "List the categories of the focused ledger",
        cmd_categories,
        r
    );

    r
});

/// Run one command line. Failures are shown in the status bar and logged.
pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        if let Err(e) = (cmd.run)(args, app, db) {
            warn!(command = cmd_name, error = %e, "command failed");
            app.set_status(format!("Error: {e:#}"));
        }
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.dirty {
        app.confirm(
            PendingAction::Quit,
            format!("Quit without saving {}?", app.ledger.date),
        );
    } else {
        app.running = false;
    }
    Ok(())
}

fn cmd_save(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.save(db)
}

fn cmd_revert(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if app.dirty {
        app.confirm(
            PendingAction::Revert,
            format!("Drop unsaved changes to {}?", app.ledger.date),
        );
        return Ok(());
    }
    app.refresh_ledger(db)?;
    app.set_status(format!("Reloaded {}", app.ledger.date));
    Ok(())
}

fn cmd_ledger(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.switch_screen(db, Screen::Ledger)
}

fn cmd_report(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.switch_screen(db, Screen::Report)
}

fn cmd_monthly(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.switch_screen(db, Screen::Monthly)
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_date(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let date = match args {
        "" | "today" => Local::now().date_naive(),
        other => match normalize::parse_date(other) {
            Some(date) => date,
            None => {
                app.set_status(format!("Invalid date: {other}. Use YYYY-MM-DD"));
                return Ok(());
            }
        },
    };
    app.request_date(db, date)
}

fn cmd_next(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    step(app, db, true)
}

fn cmd_prev(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    step(app, db, false)
}

fn step(app: &mut App, db: &mut Database, forward: bool) -> anyhow::Result<()> {
    match app.screen {
        Screen::Ledger => {
            let date = app.ledger.date;
            let target = if forward {
                date.checked_add_days(Days::new(1))
            } else {
                date.checked_sub_days(Days::new(1))
            };
            match target {
                Some(target) => app.request_date(db, target),
                None => Ok(()),
            }
        }
        Screen::Report => app.step_period(db, forward),
        Screen::Monthly => {
            let year = app.monthly_year + if forward { 1 } else { -1 };
            app.set_year(db, year)?;
            app.set_status(format!("Monthly status {year}"));
            Ok(())
        }
    }
}

fn cmd_add(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Ledger {
        app.set_status("Navigate to Ledger first");
        return Ok(());
    }
    if args.is_empty() {
        app.set_status("Usage: :add <category> <amount> [현금|은행] [description]");
        return Ok(());
    }
    app.add_row(args)?;
    app.set_status(format!("Added {} row (not yet saved)", app.pane));
    Ok(())
}

fn edit(app: &mut App, field: Field, value: &str) -> anyhow::Result<()> {
    if app.screen != Screen::Ledger {
        app.set_status("Navigate to Ledger first");
        return Ok(());
    }
    app.edit_selected(field, value)?;
    app.set_status("Row updated (not yet saved)");
    Ok(())
}

fn cmd_category(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    edit(app, Field::Category, args)
}

fn cmd_amount(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    edit(app, Field::Amount, args)
}

fn cmd_method(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    edit(app, Field::Method, args)
}

fn cmd_description(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    edit(app, Field::Description, args)
}

fn cmd_note(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    edit(app, Field::Note, args)
}

fn cmd_delete(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Ledger {
        app.set_status("Navigate to Ledger first");
        return Ok(());
    }
    app.request_delete();
    Ok(())
}

fn cmd_import(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :import <file.csv>");
        return Ok(());
    }
    let path = shellexpand(args);
    let added = app.import_grid(std::path::Path::new(&path))?;
    app.screen = Screen::Ledger;
    app.set_status(format!(
        "Imported {added} {} rows from {path} (not yet saved)",
        app.pane
    ));
    Ok(())
}

fn cmd_period(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some(granularity) = Granularity::parse(args) else {
        let names: Vec<&str> = Granularity::all().iter().map(Granularity::as_str).collect();
        app.set_status(format!("Usage: :period <{}>", names.join("|")));
        return Ok(());
    };
    app.screen = Screen::Report;
    app.set_granularity(db, granularity)
}

fn cmd_year(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Ok(year) = args.parse::<i32>() else {
        app.set_status("Usage: :year <YYYY>");
        return Ok(());
    };
    app.set_year(db, year)?;
    app.screen = Screen::Monthly;
    app.set_status(format!("Monthly status {year}"));
    Ok(())
}

fn cmd_kind(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some(kind) = LedgerKind::parse(args) else {
        app.set_status("Usage: :kind <수입|지출>");
        return Ok(());
    };
    app.set_monthly_kind(kind);
    app.switch_screen(db, Screen::Monthly)
}

fn cmd_export(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.export_current(target_path(args));
    Ok(())
}

fn cmd_export_all(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.export_all(db, target_path(args));
    Ok(())
}

fn target_path(args: &str) -> Option<std::path::PathBuf> {
    (!args.is_empty()).then(|| std::path::PathBuf::from(shellexpand(args)))
}

fn cmd_categories(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    let labels: Vec<&str> = match app.pane {
        LedgerKind::Income => IncomeItem::all().iter().map(|c| c.as_str()).collect(),
        LedgerKind::Expense => ExpenseItem::all().iter().map(|c| c.as_str()).collect(),
    };
    app.set_status(format!("{}: {}", app.pane, labels.join(", ")));
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
