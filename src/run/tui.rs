use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::{info, warn};

use crate::config::Settings;
use crate::db::Database;
use crate::models::LedgerKind;
use crate::report::Granularity;
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(db: &mut Database, settings: Settings) -> Result<()> {
    let mut app = App::new(settings, Local::now().date_naive());
    app.refresh_all(db)?;
    info!(date = %app.ledger.date, "tui started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            app.visible_rows = crate::ui::render::page_rows(app.screen, f.area().height);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db)?,
                InputMode::Command => handle_command_input(key, app, db)?,
                InputMode::Confirm => handle_confirm_input(key, app, db),
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => {
            commands::handle_command("quit", app, db)?;
        }
        KeyCode::Char('s') if ctrl => commands::handle_command("save", app, db)?,
        KeyCode::Char('d') if ctrl => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if ctrl => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char(c @ '1'..='3') => {
            let idx = (c as usize) - ('1' as usize);
            if let Some(&screen) = Screen::all().get(idx) {
                switch_screen(app, db, screen);
            }
        }
        KeyCode::Tab | KeyCode::BackTab => {
            let screens = Screen::all();
            let current = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = if key.code == KeyCode::Tab {
                (current + 1) % screens.len()
            } else {
                (current + screens.len() - 1) % screens.len()
            };
            switch_screen(app, db, screens[next]);
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('H') => commands::handle_command("prev", app, db)?,
        KeyCode::Char('L') => commands::handle_command("next", app, db)?,
        KeyCode::Char('x') => commands::handle_command("export", app, db)?,
        _ => match app.screen {
            Screen::Ledger => handle_ledger_key(key, app, db)?,
            Screen::Report => handle_report_key(key, app, db),
            Screen::Monthly => handle_monthly_key(key, app),
        },
    }
    Ok(())
}

fn handle_ledger_key(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.pane = LedgerKind::Income,
        KeyCode::Char('l') | KeyCode::Right => app.pane = LedgerKind::Expense,
        KeyCode::Char('t') => commands::handle_command("date today", app, db)?,
        KeyCode::Char('a') => {
            app.input_mode = InputMode::Command;
            app.command_input = "add ".to_string();
        }
        KeyCode::Char('D') => app.request_delete(),
        _ => {}
    }
    Ok(())
}

fn handle_report_key(key: event::KeyEvent, app: &mut App, db: &mut Database) {
    let granularity = match key.code {
        KeyCode::Char('d') => Granularity::Day,
        KeyCode::Char('w') => Granularity::Week,
        KeyCode::Char('m') => Granularity::Month,
        KeyCode::Char('q') => Granularity::Quarter,
        KeyCode::Char('y') => Granularity::Year,
        _ => return,
    };
    if let Err(e) = app.set_granularity(db, granularity) {
        report_error(app, "Report failed", &e);
    }
}

fn handle_monthly_key(key: event::KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('i') => app.set_monthly_kind(LedgerKind::Income),
        KeyCode::Char('e') => app.set_monthly_kind(LedgerKind::Expense),
        _ => {}
    }
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, db: &mut Database) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            if let Some(action) = app.pending_action.take() {
                match action {
                    PendingAction::DeleteRow { kind, index } => app.delete_row(kind, index),
                    PendingAction::SwitchDay { target } => {
                        if let Err(e) = app.load_date(db, target) {
                            report_error(app, "Load failed", &e);
                        }
                    }
                    PendingAction::Revert => match app.refresh_ledger(db) {
                        Ok(()) => app.set_status(format!("Reloaded {}", app.ledger.date)),
                        Err(e) => report_error(app, "Load failed", &e),
                    },
                    PendingAction::Quit => app.running = false,
                }
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
        _ => {}
    }
}

fn report_error(app: &mut App, what: &str, e: &anyhow::Error) {
    warn!(error = %format!("{e:#}"), "{what}");
    app.set_status(format!("{what}: {e:#}"));
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, db: &mut Database, screen: Screen) {
    if let Err(e) = app.switch_screen(db, screen) {
        report_error(app, "Load failed", &e);
    }
}

fn handle_move_down(app: &mut App) {
    let page = app.visible_rows;
    match app.cursor() {
        Some((index, scroll, len)) => scroll_down(index, scroll, len, page),
        None => app.scroll_report(1),
    }
}

fn handle_move_up(app: &mut App) {
    match app.cursor() {
        Some((index, scroll, _)) => scroll_up(index, scroll),
        None => app.scroll_report(-1),
    }
}

fn handle_goto_top(app: &mut App) {
    match app.cursor() {
        Some((index, scroll, _)) => scroll_to_top(index, scroll),
        None => app.report_scroll = 0,
    }
}

fn handle_goto_bottom(app: &mut App) {
    let page = app.visible_rows;
    match app.cursor() {
        Some((index, scroll, len)) => scroll_to_bottom(index, scroll, len, page),
        None => app.scroll_report(isize::MAX),
    }
}
