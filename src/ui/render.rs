use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::app::{App, InputMode, Screen};
use super::commands;
use super::theme;

/// Rows left for list bodies once the bars, borders and headers are drawn.
pub(crate) fn page_rows(screen: Screen, height: u16) -> usize {
    // Tab, status and command bars.
    let content = height.saturating_sub(3);
    let rows = match screen {
        // Two stacked panes over a totals strip; each pane has borders and a header.
        Screen::Ledger => content.saturating_sub(3) / 2,
        Screen::Report => content.saturating_sub(super::screens::report::CARD_HEIGHT),
        Screen::Monthly => content,
    };
    rows.saturating_sub(3).max(1) as usize
}

pub(crate) fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Command bar
        ])
        .split(f.area());

    render_tab_bar(f, chunks[0], app);
    render_screen(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);
    render_command_bar(f, chunks[3], app);

    if app.show_help {
        render_help_overlay(f, f.area());
    }
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let num = format!("{}", i + 1);
            if *s == app.screen {
                Line::from(vec![
                    Span::styled(format!("{num}:"), Style::default().fg(theme::TEXT_DIM)),
                    Span::styled(
                        format!("{s}"),
                        Style::default()
                            .fg(theme::ACCENT)
                            .add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                Line::from(Span::styled(
                    format!("{num}:{s}"),
                    Style::default().fg(theme::TEXT_DIM),
                ))
            }
        })
        .collect();

    let tabs = Tabs::new(titles)
        .divider(Span::styled(" | ", Style::default().fg(theme::OVERLAY)))
        .style(Style::default().bg(theme::HEADER_BG));

    let org = Paragraph::new(Span::styled(
        format!("{} ", app.settings.organization),
        Style::default().fg(theme::TEXT_DIM),
    ))
    .right_aligned()
    .style(Style::default().bg(theme::HEADER_BG));

    f.render_widget(org, area);
    f.render_widget(tabs, area);
}

fn render_screen(f: &mut Frame, area: Rect, app: &App) {
    match app.screen {
        Screen::Ledger => super::screens::ledger::render(f, area, app),
        Screen::Report => super::screens::report::render(f, area, app),
        Screen::Monthly => super::screens::monthly::render(f, area, app),
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mode_label = format!(" {} ", app.input_mode);
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::ACCENT)
            .add_modifier(Modifier::BOLD),
        InputMode::Command => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::GREEN)
            .add_modifier(Modifier::BOLD),
        InputMode::Confirm => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::RED)
            .add_modifier(Modifier::BOLD),
    };

    let info = match app.screen {
        Screen::Ledger => format!(
            " {} | {} | rev {}{}",
            app.screen,
            app.ledger.date.format("%Y-%m-%d (%a)"),
            app.ledger.revision,
            if app.dirty { " | modified" } else { "" }
        ),
        Screen::Report => format!(" {} | {}", app.screen, app.period.label),
        Screen::Monthly => format!(
            " {} | {} {}",
            app.screen, app.monthly_year, app.monthly_kind
        ),
    };

    let right = match app.screen {
        Screen::Ledger => " H/L day | h/l pane | a add | D delete | ^s save | ? help ",
        Screen::Report => " d/w/m/q/y period | H/L step | x export | ? help ",
        Screen::Monthly => " i/e ledger | H/L year | x export | ? help ",
    };

    let available = area.width as usize;
    let used = mode_label.chars().count() + info.chars().count() + right.chars().count();
    let pad = available.saturating_sub(used);

    let bar = Paragraph::new(Line::from(vec![
        Span::styled(&mode_label, mode_style),
        Span::styled(&info, theme::status_bar_style()),
        Span::styled(" ".repeat(pad), theme::status_bar_style()),
        Span::styled(right, theme::status_bar_style()),
    ]));
    f.render_widget(bar, area);
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App) {
    let (content, cursor_offset) = match app.input_mode {
        InputMode::Command => (
            Line::from(vec![
                Span::styled(":", Style::default().fg(theme::ACCENT)),
                Span::styled(&app.command_input, theme::command_bar_style()),
            ]),
            Some(1 + Line::raw(app.command_input.as_str()).width() as u16),
        ),
        InputMode::Confirm => (
            Line::from(vec![
                Span::styled(&app.confirm_message, Style::default().fg(theme::YELLOW)),
                Span::styled(" [y/N] ", Style::default().fg(theme::RED)),
            ]),
            None,
        ),
        InputMode::Normal => (
            if app.status_message.is_empty() {
                Line::from(Span::styled(
                    " Press : for commands, ? for help",
                    theme::dim_style(),
                ))
            } else {
                Line::from(Span::styled(
                    &app.status_message,
                    theme::command_bar_style(),
                ))
            },
            None,
        ),
    };

    let bar = Paragraph::new(content).style(Style::default().bg(theme::COMMAND_BG));
    f.render_widget(bar, area);

    if let Some(offset) = cursor_offset {
        f.set_cursor_position((area.x + offset, area.y));
    }
}

fn section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(theme::YELLOW)
            .add_modifier(Modifier::BOLD),
    ))
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let keys = [
        "  j/k or Up/Down   Move cursor           1-3        Switch tabs",
        "  Tab/Shift-Tab    Cycle tabs            g/G        Top/Bottom",
        "  H/L              Prev/Next day, period or year",
        "  :                Command mode          Ctrl-q     Quit",
    ];
    let ledger = [
        "  h/l              Income/Expense pane   t          Today",
        "  a                :add prompt           D          Delete row",
        "  Ctrl-s           Save (checked)        x          Export day",
    ];
    let views = [
        "  d/w/m/q/y        Report granularity    i/e        Monthly ledger",
    ];

    let mut help_text = vec![
        Line::from(Span::styled(
            " ChurchLedger Help ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section(" Navigation"),
    ];
    help_text.extend(keys.iter().map(|l| Line::from(Span::styled(*l, theme::normal_style()))));
    help_text.push(Line::from(""));
    help_text.push(section(" Ledger"));
    help_text.extend(ledger.iter().map(|l| Line::from(Span::styled(*l, theme::normal_style()))));
    help_text.push(Line::from(""));
    help_text.push(section(" Report / Monthly"));
    help_text.extend(views.iter().map(|l| Line::from(Span::styled(*l, theme::normal_style()))));
    help_text.push(Line::from(""));
    help_text.push(section(" Commands"));

    // Build command list dynamically from COMMANDS registry
    let mut registry: Vec<(&str, &str)> = commands::COMMANDS
        .iter()
        .map(|(&name, cmd)| (name, cmd.description))
        .collect();
    // Longest alias first so each description is listed under its full name.
    registry.sort_by_key(|(name, _)| std::cmp::Reverse(name.len()));
    let mut seen = std::collections::HashSet::new();
    let mut cmd_lines: Vec<(&str, &str)> = registry
        .into_iter()
        .filter(|(_, desc)| seen.insert(*desc))
        .collect();
    cmd_lines.sort_by_key(|(name, _)| *name);
    for (name, desc) in &cmd_lines {
        help_text.push(Line::from(Span::styled(
            format!("  :{name:<12} {desc}"),
            theme::normal_style(),
        )));
    }

    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        " Press any key to close ",
        Style::default().fg(theme::TEXT_DIM),
    )));

    // Center the popup, clamped to terminal height
    let popup_height = (help_text.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup_width = 76.min(area.width.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    f.render_widget(Clear, popup_area);
    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(help, popup_area);
}
