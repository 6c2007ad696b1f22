use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::models::{Item, LedgerKind};
use crate::report::MonthlyStatus;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_number, format_percent};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    match app.monthly_kind {
        LedgerKind::Income => match &app.monthly_income {
            Some(status) => render_status(f, area, status, app),
            None => render_empty(f, area),
        },
        LedgerKind::Expense => match &app.monthly_expense {
            Some(status) => render_status(f, area, status, app),
            None => render_empty(f, area),
        },
    }
}

fn render_empty(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY));
    let msg = Paragraph::new(Span::styled("No monthly status loaded", theme::dim_style()))
        .centered()
        .block(block);
    f.render_widget(msg, area);
}

fn render_status<C: Item>(f: &mut Frame, area: Rect, status: &MonthlyStatus<C>, app: &App) {
    let mut headers: Vec<String> = vec![C::KIND.columns().category.to_string()];
    headers.extend((1..=12).map(|m| format!("{m}월")));
    headers.push("합계".into());
    headers.push("비율".into());
    let header = Row::new(
        headers
            .into_iter()
            .map(|h| Cell::from(h).style(theme::header_style())),
    )
    .height(1);

    let rows: Vec<Row> = status
        .rows
        .iter()
        .enumerate()
        .skip(app.monthly_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, row)| {
            let style = if i == app.monthly_index {
                theme::selected_style()
            } else if row.line.is_total() {
                theme::total_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let mut cells = vec![Cell::from(row.label.as_str())];
            cells.extend(row.months.iter().map(|amount| {
                if amount.is_zero() {
                    Cell::from(Line::from(Span::styled("-", theme::dim_style())).right_aligned())
                } else {
                    Cell::from(Line::from(format_number(*amount)).right_aligned())
                }
            }));
            cells.push(Cell::from(Line::from(format_number(row.total)).right_aligned()));
            cells.push(Cell::from(
                Line::from(format_percent(Some(row.percent))).right_aligned(),
            ));
            Row::new(cells).style(style)
        })
        .collect();

    let mut widths = vec![Constraint::Length(14)];
    widths.extend(std::iter::repeat(Constraint::Length(10)).take(12));
    widths.push(Constraint::Length(12));
    widths.push(Constraint::Length(7));

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" {} {} ", status.title(), status.year),
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(table, area);
}
