use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use crate::models::Item;
use crate::report::{MethodSplit, ReportSummary, SummaryLine};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_percent, format_won};

pub(crate) const CARD_HEIGHT: u16 = 5;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(report) = &app.report else {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY));
        let msg = Paragraph::new(Span::styled("No report loaded", theme::dim_style()))
            .centered()
            .block(block);
        f.render_widget(msg, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(CARD_HEIGHT), Constraint::Min(5)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(chunks[0]);

    let balance = report.net_balance();
    render_card(
        f,
        cards[0],
        "수입 합계",
        report.income_total,
        theme::GREEN,
        &split_line(&report.income_methods),
    );
    render_card(
        f,
        cards[1],
        "지출 합계",
        report.expense_total,
        theme::RED,
        &split_line(&report.expense_methods),
    );
    render_card(
        f,
        cards[2],
        "차액 (수입-지출)",
        balance,
        if balance < Decimal::ZERO {
            theme::RED
        } else {
            theme::GREEN
        },
        &report.period.label,
    );

    let tables = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    render_summary(f, tables[0], &report.income, app.report_scroll);
    render_summary(f, tables[1], &report.expense, app.report_scroll);
}

fn split_line(split: &MethodSplit) -> String {
    let mut line = format!(
        "현금 {} ({})  은행 {} ({})",
        format_won(split.cash),
        format_percent(Some(split.cash_percent)),
        format_won(split.bank),
        format_percent(Some(split.bank_percent)),
    );
    if !split.unassigned.is_zero() {
        line.push_str(&format!("  미지정 {}", format_won(split.unassigned)));
    }
    line
}

fn render_card(f: &mut Frame, area: Rect, title: &str, amount: Decimal, color: Color, subtitle: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            format_won(amount),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(block);

    f.render_widget(text, area);
}

fn render_summary<C: Item>(f: &mut Frame, area: Rect, summary: &ReportSummary<C>, scroll: usize) {
    let spec = C::KIND.columns();
    let header = Row::new(
        [spec.category, "합계", "비율"]
            .into_iter()
            .map(|h| Cell::from(h).style(theme::header_style())),
    )
    .height(1);

    let rows: Vec<Row> = summary
        .rows
        .iter()
        .enumerate()
        .skip(scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, row)| {
            let style = if row.line.is_total() {
                theme::total_style()
            } else if row.sum.is_zero() {
                theme::dim_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let label = match row.line {
                SummaryLine::Unspecified => Span::styled(row.label.as_str(), theme::dim_style()),
                _ => Span::raw(row.label.as_str()),
            };
            Row::new(vec![
                Cell::from(label),
                Cell::from(Line::from(format_won(row.sum)).right_aligned()),
                Cell::from(Line::from(format_percent(row.percent)).right_aligned()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(14),
        Constraint::Length(16),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" {} ", C::KIND.columns().category),
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(table, area);
}
