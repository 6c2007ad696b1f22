use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use crate::models::{total, Item, LedgerEntry, LedgerKind};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_won, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),   // Income
            Constraint::Fill(1),   // Expense
            Constraint::Length(3), // Day totals
        ])
        .split(area);

    render_pane(
        f,
        chunks[0],
        &app.ledger.income,
        (app.income_index, app.income_scroll),
        app.pane == LedgerKind::Income,
    );
    render_pane(
        f,
        chunks[1],
        &app.ledger.expense,
        (app.expense_index, app.expense_scroll),
        app.pane == LedgerKind::Expense,
    );
    render_totals(f, chunks[2], app);
}

fn render_pane<C: Item>(
    f: &mut Frame,
    area: Rect,
    rows: &[LedgerEntry<C>],
    (index, scroll): (usize, usize),
    focused: bool,
) {
    let kind = C::KIND;
    let title = Span::styled(
        format!(" {} ({}) ", kind, rows.len()),
        Style::default()
            .fg(if focused { theme::ACCENT } else { theme::TEXT_DIM })
            .add_modifier(Modifier::BOLD),
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::pane_border_style(focused))
        .title(title);

    if rows.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled(format!("No {kind} rows for this day"), theme::dim_style())),
            Line::from(Span::styled(
                "Add one with :add <category> <amount> or load a grid with :import",
                theme::dim_style(),
            )),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let spec = kind.columns();
    let header_cells = [spec.method, spec.category, spec.description, spec.amount, spec.note]
        .into_iter()
        .map(|h| Cell::from(h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let amount_style = match kind {
        LedgerKind::Income => theme::income_style(),
        LedgerKind::Expense => theme::expense_style(),
    };

    let body: Vec<Row> = rows
        .iter()
        .enumerate()
        .skip(scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, entry)| {
            let style = if focused && i == index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let amount = match entry.amount {
                Some(amount) => Span::styled(format_won(amount), amount_style),
                None => Span::styled("—", theme::dim_style()),
            };

            Row::new(vec![
                Cell::from(entry.method.map_or("", |m| m.as_str())),
                Cell::from(entry.category_label()),
                Cell::from(truncate(&entry.description, 32)),
                Cell::from(Line::from(amount).right_aligned()),
                Cell::from(truncate(&entry.note, 24)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Length(16),
        Constraint::Min(16),
        Constraint::Length(14),
        Constraint::Length(20),
    ];

    f.render_widget(Table::new(body, widths).header(header).block(block), area);
}

fn render_totals(f: &mut Frame, area: Rect, app: &App) {
    let income = total(&app.ledger.income);
    let expense = total(&app.ledger.expense);
    let balance = income - expense;

    let line = Line::from(vec![
        Span::styled(" 수입 합계 ", theme::dim_style()),
        Span::styled(format_won(income), theme::income_style()),
        Span::styled("    지출 합계 ", theme::dim_style()),
        Span::styled(format_won(expense), theme::expense_style()),
        Span::styled("    차액 ", theme::dim_style()),
        Span::styled(
            format_won(balance),
            theme::balance_style(balance < Decimal::ZERO).add_modifier(Modifier::BOLD),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" {} ", app.ledger.date.format("%Y-%m-%d (%a)")),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    f.render_widget(Paragraph::new(line).block(block), area);
}
