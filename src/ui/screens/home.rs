use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use crate::models::flag_code;
use crate::store::Ledger;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

const HEADERS: [&str; 11] = [
    "Job #", "Date", "Channel", "Ad", "Rent", "Amount", "Shipping", "Total", "Paid By",
    "Income", "Item",
];

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App, ledger: &Ledger) {
    let rows = app.home_rows(ledger);

    let mut title = format!("Sales ({} rows)", rows.len());
    if let Some(search) = &app.filter.search {
        title.push_str(&format!(" search: '{}'", search.query()));
    }

    if rows.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled("No results found.", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Adjust :from / :to or press Esc to clear the search",
                theme::dim_style(),
            )),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(theme::panel(title)), area);
        return;
    }

    let header = Row::new(
        HEADERS
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    );

    let table_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .skip(app.row_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, &(position, original))| {
            let sale = app.display_row(position, original);
            let edited = app.pending_edits.contains_key(&position);
            let style = if i == app.row_index {
                theme::selected_style()
            } else if edited {
                theme::edited_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let job = if edited {
                format!("*{}", sale.job_id)
            } else {
                sale.job_id.to_string()
            };

            Row::new(vec![
                Cell::from(job),
                Cell::from(sale.date.format("%Y-%m-%d").to_string()),
                Cell::from(truncate(&sale.channel, 12)),
                Cell::from(flag_code(sale.ad)),
                Cell::from(flag_code(sale.rent)),
                Cell::from(format_amount(sale.amount)),
                Cell::from(format_amount(sale.shipping)),
                Cell::from(format_amount(sale.total_amount)),
                Cell::from(format_amount(sale.paid_by)),
                Cell::from(format_amount(sale.operator_income)),
                Cell::from(sale.item_text.clone()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Length(11),
        Constraint::Length(10),
        Constraint::Length(11),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Min(16),
    ];

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(theme::panel(title));
    f.render_widget(table, area);
}
