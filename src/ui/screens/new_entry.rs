use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::analytics;
use crate::entry::SaleField;
use crate::models::flag_code;
use crate::store::Ledger;
use crate::ui::app::{App, InputMode};
use crate::ui::theme;
use crate::ui::util::format_amount;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App, ledger: &Ledger) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(12), // Draft fields
            Constraint::Min(4),     // Pending items
            Constraint::Length(4),  // Last entry
        ])
        .split(columns[0]);

    render_fields(f, left[0], app);
    render_pending_items(f, left[1], app);
    render_last_entry(f, left[2], app);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(columns[1]);

    let channels = analytics::channels(ledger.sales());
    render_name_list(f, right[0], "Channels", &channels, Some(app.draft.channel.as_str()));

    let (title, names) = if app.input_mode == InputMode::Editing {
        ("Suggestions", app.item_suggestions(ledger))
    } else {
        let all: Vec<_> = ledger.sales().iter().collect();
        ("Known items", analytics::unique_items(&all))
    };
    render_name_list(f, right[1], title, &names, None);
}

fn field_line(field: SaleField, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", field.as_str()), theme::dim_style()),
        Span::styled(value, theme::normal_style()),
    ])
}

fn render_fields(f: &mut Frame, area: Rect, app: &App) {
    let draft = &app.draft;
    let channel = if draft.channel.is_empty() {
        "(required)".to_string()
    } else {
        draft.channel.clone()
    };

    let lines = vec![
        field_line(SaleField::JobId, draft.job_id.to_string()),
        field_line(SaleField::Date, draft.date.format("%Y-%m-%d").to_string()),
        field_line(SaleField::Channel, channel),
        field_line(SaleField::Ad, flag_code(draft.ad).to_string()),
        field_line(SaleField::Rent, flag_code(draft.rent).to_string()),
        field_line(SaleField::Amount, format_amount(draft.amount)),
        field_line(SaleField::Shipping, format_amount(draft.shipping)),
        Line::from(vec![
            Span::styled(
                format!("  {:<10}", SaleField::TotalAmount.as_str()),
                theme::dim_style(),
            ),
            Span::styled(
                format_amount(draft.total()),
                Style::default()
                    .fg(theme::GREEN)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        field_line(SaleField::PaidBy, format_amount(draft.paid_by)),
        field_line(SaleField::OperatorIncome, format_amount(draft.operator_income)),
    ];

    let para = Paragraph::new(lines).block(theme::panel("New Entry (:set <field> <value>)"));
    f.render_widget(para, area);
}

fn render_pending_items(f: &mut Frame, area: Rect, app: &App) {
    let items = app.draft.items();
    let block = theme::panel(format!("Items ({})", items.len()));
    if items.is_empty() {
        let msg = Paragraph::new(Span::styled(
            "  Press i or use :add [qty] <name>",
            theme::dim_style(),
        ))
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let list: Vec<ListItem> = items
        .iter()
        .map(|e| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("  {:>4} ", e.quantity), theme::section_style()),
                Span::styled(e.name.clone(), theme::normal_style()),
            ]))
        })
        .collect();
    f.render_widget(List::new(list).block(block), area);
}

fn render_last_entry(f: &mut Frame, area: Rect, app: &App) {
    let text = match &app.last_entry {
        Some(sale) => format!(
            "Job #{} on {} via {}: {} [{}]",
            sale.job_id,
            sale.date.format("%Y-%m-%d"),
            sale.channel,
            format_amount(sale.total_amount),
            sale.item_text
        ),
        None => "Nothing submitted yet".to_string(),
    };
    let para = Paragraph::new(Span::styled(text, theme::dim_style()))
        .wrap(Wrap { trim: true })
        .block(theme::panel("Last entry"));
    f.render_widget(para, area);
}

fn render_name_list(f: &mut Frame, area: Rect, title: &str, names: &[String], current: Option<&str>) {
    let list: Vec<ListItem> = names
        .iter()
        .take(area.height.saturating_sub(2) as usize)
        .map(|name| {
            let style = if current == Some(name.as_str()) {
                theme::selected_style()
            } else {
                theme::normal_style()
            };
            ListItem::new(Span::styled(format!(" {name}"), style))
        })
        .collect();
    f.render_widget(
        List::new(list).block(theme::panel(format!("{title} ({})", names.len()))),
        area,
    );
}
