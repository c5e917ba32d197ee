use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Gauge, List, ListItem, Paragraph},
    Frame,
};

use crate::analytics::{self, ItemMetrics};
use crate::store::Ledger;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::truncate;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App, ledger: &Ledger) {
    let choices = app.item_choices(ledger);
    if choices.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No data available for the selected filters.",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(theme::panel("Items Analysis"));
        f.render_widget(msg, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(30)])
        .split(area);

    render_item_list(f, columns[0], app, &choices);

    let Some(item) = app.selected_item(ledger) else {
        return;
    };
    let selection = app.date_filter().apply(ledger.sales());
    let rows = selection.rows();

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),    // Channel distribution
            Constraint::Length(5), // Metric cards
            Constraint::Length(3), // Ad vs organic
        ])
        .split(columns[1]);

    render_distribution(f, right[0], &item, &analytics::item_channel_distribution(rows, &item));
    let metrics = analytics::item_metrics(rows, &item);
    render_metric_cards(f, right[1], &metrics);
    render_ad_split(f, right[2], &metrics);
}

fn render_item_list(f: &mut Frame, area: Rect, app: &App, choices: &[String]) {
    let page = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = choices
        .iter()
        .enumerate()
        .skip(app.item_scroll)
        .take(page)
        .map(|(i, name)| {
            let style = if i == app.item_index {
                theme::selected_style()
            } else {
                theme::normal_style()
            };
            ListItem::new(Span::styled(truncate(name, 24), style))
        })
        .collect();

    let list = List::new(items).block(theme::panel(format!("Items ({})", choices.len())));
    f.render_widget(list, area);
}

fn render_distribution(f: &mut Frame, area: Rect, item: &str, counts: &[(String, usize)]) {
    let bars: Vec<Bar> = counts
        .iter()
        .map(|(channel, count)| {
            Bar::default()
                .value(*count as u64)
                .label(Line::from(truncate(channel, 10)))
                .style(Style::default().fg(theme::MAUVE))
                .value_style(
                    Style::default()
                        .fg(theme::TEXT)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(theme::panel(format!("Distribution of {item} by channel")))
        .data(BarGroup::default().bars(&bars))
        .bar_width(10)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme::MAUVE))
        .value_style(Style::default().fg(theme::TEXT));
    f.render_widget(chart, area);
}

fn render_metric_cards(f: &mut Frame, area: Rect, metrics: &ItemMetrics) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_card(f, cards[0], "Items Sold", metrics.items_sold.to_string());
    render_card(f, cards[1], "Customers", metrics.customers.to_string());
}

fn render_card(f: &mut Frame, area: Rect, title: &str, value: String) {
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            value,
            Style::default()
                .fg(theme::GREEN)
                .add_modifier(Modifier::BOLD),
        )),
    ])
    .centered()
    .block(theme::panel(title));
    f.render_widget(text, area);
}

fn render_ad_split(f: &mut Frame, area: Rect, metrics: &ItemMetrics) {
    let block = theme::panel(format!("Ad vs Organic for {}", metrics.item));
    let Some(percent) = metrics.ad_percent() else {
        f.render_widget(
            Paragraph::new(Span::styled("No sales", theme::dim_style())).block(block),
            area,
        );
        return;
    };

    let label = format!(
        "Ad {} ({percent:.1}%)  |  Organic {} ({:.1}%)",
        metrics.ad_sales,
        metrics.organic_sales,
        100.0 - percent
    );
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(theme::RED).bg(theme::GREEN))
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(Span::styled(label, Style::default().fg(theme::HEADER_BG)));
    f.render_widget(gauge, area);
}
