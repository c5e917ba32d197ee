use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Cell, Paragraph, Row, Sparkline, Table},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;

use crate::analytics::{self, ColumnStats};
use crate::basket::{self, RuleMetric};
use crate::filter::ChannelFilter;
use crate::models::Sale;
use crate::store::Ledger;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_measure, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App, ledger: &Ledger) {
    let selection = app.channel_filter().apply(ledger.sales());
    let scope = match &app.filter.channel {
        ChannelFilter::All => "all channels".to_string(),
        ChannelFilter::Only(c) => c.clone(),
    };

    if selection.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No data available for the selected filters.",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(theme::panel(format!("Channel: {}", app.filter.channel)));
        f.render_widget(msg, area);
        return;
    }
    let rows = selection.rows();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),  // Monthly totals
            Constraint::Length(11), // Statistics + items
            Constraint::Min(5),     // Rules
        ])
        .split(area);

    render_monthly_totals(f, chunks[0], rows, &scope);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);
    render_statistics(f, middle[0], rows, &scope);
    render_item_counts(f, middle[1], rows, &scope);

    render_rules(f, chunks[2], app, rows, &scope);
}

fn render_monthly_totals(f: &mut Frame, area: Rect, rows: &[&Sale], scope: &str) {
    let months = analytics::monthly_totals(rows);
    let data: Vec<u64> = months
        .iter()
        .map(|(_, total)| total.round().to_u64().unwrap_or(0))
        .collect();

    let peak = months.iter().map(|(_, t)| *t).max().unwrap_or_default();
    let title = match (months.first(), months.last()) {
        (Some((first, _)), Some((last, _))) if first != last => format!(
            "Total amount per month, {scope} ({first} to {last}, peak {})",
            format_amount(peak)
        ),
        (Some((only, _)), _) => {
            format!("Total amount per month, {scope} ({only}: {})", format_amount(peak))
        }
        _ => format!("Total amount per month, {scope}"),
    };

    let sparkline = Sparkline::default()
        .block(theme::panel(title))
        .data(&data)
        .style(Style::default().fg(theme::YELLOW));
    f.render_widget(sparkline, area);
}

fn stat_cell(stats: &ColumnStats, row: usize) -> String {
    let value = match row {
        0 => return stats.count.to_string(),
        1 => Some(stats.mean),
        2 => stats.std,
        3 => Some(stats.min),
        4 => Some(stats.q25),
        5 => Some(stats.median),
        6 => Some(stats.q75),
        _ => Some(stats.max),
    };
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn render_statistics(f: &mut Frame, area: Rect, rows: &[&Sale], scope: &str) {
    let Some(stats) = analytics::describe(rows) else {
        return;
    };
    const LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(stats.iter().map(|s| Cell::from(s.column)))
            .map(|c| c.style(theme::header_style())),
    );
    let table_rows: Vec<Row> = LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let cells = std::iter::once(Cell::from(*label).style(theme::dim_style()))
                .chain(stats.iter().map(|s| Cell::from(stat_cell(s, i))));
            Row::new(cells)
        })
        .collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(6))
        .chain(stats.iter().map(|_| Constraint::Min(9)))
        .collect();

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(theme::panel(format!("Summary statistics for {scope}")));
    f.render_widget(table, area);
}

fn render_item_counts(f: &mut Frame, area: Rect, rows: &[&Sale], scope: &str) {
    let counts = analytics::item_counts(rows);
    let block = theme::panel(format!("Items bought in {scope}"));
    if counts.is_empty() {
        let msg = Paragraph::new(Span::styled("No items recorded", theme::dim_style()))
            .centered()
            .block(block);
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = counts
        .iter()
        .take(area.height.saturating_sub(2) as usize)
        .map(|(name, count)| {
            Bar::default()
                .value(*count as u64)
                .label(Line::from(truncate(name, 14)))
                .style(Style::default().fg(theme::ACCENT))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0);
    f.render_widget(chart, area);
}

fn render_rules(f: &mut Frame, area: Rect, app: &App, rows: &[&Sale], scope: &str) {
    let params = &app.basket_params;
    let title = format!(
        "Apriori analysis for {scope} (support {}, {} >= {})",
        params.min_support, params.metric, params.min_threshold
    );

    let rules = match basket::analyze(rows, params) {
        Ok(rules) => rules,
        Err(e) => {
            let msg = Paragraph::new(Span::styled(e.to_string(), theme::edited_style()))
                .centered()
                .block(theme::panel(title));
            f.render_widget(msg, area);
            return;
        }
    };
    if rules.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No significant rules found with the selected parameters.",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(theme::panel(title));
        f.render_widget(msg, area);
        return;
    }

    // The chosen metric gets its own column when it is not one of the usual three
    let extra = match params.metric {
        RuleMetric::Leverage | RuleMetric::Conviction => Some(params.metric),
        _ => None,
    };

    let mut headers = vec!["antecedents", "consequents", "support", "confidence", "lift"];
    if let Some(metric) = extra {
        headers.push(metric.as_str());
    }
    let header = Row::new(
        headers
            .into_iter()
            .map(|h| Cell::from(h).style(theme::header_style())),
    );

    let table_rows: Vec<Row> = rules
        .iter()
        .take(area.height.saturating_sub(3) as usize)
        .enumerate()
        .map(|(i, rule)| {
            let mut cells = vec![
                Cell::from(rule.antecedents_label()),
                Cell::from(rule.consequents_label()),
                Cell::from(format_measure(Some(rule.support))),
                Cell::from(format_measure(Some(rule.confidence))),
                Cell::from(format_measure(Some(rule.lift))),
            ];
            if let Some(metric) = extra {
                let value = match metric {
                    RuleMetric::Conviction => rule.conviction,
                    _ => Some(rule.metric(metric)),
                };
                cells.push(Cell::from(format_measure(value)));
            }
            let style = if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            Row::new(cells).style(style)
        })
        .collect();

    let mut widths = vec![
        Constraint::Percentage(30),
        Constraint::Percentage(30),
        Constraint::Length(10),
        Constraint::Length(11),
        Constraint::Length(10),
    ];
    if extra.is_some() {
        widths.push(Constraint::Length(11));
    }

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(theme::panel(format!("{title}: {} rules", rules.len())));
    f.render_widget(table, area);
}
