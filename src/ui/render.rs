use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::app::{App, InputMode, Screen};
use super::commands;
use super::screens;
use super::theme;
use crate::filter::date_bounds;
use crate::store::Ledger;

pub(crate) fn render(f: &mut Frame, app: &App, ledger: &Ledger) {
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
    match app.screen {
        Screen::Home => screens::home::render(f, chunks[1], app, ledger),
        Screen::Channels => screens::channels::render(f, chunks[1], app, ledger),
        Screen::Items => screens::items::render(f, chunks[1], app, ledger),
        Screen::NewEntry => screens::new_entry::render(f, chunks[1], app, ledger),
    }
    render_status_bar(f, chunks[2], app, ledger);
    render_command_bar(f, chunks[3], app, ledger);

    if app.show_help {
        render_help_overlay(f, f.area());
    }
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let label = format!("{}:{s}", i + 1);
            let style = if *s == app.screen {
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::TEXT_DIM)
            };
            Line::from(Span::styled(label, style))
        })
        .collect();

    let tabs = Tabs::new(titles)
        .divider(Span::styled(" | ", Style::default().fg(theme::OVERLAY)))
        .style(Style::default().bg(theme::HEADER_BG));

    f.render_widget(tabs, area);
}

/// Human summary of the active date range. Open ends show the ledger's own span.
fn date_range_label(app: &App, ledger: &Ledger) -> String {
    let bounds = date_bounds(ledger.sales());
    let first = app.filter.start.or(bounds.map(|(s, _)| s));
    let last = app.filter.end.or(bounds.map(|(_, e)| e));
    match (first, last) {
        (Some(s), Some(e)) => format!("{s} to {e}"),
        _ => "no dates".into(),
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App, ledger: &Ledger) {
    let mode_label = format!(" {} ", app.input_mode);
    let mode_bg = match app.input_mode {
        InputMode::Normal => theme::ACCENT,
        InputMode::Command | InputMode::Editing => theme::GREEN,
        InputMode::Search => theme::YELLOW,
        InputMode::Confirm => theme::RED,
    };
    let mode_style = Style::default()
        .fg(theme::HEADER_BG)
        .bg(mode_bg)
        .add_modifier(Modifier::BOLD);

    let mut info = format!(
        " {} | {} rows | {}",
        ledger.location(),
        ledger.sales().len(),
        date_range_label(app, ledger)
    );
    if !app.pending_edits.is_empty() {
        info.push_str(&format!(" | {} unsaved", app.pending_edits.len()));
    }

    let right = match app.screen {
        Screen::Home => " /search | :set | :save | ? help ",
        Screen::Channels => " n/p channel | :support :metric | ? help ",
        Screen::Items => " j/k item | :item | ? help ",
        Screen::NewEntry => " i item | a/r toggle | :submit | ? help ",
    };

    let available = area.width as usize;
    let used = mode_label.len() + info.chars().count() + right.len();
    let pad = available.saturating_sub(used);

    let bar = Paragraph::new(Line::from(vec![
        Span::styled(mode_label, mode_style),
        Span::styled(info, theme::status_bar_style()),
        Span::styled(" ".repeat(pad), theme::status_bar_style()),
        Span::styled(right, theme::status_bar_style()),
    ]));
    f.render_widget(bar, area);
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App, ledger: &Ledger) {
    let (content, cursor_offset) = match app.input_mode {
        InputMode::Command => (
            Line::from(vec![
                Span::styled(":", Style::default().fg(theme::ACCENT)),
                Span::styled(app.command_input.as_str(), theme::command_bar_style()),
            ]),
            Some(1 + app.command_input.chars().count() as u16),
        ),
        InputMode::Search => {
            let matches = app.home_rows(ledger).len();
            (
                Line::from(vec![
                    Span::styled("/", Style::default().fg(theme::YELLOW)),
                    Span::styled(app.search_input.as_str(), theme::command_bar_style()),
                    Span::styled(format!("  ({matches} matches)"), theme::dim_style()),
                ]),
                Some(1 + app.search_input.chars().count() as u16),
            )
        }
        InputMode::Editing => (
            Line::from(vec![
                Span::styled("item> ", Style::default().fg(theme::GREEN)),
                Span::styled(app.command_input.as_str(), theme::command_bar_style()),
            ]),
            Some(6 + app.command_input.chars().count() as u16),
        ),
        InputMode::Confirm => (
            Line::from(vec![
                Span::styled(
                    app.confirm_message.as_str(),
                    Style::default().fg(theme::YELLOW),
                ),
                Span::styled(" [y/N] ", Style::default().fg(theme::RED)),
            ]),
            None,
        ),
        InputMode::Normal => {
            let line = if app.status_message.is_empty() {
                Line::from(Span::styled(
                    " Press : for commands, / to search, ? for help",
                    theme::dim_style(),
                ))
            } else {
                Line::from(Span::styled(
                    app.status_message.as_str(),
                    theme::command_bar_style(),
                ))
            };
            (line, None)
        }
    };

    let bar = Paragraph::new(content).style(Style::default().bg(theme::COMMAND_BG));
    f.render_widget(bar, area);

    if let Some(offset) = cursor_offset {
        f.set_cursor_position((area.x + offset, area.y));
    }
}

fn help_section(title: &str) -> Line<'static> {
    Line::from(Span::styled(format!(" {title}"), theme::section_style()))
}

fn help_line(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(text, theme::normal_style()))
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let mut help_text = vec![
        Line::from(Span::styled(
            " ShopTUI Help ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        help_section("Navigation"),
        help_line("  j/k or Up/Down   Move cursor           1-4        Switch screens"),
        help_line("  Tab/Shift-Tab    Cycle screens         g/G        Top/Bottom"),
        help_line("  Ctrl-d/u         Page Down/Up          Ctrl-q     Quit"),
        Line::from(""),
        help_section("Screens"),
        help_line("  e (Home)         Edit selected row     n/p (Channels) Cycle channel"),
        help_line("  i (New Entry)    Type an item          a/r (New Entry) Toggle ad/rent"),
        help_line("  Tab (item>)      Complete suggestion   Backspace (New Entry) Undo item"),
        Line::from(""),
        help_section("Commands"),
    ];

    // Single-letter aliases are left out
    let mut cmd_lines: Vec<(&str, &str)> = commands::COMMANDS
        .iter()
        .filter(|(name, _)| name.len() > 1)
        .map(|(&name, cmd)| (name, cmd.description))
        .collect();
    cmd_lines.sort_by_key(|(name, _)| *name);
    for (name, desc) in &cmd_lines {
        help_text.push(Line::from(Span::styled(
            format!("  :{name:<14} {desc}"),
            theme::normal_style(),
        )));
    }

    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        " Press any key to close ",
        Style::default().fg(theme::TEXT_DIM),
    )));

    let popup_height = (help_text.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup_width = 84.min(area.width.saturating_sub(4));
    let x = area.x + area.width.saturating_sub(popup_width) / 2;
    let y = area.y + area.height.saturating_sub(popup_height) / 2;
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
