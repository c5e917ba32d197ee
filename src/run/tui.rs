use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::{error, info};

use crate::analytics;
use crate::config::Settings;
use crate::filter::ChannelFilter;
use crate::store::Ledger;
use crate::ui::app::{App, InputMode, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(ledger: &mut Ledger, settings: &Settings) -> Result<()> {
    let mut app = App::new(
        ledger,
        settings.basket_params_or_default(),
        &settings.default_channel,
    );
    info!(rows = ledger.sales().len(), store = %ledger.location(), "Starting dashboard");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, ledger);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        error!(error = %format!("{e:#}"), "Dashboard exited with an error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    ledger: &mut Ledger,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // tab + status + command bars, table borders and header
            app.visible_rows = (f.area().height.saturating_sub(6) as usize).max(1);
            crate::ui::render::render(f, app, ledger);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, ledger),
                InputMode::Command => handle_command_input(key, app, ledger),
                InputMode::Search => handle_search_input(key, app, ledger),
                InputMode::Editing => handle_item_input(key, app, ledger),
                InputMode::Confirm => handle_confirm_input(key, app, ledger),
            }
        }
    }
    Ok(())
}

/// Store and command failures land in the status bar; the dashboard keeps running.
fn run_command(input: &str, app: &mut App, ledger: &mut Ledger) {
    if let Err(e) = commands::handle_command(input, app, ledger) {
        report(app, e);
    }
}

fn report(app: &mut App, e: anyhow::Error) {
    error!(error = %format!("{e:#}"), "Action failed");
    app.set_status(format!("Error: {e:#}"));
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: KeyEvent, app: &mut App, ledger: &mut Ledger) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => app.running = false,
        KeyCode::Char('d') if ctrl => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_down(app, ledger);
            }
        }
        KeyCode::Char('u') if ctrl => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.screen = Screen::Home;
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app, ledger),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app, ledger),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            if let Some(screen) = Screen::all().get(index) {
                app.screen = *screen;
            }
        }
        KeyCode::Tab => cycle_screen(app, 1),
        KeyCode::BackTab => cycle_screen(app, -1),
        KeyCode::Esc => {
            app.status_message.clear();
            if app.screen == Screen::Home && app.filter.search.is_some() {
                commands::apply_search(app, ledger, "");
            }
        }
        KeyCode::Char('e') if app.screen == Screen::Home => {
            if let Some((position, sale)) = app.selected_sale(ledger) {
                let current = app.display_row(position, sale).item_text.clone();
                app.command_input = format!("set item {current}");
                app.input_mode = InputMode::Command;
            }
        }
        KeyCode::Char('n') if app.screen == Screen::Channels => cycle_channel(app, ledger, 1),
        KeyCode::Char('p') if app.screen == Screen::Channels => cycle_channel(app, ledger, -1),
        KeyCode::Char('i') if app.screen == Screen::NewEntry => {
            app.input_mode = InputMode::Editing;
            app.command_input.clear();
        }
        KeyCode::Char('a') if app.screen == Screen::NewEntry => {
            app.draft.ad = !app.draft.ad;
        }
        KeyCode::Char('r') if app.screen == Screen::NewEntry => {
            app.draft.rent = !app.draft.rent;
        }
        KeyCode::Backspace if app.screen == Screen::NewEntry => run_command("undo", app, ledger),
        KeyCode::Enter if app.screen == Screen::NewEntry => run_command("submit", app, ledger),
        _ => {}
    }
}

fn handle_command_input(key: KeyEvent, app: &mut App, ledger: &mut Ledger) {
    match key.code {
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.command_input);
            app.input_mode = InputMode::Normal;
            run_command(&input, app, ledger);
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
        KeyCode::Char(c) => app.command_input.push(c),
        _ => {}
    }
}

fn handle_search_input(key: KeyEvent, app: &mut App, ledger: &mut Ledger) {
    match key.code {
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            commands::apply_search(app, ledger, "");
        }
        KeyCode::Backspace => {
            let mut query = app.search_input.clone();
            query.pop();
            commands::apply_search(app, ledger, &query);
        }
        KeyCode::Char(c) => {
            let query = format!("{}{c}", app.search_input);
            commands::apply_search(app, ledger, &query);
        }
        _ => {}
    }
}

/// The `item>` prompt on New Entry. Stays open so several items can be added.
fn handle_item_input(key: KeyEvent, app: &mut App, ledger: &mut Ledger) {
    match key.code {
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.command_input);
            if input.trim().is_empty() {
                app.input_mode = InputMode::Normal;
                return;
            }
            match app.draft.add_item_text(&input) {
                Ok(()) => app.set_status(format!("Items: {}", app.draft.entries_text())),
                Err(e) => app.set_status(format!("{e}")),
            }
        }
        KeyCode::Tab => {
            if let Some(name) = app.item_suggestions(ledger).into_iter().next() {
                let qty = app
                    .command_input
                    .trim_start()
                    .split_once(' ')
                    .map(|(q, _)| q.to_string())
                    .filter(|q| q.parse::<u32>().is_ok());
                app.command_input = match qty {
                    Some(q) => format!("{q} {name}"),
                    None => name,
                };
            }
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
        }
        KeyCode::Char(c) => app.command_input.push(c),
        _ => {}
    }
}

fn handle_confirm_input(key: KeyEvent, app: &mut App, ledger: &mut Ledger) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Err(e) = commands::confirm_pending(app, ledger) {
                report(app, e);
            }
        }
        _ => commands::cancel_pending(app),
    }
}

// ── Navigation helpers ───────────────────────────────────────

fn cycle_screen(app: &mut App, step: isize) {
    let screens = Screen::all();
    let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
    let next = (idx as isize + step).rem_euclid(screens.len() as isize) as usize;
    app.screen = screens[next];
}

/// Step through `All` followed by each known channel.
fn cycle_channel(app: &mut App, ledger: &Ledger, step: isize) {
    let mut options = vec![ChannelFilter::All];
    options.extend(
        analytics::channels(ledger.sales())
            .into_iter()
            .map(ChannelFilter::Only),
    );
    let idx = options
        .iter()
        .position(|c| *c == app.filter.channel)
        .unwrap_or(0);
    let next = (idx as isize + step).rem_euclid(options.len() as isize) as usize;
    app.filter.channel = options[next].clone();
    app.set_status(format!("Channel: {}", app.filter.channel));
}

fn handle_move_down(app: &mut App, ledger: &Ledger) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Home => {
            let len = app.home_rows(ledger).len();
            scroll_down(&mut app.row_index, &mut app.row_scroll, len, page);
        }
        Screen::Items => {
            let len = app.item_choices(ledger).len();
            scroll_down(&mut app.item_index, &mut app.item_scroll, len, page);
        }
        _ => {}
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Home => scroll_up(&mut app.row_index, &mut app.row_scroll),
        Screen::Items => scroll_up(&mut app.item_index, &mut app.item_scroll),
        _ => {}
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Home => scroll_to_top(&mut app.row_index, &mut app.row_scroll),
        Screen::Items => scroll_to_top(&mut app.item_index, &mut app.item_scroll),
        _ => {}
    }
}

fn handle_goto_bottom(app: &mut App, ledger: &Ledger) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Home => {
            let len = app.home_rows(ledger).len();
            scroll_to_bottom(&mut app.row_index, &mut app.row_scroll, len, page);
        }
        Screen::Items => {
            let len = app.item_choices(ledger).len();
            scroll_to_bottom(&mut app.item_index, &mut app.item_scroll, len, page);
        }
        _ => {}
    }
}
