use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use tracing::info;

use super::app::{App, InputMode, PendingAction, Screen};
use crate::analytics;
use crate::basket::{BasketError, RuleMetric};
use crate::entry::SaleField;
use crate::filter::{ChannelFilter, Search};
use crate::models::{normalize_name, Sale};
use crate::sheet::{parse_date, SheetFile};
use crate::store::Ledger;
use crate::ui::util::format_amount;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Ledger) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit ShopTUI", cmd_quit, r);
    register_command!("quit", "Quit ShopTUI", cmd_quit, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("home", "Go to Home", cmd_home, r);
    register_command!("channels", "Go to Channels", cmd_channels, r);
    register_command!("items", "Go to Items", cmd_items, r);
    register_command!("new", "Go to New Entry", cmd_new, r);
    register_command!(
        "from",
        "Set start date (e.g. :from 2024-01-01, blank clears)",
        cmd_from,
        r
    );
    register_command!(
        "to",
        "Set end date (e.g. :to 2024-03-31, blank clears)",
        cmd_to,
        r
    );
    register_command!(
        "channel",
        "Filter Channels (e.g. :channel ETSY, :channel all)",
        cmd_channel,
        r
    );
    register_command!("c", "Filter Channels (e.g. :c ETSY)", cmd_channel, r);
    register_command!("item", "Pick an item on Items (e.g. :item mug)", cmd_item, r);
    register_command!("i", "Pick an item on Items (e.g. :i mug)", cmd_item, r);
    register_command!(
        "search",
        "Search item lists, regex allowed (e.g. :search mug|tee)",
        cmd_search,
        r
    );
    register_command!("s", "Search item lists (e.g. :s mug)", cmd_search, r);
    register_command!(
        "rows",
        "Limit Home rows (e.g. :rows 20, :rows all)",
        cmd_rows,
        r
    );
    register_command!(
        "set",
        "Edit selected row, or the draft on New Entry (e.g. :set channel ETSY)",
        cmd_set,
        r
    );
    register_command!("save", "Save edited rows to the store", cmd_save, r);
    register_command!("discard", "Drop unsaved row edits", cmd_discard, r);
    register_command!("reload", "Reload the ledger from the store", cmd_reload, r);
    register_command!("add", "Add a draft item (e.g. :add 2 mug)", cmd_add, r);
    register_command!("a", "Add a draft item (e.g. :a mug)", cmd_add, r);
    register_command!("undo", "Remove the last draft item", cmd_undo, r);
    register_command!("clear-items", "Remove all draft items", cmd_clear_items, r);
    register_command!("submit", "Append the draft as a new sale", cmd_submit, r);
    register_command!("reset", "Start a fresh draft", cmd_reset, r);
    register_command!(
        "support",
        "Basket min support in (0, 1] (e.g. :support 0.2)",
        cmd_support,
        r
    );
    register_command!(
        "metric",
        "Rule metric: support, confidence, lift, leverage, conviction",
        cmd_metric,
        r
    );
    register_command!(
        "threshold",
        "Rule min threshold (e.g. :threshold 1.2)",
        cmd_threshold,
        r
    );
    register_command!(
        "export",
        "Export Home rows to CSV (e.g. :export ~/sales.csv)",
        cmd_export,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let (cmd_name, args) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    let args = args.trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, ledger)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1)
        .min_by_key(|k| (edit_distance(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitute = diagonal + usize::from(ca != *cb);
            diagonal = row[j + 1];
            row[j + 1] = substitute.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[b.len()]
}

/// Run the action waiting on a `y` in confirm mode.
pub(crate) fn confirm_pending(app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    let Some(action) = app.pending_action.take() else {
        return Ok(());
    };
    app.input_mode = InputMode::Normal;
    app.confirm_message.clear();

    match action {
        PendingAction::SaveEdits { .. } => {
            let saved = ledger.apply_edits(&app.pending_edits)?;
            app.pending_edits.clear();
            app.clamp_cursors(ledger);
            app.set_status(format!("Saved {saved} edited row(s) to {}", ledger.location()));
        }
        PendingAction::SubmitEntry { job_id } => {
            let sale = app.draft.build()?;
            ledger.append(sale.clone())?;
            app.last_entry = Some(sale);
            app.reset_draft(ledger);
            app.clamp_cursors(ledger);
            app.set_status(format!("New entry added: job #{job_id}"));
        }
        PendingAction::Reload => reload(app, ledger)?,
    }
    Ok(())
}

pub(crate) fn cancel_pending(app: &mut App) {
    app.pending_action = None;
    app.input_mode = InputMode::Normal;
    app.confirm_message.clear();
    app.set_status("Cancelled");
}

fn ask(app: &mut App, action: PendingAction, message: String) {
    app.confirm_message = message;
    app.pending_action = Some(action);
    app.input_mode = InputMode::Confirm;
}

fn reload(app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    ledger.reload()?;
    app.pending_edits.clear();
    app.reset_draft(ledger);
    app.clamp_cursors(ledger);
    info!(rows = ledger.sales().len(), "Reloaded ledger");
    app.set_status(format!(
        "Data updated: {} rows from {}",
        ledger.sales().len(),
        ledger.location()
    ));
    Ok(())
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_home(_args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    app.screen = Screen::Home;
    Ok(())
}

fn cmd_channels(_args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    app.screen = Screen::Channels;
    Ok(())
}

fn cmd_items(_args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    app.screen = Screen::Items;
    Ok(())
}

fn cmd_new(_args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    app.screen = Screen::NewEntry;
    Ok(())
}

fn cmd_from(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    if args.is_empty() {
        app.filter.start = None;
        app.clamp_cursors(ledger);
        app.set_status("Start date cleared");
        return Ok(());
    }
    let Ok(date) = parse_date(args) else {
        app.set_status(format!("Invalid date: {args}. Use YYYY-MM-DD"));
        return Ok(());
    };
    if app.filter.end.is_some_and(|end| date > end) {
        app.set_status("Start date is after the end date");
        return Ok(());
    }
    app.filter.start = Some(date);
    app.clamp_cursors(ledger);
    app.set_status(format!("From {date}"));
    Ok(())
}

fn cmd_to(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    if args.is_empty() {
        app.filter.end = None;
        app.clamp_cursors(ledger);
        app.set_status("End date cleared");
        return Ok(());
    }
    let Ok(date) = parse_date(args) else {
        app.set_status(format!("Invalid date: {args}. Use YYYY-MM-DD"));
        return Ok(());
    };
    if app.filter.start.is_some_and(|start| date < start) {
        app.set_status("End date is before the start date");
        return Ok(());
    }
    app.filter.end = Some(date);
    app.clamp_cursors(ledger);
    app.set_status(format!("To {date}"));
    Ok(())
}

fn cmd_channel(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    let channel = ChannelFilter::parse(args);
    if let ChannelFilter::Only(name) = &channel {
        let known = analytics::channels(ledger.sales());
        if !known.contains(name) {
            app.set_status(format!(
                "Unknown channel: {name}. Available: {}",
                known.join(", ")
            ));
            return Ok(());
        }
    }
    app.set_status(format!("Channel: {channel}"));
    app.filter.channel = channel;
    app.screen = Screen::Channels;
    Ok(())
}

fn cmd_item(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :item <name>");
        return Ok(());
    }
    let name = normalize_name(args);
    match app.item_choices(ledger).iter().position(|i| *i == name) {
        Some(index) => {
            app.item_index = index;
            app.item_scroll = app.item_scroll.min(index);
            app.screen = Screen::Items;
            app.set_status(format!("Item: {name}"));
        }
        None => app.set_status(format!("No sales of '{name}' in the selected dates")),
    }
    Ok(())
}

fn cmd_search(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    apply_search(app, ledger, args);
    app.screen = Screen::Home;
    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        app.set_status(format!("Searching: {args}"));
    }
    Ok(())
}

/// Shared by `:search` and the live `/` prompt.
pub(crate) fn apply_search(app: &mut App, ledger: &Ledger, query: &str) {
    app.search_input = query.to_string();
    app.filter.search = (!query.is_empty()).then(|| Search::new(query));
    app.row_index = 0;
    app.row_scroll = 0;
    app.clamp_cursors(ledger);
}

fn cmd_rows(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    if args.is_empty() || args.eq_ignore_ascii_case("all") {
        app.row_limit = None;
        app.set_status("Showing all rows");
    } else {
        match args.parse::<usize>() {
            Ok(n) if n > 0 => {
                app.row_limit = Some(n);
                app.set_status(format!("Showing up to {n} rows"));
            }
            _ => {
                app.set_status(format!("Invalid row count: {args}"));
                return Ok(());
            }
        }
    }
    app.clamp_cursors(ledger);
    Ok(())
}

fn cmd_set(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    let Some((field, value)) = args.split_once(' ') else {
        let fields: Vec<&str> = SaleField::all().iter().map(|f| f.as_str()).collect();
        app.set_status(format!("Usage: :set <field> <value>. Fields: {}", fields.join(", ")));
        return Ok(());
    };
    let field: SaleField = match field.parse() {
        Ok(f) => f,
        Err(e) => {
            app.set_status(format!("{e}"));
            return Ok(());
        }
    };
    let value = value.trim();

    match app.screen {
        Screen::NewEntry => match app.draft.set(field, value) {
            Ok(()) => app.set_status(format!("Draft {field}: {value}")),
            Err(e) => app.set_status(format!("{e}")),
        },
        Screen::Home => match app.edit_selected(ledger, field, value) {
            Ok(Some(job_id)) => app.set_status(format!(
                "Job #{job_id}: {field} = {value} ({} unsaved, :save to write)",
                app.pending_edits.len()
            )),
            Ok(None) => app.set_status("No row selected"),
            Err(e) => app.set_status(format!("{e}")),
        },
        _ => app.set_status("Select a row on Home, or fill the draft on New Entry"),
    }
    Ok(())
}

fn cmd_save(_args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    let count = app.pending_edits.len();
    if count == 0 {
        app.set_status("No unsaved edits");
        return Ok(());
    }
    let message = format!("Save {count} edited row(s) to {}?", ledger.location());
    ask(app, PendingAction::SaveEdits { count }, message);
    Ok(())
}

fn cmd_discard(_args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    let count = app.pending_edits.len();
    app.pending_edits.clear();
    app.set_status(format!("Discarded {count} unsaved edit(s)"));
    Ok(())
}

fn cmd_reload(_args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    if app.pending_edits.is_empty() {
        return reload(app, ledger);
    }
    let message = format!(
        "Discard {} unsaved edit(s) and reload?",
        app.pending_edits.len()
    );
    ask(app, PendingAction::Reload, message);
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    app.screen = Screen::NewEntry;
    if args.is_empty() {
        app.set_status("Usage: :add [qty] <name>");
        return Ok(());
    }
    match app.draft.add_item_text(args) {
        Ok(()) => app.set_status(format!("Items: {}", app.draft.entries_text())),
        Err(e) => app.set_status(format!("{e}")),
    }
    Ok(())
}

fn cmd_undo(_args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    match app.draft.remove_last_item() {
        Some(entry) => app.set_status(format!("Removed {} {}", entry.quantity, entry.name)),
        None => app.set_status("No items to remove"),
    }
    Ok(())
}

fn cmd_clear_items(_args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    app.draft.clear_items();
    app.set_status("Items cleared");
    Ok(())
}

fn cmd_submit(_args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    app.screen = Screen::NewEntry;
    match app.draft.build() {
        Ok(sale) => {
            let message = format!(
                "Add job #{} ({}, {})?",
                sale.job_id,
                sale.channel,
                format_amount(sale.total_amount)
            );
            ask(app, PendingAction::SubmitEntry { job_id: sale.job_id }, message);
        }
        Err(e) => app.set_status(format!("Cannot submit: {e}")),
    }
    Ok(())
}

fn cmd_reset(_args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    app.reset_draft(ledger);
    app.screen = Screen::NewEntry;
    app.set_status(format!("New draft: job #{}", app.draft.job_id));
    Ok(())
}

fn cmd_support(args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    match args.parse::<f64>() {
        Ok(v) if v > 0.0 && v <= 1.0 => {
            app.basket_params.min_support = v;
            app.set_status(format!("Min support: {v}"));
        }
        Ok(v) => app.set_status(format!("{}", BasketError::InvalidSupport(v))),
        Err(_) => app.set_status(format!("Invalid number: {args}")),
    }
    Ok(())
}

fn cmd_metric(args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    match args.parse::<RuleMetric>() {
        Ok(metric) => {
            app.basket_params.metric = metric;
            app.set_status(format!("Rule metric: {metric}"));
        }
        Err(e) => app.set_status(format!("{e}")),
    }
    Ok(())
}

fn cmd_threshold(args: &str, app: &mut App, _ledger: &mut Ledger) -> anyhow::Result<()> {
    match args.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            app.basket_params.min_threshold = v;
            app.set_status(format!("Min threshold: {v}"));
        }
        _ => app.set_status(format!("Invalid number: {args}")),
    }
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, ledger: &mut Ledger) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/shoptui-export.csv")
    } else {
        crate::run::shellexpand(args)
    };

    let rows: Vec<Sale> = app
        .home_rows(ledger)
        .into_iter()
        .map(|(position, s)| app.display_row(position, s).clone())
        .collect();
    if rows.is_empty() {
        app.set_status("No rows to export");
        return Ok(());
    }
    SheetFile::new(Path::new(&path)).write(&rows)?;
    app.set_status(format!("Exported {} rows to {path}", rows.len()));
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
