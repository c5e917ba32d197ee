use std::collections::BTreeMap;

use chrono::Local;

use crate::analytics;
use crate::basket::BasketParams;
use crate::entry::{apply_edit, EntryDraft, EntryError, SaleField};
use crate::filter::{ChannelFilter, SaleFilter};
use crate::models::Sale;
use crate::store::Ledger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Home,
    Channels,
    Items,
    NewEntry,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Home, Self::Channels, Self::Items, Self::NewEntry]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "Home"),
            Self::Channels => write!(f, "Channels"),
            Self::Items => write!(f, "Items"),
            Self::NewEntry => write!(f, "New Entry"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Editing => write!(f, "ITEM"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingAction {
    SaveEdits { count: usize },
    SubmitEntry { job_id: i64 },
    /// Reload from the store, dropping unsaved edits.
    Reload,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    /// Date range, channel and search. Each screen uses the parts it needs.
    pub(crate) filter: SaleFilter,

    // Home
    pub(crate) row_limit: Option<usize>,
    pub(crate) row_index: usize,
    pub(crate) row_scroll: usize,
    /// Edited copies keyed by the row's position in the ledger.
    pub(crate) pending_edits: BTreeMap<usize, Sale>,

    // Channels
    pub(crate) basket_params: BasketParams,

    // Items
    pub(crate) item_index: usize,
    pub(crate) item_scroll: usize,

    // New entry
    pub(crate) draft: EntryDraft,
    pub(crate) default_channel: String,
    pub(crate) last_entry: Option<Sale>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(ledger: &Ledger, basket_params: BasketParams, default_channel: &str) -> Self {
        Self {
            running: true,
            screen: Screen::Home,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            status_message: String::new(),
            show_help: false,

            filter: SaleFilter::default(),

            row_limit: None,
            row_index: 0,
            row_scroll: 0,
            pending_edits: BTreeMap::new(),

            basket_params,

            item_index: 0,
            item_scroll: 0,

            draft: EntryDraft::new(ledger.sales(), Local::now().date_naive(), default_channel),
            default_channel: default_channel.to_string(),
            last_entry: None,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    /// Home ignores the channel; its search narrows by item list.
    pub(crate) fn home_filter(&self) -> SaleFilter {
        self.filter.without_channel()
    }

    /// Channels ignores the Home search.
    pub(crate) fn channel_filter(&self) -> SaleFilter {
        SaleFilter {
            search: None,
            ..self.filter.clone()
        }
    }

    pub(crate) fn date_filter(&self) -> SaleFilter {
        SaleFilter {
            channel: ChannelFilter::All,
            search: None,
            ..self.filter.clone()
        }
    }

    /// Rows shown on Home with their ledger positions: the filtered ledger
    /// cut to the row limit.
    pub(crate) fn home_rows<'a>(&self, ledger: &'a Ledger) -> Vec<(usize, &'a Sale)> {
        let mut rows = self.home_filter().apply_indexed(ledger.sales());
        if let Some(limit) = self.row_limit {
            rows.truncate(limit.max(1));
        }
        rows
    }

    /// The row at `position` as it will be saved: its pending edit if there is one.
    pub(crate) fn display_row<'a>(&'a self, position: usize, sale: &'a Sale) -> &'a Sale {
        self.pending_edits.get(&position).unwrap_or(sale)
    }

    pub(crate) fn selected_sale<'a>(&self, ledger: &'a Ledger) -> Option<(usize, &'a Sale)> {
        self.home_rows(ledger).get(self.row_index).copied()
    }

    /// Edit one field of the selected Home row. Returns the edited job id,
    /// or `None` when nothing is selected.
    pub(crate) fn edit_selected(
        &mut self,
        ledger: &Ledger,
        field: SaleField,
        value: &str,
    ) -> Result<Option<i64>, EntryError> {
        let Some((position, original)) = self.selected_sale(ledger) else {
            return Ok(None);
        };
        let mut edited = self.display_row(position, original).clone();
        apply_edit(&mut edited, field, value)?;
        let job_id = edited.job_id;
        self.pending_edits.insert(position, edited);
        Ok(Some(job_id))
    }

    /// Distinct item names within the date range, for the Items picker.
    pub(crate) fn item_choices(&self, ledger: &Ledger) -> Vec<String> {
        let selection = self.date_filter().apply(ledger.sales());
        analytics::unique_items(selection.rows())
    }

    pub(crate) fn selected_item(&self, ledger: &Ledger) -> Option<String> {
        self.item_choices(ledger).into_iter().nth(self.item_index)
    }

    /// Known item names starting with what is typed in the item prompt.
    pub(crate) fn item_suggestions(&self, ledger: &Ledger) -> Vec<String> {
        let typed = self.command_input.trim().to_lowercase();
        let prefix = match typed.split_once(' ') {
            Some((qty, rest)) if qty.parse::<u32>().is_ok() => rest.trim_start(),
            _ => typed.as_str(),
        };
        let all: Vec<&Sale> = ledger.sales().iter().collect();
        analytics::unique_items(&all)
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .take(8)
            .collect()
    }

    pub(crate) fn reset_draft(&mut self, ledger: &Ledger) {
        self.draft = EntryDraft::new(
            ledger.sales(),
            Local::now().date_naive(),
            &self.default_channel,
        );
    }

    /// Keep cursors inside their lists after the data or filters change.
    pub(crate) fn clamp_cursors(&mut self, ledger: &Ledger) {
        let rows = self.home_rows(ledger).len();
        if self.row_index >= rows {
            self.row_index = rows.saturating_sub(1);
        }
        self.row_scroll = self.row_scroll.min(self.row_index);

        let items = self.item_choices(ledger).len();
        if self.item_index >= items {
            self.item_index = items.saturating_sub(1);
        }
        self.item_scroll = self.item_scroll.min(self.item_index);
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
