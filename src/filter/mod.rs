use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};

use crate::models::Sale;

/// Channel predicate. `All` is the wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum ChannelFilter {
    #[default]
    All,
    Only(String),
}

impl ChannelFilter {
    /// `all` (any case) and `*` mean no filter; anything else is taken verbatim.
    pub(crate) fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "*" || trimmed.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(trimmed.to_string())
        }
    }

    pub(crate) fn matches(&self, sale: &Sale) -> bool {
        match self {
            Self::All => true,
            Self::Only(channel) => sale.channel == *channel,
        }
    }
}

impl std::fmt::Display for ChannelFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Only(c) => write!(f, "{c}"),
        }
    }
}

/// Case-insensitive search over a sale's item list text.
#[derive(Debug, Clone)]
pub(crate) struct Search {
    query: String,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    Literal(String),
}

impl Search {
    /// Compile `query` as a regex; invalid patterns fall back to a literal match.
    pub(crate) fn new(query: &str) -> Self {
        let matcher = match RegexBuilder::new(query).case_insensitive(true).build() {
            Ok(re) => Matcher::Regex(re),
            Err(_) => Matcher::Literal(query.to_lowercase()),
        };
        Self {
            query: query.to_string(),
            matcher,
        }
    }

    pub(crate) fn query(&self) -> &str {
        &self.query
    }

    pub(crate) fn matches(&self, sale: &Sale) -> bool {
        match &self.matcher {
            Matcher::Regex(re) => re.is_match(&sale.items_text),
            Matcher::Literal(needle) => sale.items_text.to_lowercase().contains(needle.as_str()),
        }
    }
}

pub(crate) fn by_date_range<'a>(
    rows: impl IntoIterator<Item = &'a Sale>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<&'a Sale> {
    rows.into_iter()
        .filter(|s| s.date >= start && s.date <= end)
        .collect()
}

pub(crate) fn by_channel<'a>(
    rows: impl IntoIterator<Item = &'a Sale>,
    channel: &ChannelFilter,
) -> Vec<&'a Sale> {
    rows.into_iter().filter(|s| channel.matches(s)).collect()
}

pub(crate) fn by_search<'a>(
    rows: impl IntoIterator<Item = &'a Sale>,
    search: &Search,
) -> Vec<&'a Sale> {
    rows.into_iter().filter(|s| search.matches(s)).collect()
}

/// Outcome of filtering. `Empty` is the explicit "no data" signal, distinct
/// from a selection whose aggregates happen to be zero.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Selection<'a> {
    Empty,
    Rows(Vec<&'a Sale>),
}

impl<'a> Selection<'a> {
    pub(crate) fn from_rows(rows: Vec<&'a Sale>) -> Self {
        if rows.is_empty() {
            Self::Empty
        } else {
            Self::Rows(rows)
        }
    }

    pub(crate) fn rows(&self) -> &[&'a Sale] {
        match self {
            Self::Empty => &[],
            Self::Rows(rows) => rows,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub(crate) fn len(&self) -> usize {
        self.rows().len()
    }
}

/// Combined predicates applied by the dashboard and CLI.
#[derive(Debug, Clone, Default)]
pub(crate) struct SaleFilter {
    pub(crate) start: Option<NaiveDate>,
    pub(crate) end: Option<NaiveDate>,
    pub(crate) channel: ChannelFilter,
    pub(crate) search: Option<Search>,
}

impl SaleFilter {
    pub(crate) fn apply<'a>(&self, rows: impl IntoIterator<Item = &'a Sale>) -> Selection<'a> {
        let mut rows: Vec<&'a Sale> = rows.into_iter().collect();
        if self.start.is_some() || self.end.is_some() {
            rows = by_date_range(
                rows,
                self.start.unwrap_or(NaiveDate::MIN),
                self.end.unwrap_or(NaiveDate::MAX),
            );
        }
        rows = by_channel(rows, &self.channel);
        if let Some(search) = &self.search {
            rows = by_search(rows, search);
        }
        Selection::from_rows(rows)
    }

    /// Like [`SaleFilter::apply`], keeping each row's position in `rows`.
    /// Positions identify a row even when job numbers repeat.
    pub(crate) fn apply_indexed<'a>(&self, rows: &'a [Sale]) -> Vec<(usize, &'a Sale)> {
        rows.iter()
            .enumerate()
            .filter(|(_, sale)| self.matches(sale))
            .collect()
    }

    fn matches(&self, sale: &Sale) -> bool {
        self.start.map_or(true, |d| sale.date >= d)
            && self.end.map_or(true, |d| sale.date <= d)
            && self.channel.matches(sale)
            && self.search.as_ref().map_or(true, |s| s.matches(sale))
    }

    /// Same predicates with the channel reset to the wildcard.
    pub(crate) fn without_channel(&self) -> Self {
        Self {
            channel: ChannelFilter::All,
            ..self.clone()
        }
    }
}

/// First and last sale date, if any.
pub(crate) fn date_bounds(rows: &[Sale]) -> Option<(NaiveDate, NaiveDate)> {
    let min = rows.iter().map(|s| s.date).min()?;
    let max = rows.iter().map(|s| s.date).max()?;
    Some((min, max))
}

#[cfg(test)]
mod tests;
