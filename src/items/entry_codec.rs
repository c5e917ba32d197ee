use thiserror::Error;

use crate::models::ItemEntry;

/// Separator between "qty name" segments.
pub const SEGMENT_DELIMITER: &str = ", ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryParseError {
    #[error("invalid quantity in {segment:?}")]
    BadQuantity { segment: String },
    #[error("zero quantity in {segment:?}")]
    ZeroQuantity { segment: String },
    #[error("missing item name in {segment:?}")]
    MissingName { segment: String },
}

impl EntryParseError {
    pub fn segment(&self) -> &str {
        match self {
            Self::BadQuantity { segment }
            | Self::ZeroQuantity { segment }
            | Self::MissingName { segment } => segment,
        }
    }
}

/// Result of decoding an item-entry field. Well-formed segments land in
/// `entries` in text order, malformed ones in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDecode {
    pub entries: Vec<ItemEntry>,
    pub errors: Vec<EntryParseError>,
}

/// Parse a single `<integer> <name>` segment.
pub fn parse_entry(segment: &str) -> Result<ItemEntry, EntryParseError> {
    let trimmed = segment.trim();
    let (qty, name) = trimmed.split_once(' ').unwrap_or((trimmed, ""));

    let quantity: u32 = qty.parse().map_err(|_| EntryParseError::BadQuantity {
        segment: segment.to_string(),
    })?;
    if quantity == 0 {
        return Err(EntryParseError::ZeroQuantity {
            segment: segment.to_string(),
        });
    }
    if name.trim().is_empty() {
        return Err(EntryParseError::MissingName {
            segment: segment.to_string(),
        });
    }

    Ok(ItemEntry::new(name, quantity))
}

/// Decode "3 widget, 1 gadget" into entries. Empty segments are ignored and
/// malformed ones skipped; this never fails as a whole.
pub fn decode_entries(text: &str) -> EntryDecode {
    let mut decoded = EntryDecode::default();
    for segment in text.split(SEGMENT_DELIMITER) {
        if segment.trim().is_empty() {
            continue;
        }
        match parse_entry(segment) {
            Ok(entry) => decoded.entries.push(entry),
            Err(e) => decoded.errors.push(e),
        }
    }
    decoded
}

pub fn encode_entries(entries: &[ItemEntry]) -> String {
    entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(SEGMENT_DELIMITER)
}

#[cfg(test)]
#[path = "entry_codec_tests.rs"]
mod tests;
