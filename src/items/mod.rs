mod aggregate;
mod entry_codec;
mod list_codec;

pub(crate) use aggregate::{sum_item_amounts, ItemTotals};
pub(crate) use entry_codec::{
    decode_entries, encode_entries, parse_entry, EntryDecode, EntryParseError,
};
pub(crate) use list_codec::{decode_item_list, encode_item_list};
