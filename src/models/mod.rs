mod item_entry;
mod sale;

pub use item_entry::{normalize_name, ItemEntry};
pub use sale::{flag_code, parse_flag, Sale};

#[cfg(test)]
mod tests;
