/// A quantity of one named item within a sale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemEntry {
    pub name: String,
    pub quantity: u32,
}

impl ItemEntry {
    /// Build an entry with a normalised (trimmed, lowercased) name.
    pub fn new(name: &str, quantity: u32) -> Self {
        Self {
            name: normalize_name(name),
            quantity,
        }
    }
}

impl std::fmt::Display for ItemEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.quantity, self.name)
    }
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
