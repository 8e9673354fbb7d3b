//! Pantry items and the snapshot search filter.

use serde::{Deserialize, Serialize};

use super::name::ItemName;

/// A named, quantity-counted pantry entry.
///
/// The name uniquely identifies the item; any stored item has a quantity of
/// at least 1 (a decrement to zero deletes the record instead).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Normalized item name, unique within the inventory.
    pub name: ItemName,
    /// Count on hand, always >= 1 for a stored item.
    pub quantity: u32,
}

impl Item {
    /// Create a new item.
    #[must_use]
    pub const fn new(name: ItemName, quantity: u32) -> Self {
        Self { name, quantity }
    }
}

/// Filter a snapshot by a case-insensitive substring match on item names.
///
/// Pure function over a caller-owned snapshot; an empty query returns the
/// whole snapshot. Order is preserved.
#[must_use]
pub fn search(items: &[Item], query: &str) -> Vec<Item> {
    let query = query.trim().to_lowercase();
    items
        .iter()
        .filter(|item| item.name.as_str().contains(&query))
        .cloned()
        .collect()
}
