//! Items: the leaves a player owns and the results of merging them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::enchantment::{EnchantmentSet, PriorWork};

/// Which multiplier column applies when the item is used as a sacrifice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Book,
    Item,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::Book => write!(f, "book"),
            ItemType::Item => write!(f, "item"),
        }
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "book" => Ok(ItemType::Book),
            "item" => Ok(ItemType::Item),
            other => Err(format!("unknown item type '{other}': expected book or item")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Owned by the player, cost fixed at 0
    Leaf,
    /// Produced by one anvil merge
    Internal,
}

/// A concrete item or a merge result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub kind: ItemKind,
    pub item_type: ItemType,
    pub enchantments: EnchantmentSet,
    pub prior_work: PriorWork,
    /// Experience cost of the merge that produced this item (0 for leaves)
    pub cost: u32,
}

impl Item {
    pub fn leaf(
        name: impl Into<String>,
        item_type: ItemType,
        enchantments: EnchantmentSet,
        prior_work: PriorWork,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Leaf,
            item_type,
            enchantments,
            prior_work,
            cost: 0,
        }
    }

    /// Unenchanted book used when only an item count is known.
    pub fn placeholder(position: usize) -> Self {
        Self::leaf(
            format!("Book {}", position + 1),
            ItemType::Book,
            EnchantmentSet::new(),
            PriorWork::ZERO,
        )
    }

    /// Internal slot awaiting evaluation.
    pub(crate) fn pending() -> Self {
        Self {
            name: String::new(),
            kind: ItemKind::Internal,
            item_type: ItemType::Item,
            enchantments: EnchantmentSet::new(),
            prior_work: PriorWork::ZERO,
            cost: 0,
        }
    }

    pub fn merged(
        name: impl Into<String>,
        item_type: ItemType,
        enchantments: EnchantmentSet,
        prior_work: PriorWork,
        cost: u32,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Internal,
            item_type,
            enchantments,
            prior_work,
            cost,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == ItemKind::Leaf
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.name, self.item_type, self.enchantments)
    }
}
