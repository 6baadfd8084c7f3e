//! Item stacks and the enchantment data they carry.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::enchantment::EnchantmentId;
use crate::registry::{RegistryKey, RegistryKeyError};
use crate::text::TextLine;

/// Maximum stack size for most items.
pub const DEFAULT_STACK_SIZE: u32 = 64;

/// Item kind (material) identified by its registry key, e.g. `minecraft:diamond_sword`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKind(pub RegistryKey);

impl ItemKind {
    /// Parse an item kind; bare names land in the `minecraft` namespace.
    pub fn parse(input: &str) -> Result<Self, RegistryKeyError> {
        RegistryKey::parse(input).map(Self)
    }

    /// The enchanted book item.
    pub fn enchanted_book() -> Self {
        Self(RegistryKey::builtin("enchanted_book"))
    }

    /// Underlying registry key.
    pub fn key(&self) -> &RegistryKey {
        &self.0
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

bitflags! {
    /// Tooltip sections hidden on an item.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ItemFlags: u8 {
        /// Hide directly applied enchantments.
        const HIDE_ENCHANTS = 0b0000_0001;
        /// Hide enchantments stored on books.
        const HIDE_STORED_ENCHANTS = 0b0000_0010;
    }
}

/// Represents a stack of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item kind.
    pub kind: ItemKind,
    /// Number of items in this stack.
    pub count: u32,
    /// Enchantments applied to the item itself, by id.
    #[serde(default)]
    pub enchantments: BTreeMap<EnchantmentId, u8>,
    /// Enchantments stored on the item (enchanted books).
    #[serde(default)]
    pub stored_enchantments: BTreeMap<EnchantmentId, u8>,
    /// Custom display name.
    #[serde(default)]
    pub display_name: Option<TextLine>,
    /// Lore lines.
    #[serde(default)]
    pub lore: Vec<TextLine>,
    /// Hidden tooltip sections.
    #[serde(default)]
    pub flags: ItemFlags,
}

impl ItemStack {
    /// Create a new item stack.
    pub fn new(kind: ItemKind, count: u32) -> Self {
        Self {
            kind,
            count,
            enchantments: BTreeMap::new(),
            stored_enchantments: BTreeMap::new(),
            display_name: None,
            lore: Vec::new(),
            flags: ItemFlags::empty(),
        }
    }

    /// Builder-style helper that applies an enchantment directly.
    pub fn with_enchantment(mut self, id: EnchantmentId, level: u8) -> Self {
        self.enchantments.insert(id, level);
        self
    }

    /// Level of a directly applied enchantment (0 when absent).
    pub fn enchantment_level(&self, id: EnchantmentId) -> u8 {
        self.enchantments.get(&id).copied().unwrap_or(0)
    }

    /// Store an enchantment on the item. `ignore_level_restriction` keeps the
    /// level as given; otherwise it is clamped to `max_level`.
    pub fn add_stored_enchantment(
        &mut self,
        id: EnchantmentId,
        level: u8,
        max_level: u8,
        ignore_level_restriction: bool,
    ) {
        let level = if ignore_level_restriction {
            level
        } else {
            level.min(max_level)
        };
        self.stored_enchantments.insert(id, level);
    }

    /// Whether the item stores the given enchantment.
    pub fn has_stored_enchantment(&self, id: EnchantmentId) -> bool {
        self.stored_enchantments.contains_key(&id)
    }

    /// Check if this stack can merge with another stack.
    pub fn can_merge(&self, other: &ItemStack) -> bool {
        self.kind == other.kind
            && self.enchantments == other.enchantments
            && self.stored_enchantments == other.stored_enchantments
            && self.display_name == other.display_name
            && self.lore == other.lore
            && self.flags == other.flags
    }

    /// Get the maximum stack size for this item.
    pub fn max_stack_size(&self) -> u32 {
        if self.kind == ItemKind::enchanted_book() || !self.enchantments.is_empty() {
            1
        } else {
            DEFAULT_STACK_SIZE
        }
    }

    /// Get remaining space in this stack.
    pub fn remaining_space(&self) -> u32 {
        self.max_stack_size().saturating_sub(self.count)
    }

    /// Try to add items to this stack, returning the amount that didn't fit.
    pub fn add(&mut self, amount: u32) -> u32 {
        let space = self.remaining_space();
        let added = amount.min(space);
        self.count += added;
        amount - added
    }

    /// Split this stack, taking the specified amount into a new stack.
    pub fn split(&mut self, amount: u32) -> Option<ItemStack> {
        if amount == 0 || amount > self.count {
            return None;
        }

        self.count -= amount;
        let mut taken = self.clone();
        taken.count = amount;
        Some(taken)
    }
}
