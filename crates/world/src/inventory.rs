//! Player inventory storage.
//!
//! A fixed 36-slot container. Adding items merges into compatible stacks
//! first, then fills empty slots one max-size stack at a time, and hands back
//! whatever did not fit so the caller can drop it.

use enchantcraft_core::{ItemKind, ItemStack};
use serde::{Deserialize, Serialize};

/// Number of slots in player inventory.
pub const INVENTORY_SIZE: usize = 36;

/// Player or container inventory with multiple slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    /// Create a new empty inventory.
    pub fn new() -> Self {
        Self {
            slots: vec![None; INVENTORY_SIZE],
        }
    }

    /// Get an item stack from a slot.
    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Set an item stack in a slot. Returns `false` for out-of-range slots.
    pub fn set(&mut self, slot: usize, stack: Option<ItemStack>) -> bool {
        match self.slots.get_mut(slot) {
            Some(target) => {
                *target = stack;
                true
            }
            None => false,
        }
    }

    /// Add items, merging with existing stacks where possible.
    /// Returns the leftovers that could not fit, one stack per overflow chunk.
    pub fn add_item(&mut self, mut stack: ItemStack) -> Vec<ItemStack> {
        for existing in self.slots.iter_mut().flatten() {
            if stack.count == 0 {
                return Vec::new();
            }
            if existing.can_merge(&stack) && existing.remaining_space() > 0 {
                stack.count = existing.add(stack.count);
            }
        }

        let max = stack.max_stack_size().max(1);
        for slot in self.slots.iter_mut().filter(|slot| slot.is_none()) {
            if stack.count == 0 {
                return Vec::new();
            }
            let take = stack.count.min(max);
            *slot = stack.split(take);
        }

        let mut leftovers = Vec::new();
        while stack.count > 0 {
            let take = stack.count.min(max);
            match stack.split(take) {
                Some(chunk) => leftovers.push(chunk),
                None => break,
            }
        }
        leftovers
    }

    /// Count the total number of a specific item kind.
    pub fn count_item(&self, kind: &ItemKind) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|stack| &stack.kind == kind)
            .map(|stack| stack.count)
            .sum()
    }

    /// Iterate occupied slots.
    pub fn stacks(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().flatten()
    }

    /// Get the number of empty slots.
    pub fn empty_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}
