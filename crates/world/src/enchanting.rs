//! Enchanting table offers.
//!
//! When an item is placed on a table the host rolls three offers and publishes
//! a [`PrepareEnchantEvent`] so listeners can edit them before they are shown.

use enchantcraft_core::{EnchantmentId, ItemStack};
use serde::{Deserialize, Serialize};

use crate::player::PlayerId;
use crate::registry::EnchantmentRegistry;

/// Number of offer slots on the table.
pub const OFFER_SLOTS: usize = 3;

/// Base XP level required for each enchanting slot.
pub const BASE_LEVEL_COSTS: [i32; OFFER_SLOTS] = [1, 5, 10];

/// Maximum number of bookshelves that affect enchanting.
pub const MAX_BOOKSHELVES: u32 = 15;

/// An enchantment offer in one of the table slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnchantmentOffer {
    /// Offered enchantment.
    pub enchantment: EnchantmentId,
    /// Offered level.
    pub level: u8,
    /// XP level cost shown for the slot.
    pub cost: i32,
}

/// Offers about to be presented for `item`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareEnchantEvent {
    /// Player at the table.
    pub player: PlayerId,
    /// Item being enchanted.
    pub item: ItemStack,
    /// Offer slots; `None` hides the slot.
    pub offers: Vec<Option<EnchantmentOffer>>,
}

impl PrepareEnchantEvent {
    /// Event with host-rolled offers.
    pub fn roll(
        registry: &EnchantmentRegistry,
        player: PlayerId,
        item: ItemStack,
        bookshelves: u32,
        seed: u64,
    ) -> Self {
        let offers = roll_offers(registry, &item, bookshelves, seed);
        Self {
            player,
            item,
            offers,
        }
    }
}

/// Roll host offers for an item.
///
/// Offers are picked deterministically from `seed` among bound entries that
/// support the item; unsupported items get empty slots.
pub fn roll_offers(
    registry: &EnchantmentRegistry,
    item: &ItemStack,
    bookshelves: u32,
    seed: u64,
) -> Vec<Option<EnchantmentOffer>> {
    let candidates: Vec<_> = registry
        .iter_bound()
        .filter(|entry| entry.supports(&item.kind))
        .collect();
    if candidates.is_empty() {
        return vec![None; OFFER_SLOTS];
    }

    let level_modifier = bookshelves.min(MAX_BOOKSHELVES) as i32;
    BASE_LEVEL_COSTS
        .iter()
        .enumerate()
        .map(|(slot, base_cost)| {
            let cost = base_cost + level_modifier;
            let pick = seed.wrapping_add(slot as u64 * 12345);
            let entry = candidates[(pick % candidates.len() as u64) as usize];
            Some(EnchantmentOffer {
                enchantment: entry.id,
                level: level_for_cost(cost, entry.max_level),
                cost,
            })
        })
        .collect()
}

/// Cost 1-9 gives level 1, 10-19 level 2, and so on, capped at `max_level`.
fn level_for_cost(cost: i32, max_level: u8) -> u8 {
    let level = (cost.max(0) / 10 + 1).min(i32::from(max_level));
    level.max(1) as u8
}
