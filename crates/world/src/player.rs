//! Connected players and their equipment.

use enchantcraft_core::{EnchantmentId, ItemStack};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::inventory::Inventory;

/// Stable player identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// Equipment slots that can hold an active enchantment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    /// Main hand.
    MainHand,
    /// Off hand.
    OffHand,
    /// Helmet.
    Head,
    /// Chestplate.
    Chest,
    /// Leggings.
    Legs,
    /// Boots.
    Feet,
}

impl EquipmentSlot {
    /// Every slot, hands first, then armor head to feet.
    pub const ALL: [EquipmentSlot; 6] = [
        EquipmentSlot::MainHand,
        EquipmentSlot::OffHand,
        EquipmentSlot::Head,
        EquipmentSlot::Chest,
        EquipmentSlot::Legs,
        EquipmentSlot::Feet,
    ];
}

/// Items currently held and worn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Equipment {
    /// Main hand item.
    pub main_hand: Option<ItemStack>,
    /// Off hand item.
    pub off_hand: Option<ItemStack>,
    /// Armor, head to feet.
    pub armor: [Option<ItemStack>; 4],
}

impl Equipment {
    /// Item in `slot`, if any.
    pub fn get(&self, slot: EquipmentSlot) -> Option<&ItemStack> {
        match slot {
            EquipmentSlot::MainHand => self.main_hand.as_ref(),
            EquipmentSlot::OffHand => self.off_hand.as_ref(),
            EquipmentSlot::Head => self.armor[0].as_ref(),
            EquipmentSlot::Chest => self.armor[1].as_ref(),
            EquipmentSlot::Legs => self.armor[2].as_ref(),
            EquipmentSlot::Feet => self.armor[3].as_ref(),
        }
    }

    /// Replace the item in `slot`, returning the previous one.
    pub fn set(&mut self, slot: EquipmentSlot, item: Option<ItemStack>) -> Option<ItemStack> {
        let target = match slot {
            EquipmentSlot::MainHand => &mut self.main_hand,
            EquipmentSlot::OffHand => &mut self.off_hand,
            EquipmentSlot::Head => &mut self.armor[0],
            EquipmentSlot::Chest => &mut self.armor[1],
            EquipmentSlot::Legs => &mut self.armor[2],
            EquipmentSlot::Feet => &mut self.armor[3],
        };
        std::mem::replace(target, item)
    }

    /// Equipped items in [`EquipmentSlot::ALL`] order.
    pub fn items(&self) -> impl Iterator<Item = &ItemStack> {
        EquipmentSlot::ALL.into_iter().filter_map(|slot| self.get(slot))
    }
}

/// A connected player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Held and worn items.
    pub equipment: Equipment,
    /// Main inventory.
    pub inventory: Inventory,
    /// Items dropped at the player's feet, oldest first.
    pub dropped: Vec<ItemStack>,
}

impl Player {
    /// New player with empty hands and inventory.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            equipment: Equipment::default(),
            inventory: Inventory::new(),
            dropped: Vec::new(),
        }
    }

    /// Give items, dropping whatever does not fit in the inventory.
    pub fn give(&mut self, stack: ItemStack) {
        let leftovers = self.inventory.add_item(stack);
        self.dropped.extend(leftovers);
    }

    /// Highest level of `id` across equipped items accepted by `filter`.
    pub fn equipped_level(&self, id: EnchantmentId, filter: impl Fn(&ItemStack) -> bool) -> u8 {
        self.equipment
            .items()
            .filter(|item| filter(item))
            .map(|item| item.enchantment_level(id))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enchantcraft_core::ItemKind;

    #[test]
    fn equipped_level_takes_max_over_accepted_items() {
        let mut player = Player::new(PlayerId(1), "alex");
        let id = EnchantmentId(9);
        let sword = ItemStack::new(ItemKind::parse("diamond_sword").unwrap(), 1).with_enchantment(id, 2);
        let boots = ItemStack::new(ItemKind::parse("iron_boots").unwrap(), 1).with_enchantment(id, 4);
        player.equipment.set(EquipmentSlot::MainHand, Some(sword));
        player.equipment.set(EquipmentSlot::Feet, Some(boots));

        assert_eq!(player.equipped_level(id, |_| true), 4);
        assert_eq!(
            player.equipped_level(id, |item| item.kind.key().path() == "diamond_sword"),
            2
        );
        assert_eq!(player.equipped_level(id, |_| false), 0);
    }

    #[test]
    fn give_drops_overflow() {
        let mut player = Player::new(PlayerId(1), "alex");
        for slot in 0..crate::inventory::INVENTORY_SIZE {
            player
                .inventory
                .set(slot, Some(ItemStack::new(ItemKind::parse("dirt").unwrap(), 64)));
        }
        player.give(ItemStack::new(ItemKind::enchanted_book(), 1));
        assert_eq!(player.dropped.len(), 1);
    }
}
