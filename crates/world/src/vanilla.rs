//! Boot-time population of the built-in enchantments.

use enchantcraft_core::{EnchantmentCost, EquipmentSlotGroup, ItemKind, TextLine, VanillaEnchantment};
use tracing::{debug, warn};

use crate::registry::{EnchantmentRegistry, Freezable};

const SWORDS: &[&str] = &[
    "wooden_sword",
    "stone_sword",
    "iron_sword",
    "golden_sword",
    "diamond_sword",
    "netherite_sword",
];
const AXES: &[&str] = &[
    "wooden_axe",
    "stone_axe",
    "iron_axe",
    "golden_axe",
    "diamond_axe",
    "netherite_axe",
];
const DIGGERS: &[&str] = &[
    "wooden_pickaxe",
    "stone_pickaxe",
    "iron_pickaxe",
    "golden_pickaxe",
    "diamond_pickaxe",
    "netherite_pickaxe",
    "wooden_shovel",
    "stone_shovel",
    "iron_shovel",
    "golden_shovel",
    "diamond_shovel",
    "netherite_shovel",
    "wooden_hoe",
    "stone_hoe",
    "iron_hoe",
    "golden_hoe",
    "diamond_hoe",
    "netherite_hoe",
];
const HELMETS: &[&str] = &[
    "leather_helmet",
    "chainmail_helmet",
    "iron_helmet",
    "golden_helmet",
    "diamond_helmet",
    "netherite_helmet",
    "turtle_helmet",
];
const CHESTPLATES: &[&str] = &[
    "leather_chestplate",
    "chainmail_chestplate",
    "iron_chestplate",
    "golden_chestplate",
    "diamond_chestplate",
    "netherite_chestplate",
];
const LEGGINGS: &[&str] = &[
    "leather_leggings",
    "chainmail_leggings",
    "iron_leggings",
    "golden_leggings",
    "diamond_leggings",
    "netherite_leggings",
];
const BOOTS: &[&str] = &[
    "leather_boots",
    "chainmail_boots",
    "iron_boots",
    "golden_boots",
    "diamond_boots",
    "netherite_boots",
];

/// Item groups a built-in enchantment can go on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Weapon,
    Digger,
    Armor,
    Helmet,
    Boots,
    Leggings,
    Bow,
    Crossbow,
    Trident,
    FishingRod,
    Mace,
    Durability,
    Wearable,
}

impl Category {
    fn of(enchantment: VanillaEnchantment) -> Self {
        use VanillaEnchantment::*;
        match enchantment {
            Sharpness | Smite | BaneOfArthropods | FireAspect | Knockback | Looting
            | SweepingEdge => Category::Weapon,
            Efficiency | Fortune | SilkTouch => Category::Digger,
            Protection | FireProtection | BlastProtection | ProjectileProtection | Thorns => {
                Category::Armor
            }
            AquaAffinity | Respiration => Category::Helmet,
            DepthStrider | FeatherFalling | FrostWalker | SoulSpeed => Category::Boots,
            SwiftSneak => Category::Leggings,
            Power | Punch | Flame | Infinity => Category::Bow,
            Multishot | Piercing | QuickCharge => Category::Crossbow,
            Channeling | Impaling | Loyalty | Riptide => Category::Trident,
            LuckOfTheSea | Lure => Category::FishingRod,
            Density | Breach | WindBurst => Category::Mace,
            Unbreaking | Mending => Category::Durability,
            BindingCurse | VanishingCurse | Weaving => Category::Wearable,
        }
    }

    fn items(self) -> Vec<&'static str> {
        let armor = || {
            [HELMETS, CHESTPLATES, LEGGINGS, BOOTS]
                .into_iter()
                .flatten()
                .copied()
                .collect::<Vec<_>>()
        };
        match self {
            Category::Weapon => SWORDS.iter().chain(AXES).copied().collect(),
            Category::Digger => DIGGERS.iter().chain(AXES).copied().collect(),
            Category::Armor => armor(),
            Category::Helmet => HELMETS.to_vec(),
            Category::Boots => BOOTS.to_vec(),
            Category::Leggings => LEGGINGS.to_vec(),
            Category::Bow => vec!["bow"],
            Category::Crossbow => vec!["crossbow"],
            Category::Trident => vec!["trident"],
            Category::FishingRod => vec!["fishing_rod"],
            Category::Mace => vec!["mace"],
            Category::Durability => {
                let mut items: Vec<_> = [SWORDS, AXES, DIGGERS].into_iter().flatten().copied().collect();
                items.extend(armor());
                items.extend(["bow", "crossbow", "trident", "fishing_rod", "mace", "shears"]);
                items
            }
            Category::Wearable => {
                let mut items = armor();
                items.extend(["elytra", "carved_pumpkin"]);
                items
            }
        }
    }

    fn slots(self) -> Vec<EquipmentSlotGroup> {
        match self {
            Category::Armor
            | Category::Helmet
            | Category::Boots
            | Category::Leggings
            | Category::Wearable => vec![EquipmentSlotGroup::Armor],
            _ => vec![EquipmentSlotGroup::Hand],
        }
    }
}

/// Register every built-in except `missing`, then freeze the registry.
///
/// `missing` models engine versions that predate some enchantments.
pub fn bootstrap_vanilla(registry: &mut EnchantmentRegistry, missing: &[VanillaEnchantment]) {
    for enchantment in VanillaEnchantment::ALL {
        if missing.contains(&enchantment) {
            continue;
        }
        let category = Category::of(enchantment);
        let items: Vec<ItemKind> = category
            .items()
            .into_iter()
            .filter_map(|name| ItemKind::parse(name).ok())
            .collect();
        let result = registry.bootstrap(enchantment.key(), |b| {
            b.description(TextLine::plain(enchantment.display_name()).italic(false))
                .supported_items(items)
                .anvil_cost(2)
                .max_level(enchantment.max_level())
                .weight(5)
                .minimum_cost(EnchantmentCost::of(1, 10))
                .maximum_cost(EnchantmentCost::of(21, 10))
                .active_slots(category.slots());
        });
        if let Err(err) = result {
            warn!(%enchantment, error = %err, "Failed to bootstrap built-in enchantment");
        }
    }
    registry.freeze();
    debug!(count = registry.registered_count(), "Built-in enchantments bound");
}
