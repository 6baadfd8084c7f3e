//! Enchantment identities, cost curves and the built-in catalogue.

use serde::{Deserialize, Serialize};

use crate::registry::RegistryKey;

/// Numeric id the host registry assigns to every enchantment it holds.
///
/// Ids are never reused for the life of the process, so item stacks can keep
/// referring to an enchantment even after its key was unbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnchantmentId(pub u32);

/// Non-owning reference to an enchantment living in the host registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnchantmentHandle {
    /// Registry-assigned id (identity).
    pub id: EnchantmentId,
    /// Key the enchantment was registered under.
    pub key: RegistryKey,
}

/// Level-scaled cost curve (`base + per_level * (level - 1)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnchantmentCost {
    /// Cost at level 1.
    pub base: i32,
    /// Additional cost per level above 1.
    pub per_level: i32,
}

impl EnchantmentCost {
    /// Create a cost curve.
    pub const fn of(base: i32, per_level: i32) -> Self {
        Self { base, per_level }
    }

    /// Evaluate the curve at `level` (levels below 1 are treated as 1).
    pub fn at_level(self, level: u8) -> i32 {
        let extra = i32::from(level.max(1)) - 1;
        self.base.saturating_add(self.per_level.saturating_mul(extra))
    }
}

/// Equipment slot groups in which an enchantment is considered active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlotGroup {
    /// Helmet, chestplate, leggings and boots.
    Armor,
    /// Main hand and off hand.
    Hand,
}

/// Built-in enchantments shipped by the host engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum VanillaEnchantment {
    AquaAffinity,
    BaneOfArthropods,
    BindingCurse,
    BlastProtection,
    Channeling,
    DepthStrider,
    Density,
    Efficiency,
    FeatherFalling,
    FireAspect,
    FireProtection,
    Flame,
    Fortune,
    FrostWalker,
    Impaling,
    Infinity,
    Knockback,
    Looting,
    Loyalty,
    LuckOfTheSea,
    Lure,
    Mending,
    Multishot,
    Piercing,
    Power,
    ProjectileProtection,
    Protection,
    Punch,
    QuickCharge,
    Respiration,
    Riptide,
    Sharpness,
    SilkTouch,
    Smite,
    SoulSpeed,
    SweepingEdge,
    SwiftSneak,
    Thorns,
    Unbreaking,
    VanishingCurse,
    WindBurst,
    Breach,
    Weaving,
}

impl VanillaEnchantment {
    /// Every built-in enchantment, in declaration order.
    pub const ALL: [VanillaEnchantment; 43] = [
        VanillaEnchantment::AquaAffinity,
        VanillaEnchantment::BaneOfArthropods,
        VanillaEnchantment::BindingCurse,
        VanillaEnchantment::BlastProtection,
        VanillaEnchantment::Channeling,
        VanillaEnchantment::DepthStrider,
        VanillaEnchantment::Density,
        VanillaEnchantment::Efficiency,
        VanillaEnchantment::FeatherFalling,
        VanillaEnchantment::FireAspect,
        VanillaEnchantment::FireProtection,
        VanillaEnchantment::Flame,
        VanillaEnchantment::Fortune,
        VanillaEnchantment::FrostWalker,
        VanillaEnchantment::Impaling,
        VanillaEnchantment::Infinity,
        VanillaEnchantment::Knockback,
        VanillaEnchantment::Looting,
        VanillaEnchantment::Loyalty,
        VanillaEnchantment::LuckOfTheSea,
        VanillaEnchantment::Lure,
        VanillaEnchantment::Mending,
        VanillaEnchantment::Multishot,
        VanillaEnchantment::Piercing,
        VanillaEnchantment::Power,
        VanillaEnchantment::ProjectileProtection,
        VanillaEnchantment::Protection,
        VanillaEnchantment::Punch,
        VanillaEnchantment::QuickCharge,
        VanillaEnchantment::Respiration,
        VanillaEnchantment::Riptide,
        VanillaEnchantment::Sharpness,
        VanillaEnchantment::SilkTouch,
        VanillaEnchantment::Smite,
        VanillaEnchantment::SoulSpeed,
        VanillaEnchantment::SweepingEdge,
        VanillaEnchantment::SwiftSneak,
        VanillaEnchantment::Thorns,
        VanillaEnchantment::Unbreaking,
        VanillaEnchantment::VanishingCurse,
        VanillaEnchantment::WindBurst,
        VanillaEnchantment::Breach,
        VanillaEnchantment::Weaving,
    ];

    /// Registry path under the `minecraft` namespace.
    pub fn key_path(self) -> &'static str {
        match self {
            VanillaEnchantment::AquaAffinity => "aqua_affinity",
            VanillaEnchantment::BaneOfArthropods => "bane_of_arthropods",
            VanillaEnchantment::BindingCurse => "binding_curse",
            VanillaEnchantment::BlastProtection => "blast_protection",
            VanillaEnchantment::Channeling => "channeling",
            VanillaEnchantment::DepthStrider => "depth_strider",
            VanillaEnchantment::Density => "density",
            VanillaEnchantment::Efficiency => "efficiency",
            VanillaEnchantment::FeatherFalling => "feather_falling",
            VanillaEnchantment::FireAspect => "fire_aspect",
            VanillaEnchantment::FireProtection => "fire_protection",
            VanillaEnchantment::Flame => "flame",
            VanillaEnchantment::Fortune => "fortune",
            VanillaEnchantment::FrostWalker => "frost_walker",
            VanillaEnchantment::Impaling => "impaling",
            VanillaEnchantment::Infinity => "infinity",
            VanillaEnchantment::Knockback => "knockback",
            VanillaEnchantment::Looting => "looting",
            VanillaEnchantment::Loyalty => "loyalty",
            VanillaEnchantment::LuckOfTheSea => "luck_of_the_sea",
            VanillaEnchantment::Lure => "lure",
            VanillaEnchantment::Mending => "mending",
            VanillaEnchantment::Multishot => "multishot",
            VanillaEnchantment::Piercing => "piercing",
            VanillaEnchantment::Power => "power",
            VanillaEnchantment::ProjectileProtection => "projectile_protection",
            VanillaEnchantment::Protection => "protection",
            VanillaEnchantment::Punch => "punch",
            VanillaEnchantment::QuickCharge => "quick_charge",
            VanillaEnchantment::Respiration => "respiration",
            VanillaEnchantment::Riptide => "riptide",
            VanillaEnchantment::Sharpness => "sharpness",
            VanillaEnchantment::SilkTouch => "silk_touch",
            VanillaEnchantment::Smite => "smite",
            VanillaEnchantment::SoulSpeed => "soul_speed",
            // The registry kept the pre-rename path.
            VanillaEnchantment::SweepingEdge => "sweeping",
            VanillaEnchantment::SwiftSneak => "swift_sneak",
            VanillaEnchantment::Thorns => "thorns",
            VanillaEnchantment::Unbreaking => "unbreaking",
            VanillaEnchantment::VanishingCurse => "vanishing_curse",
            VanillaEnchantment::WindBurst => "wind_burst",
            VanillaEnchantment::Breach => "breach",
            VanillaEnchantment::Weaving => "weaving",
        }
    }

    /// Full registry key (`minecraft:<path>`).
    pub fn key(self) -> RegistryKey {
        RegistryKey::builtin(self.key_path())
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            VanillaEnchantment::AquaAffinity => "Aqua Affinity",
            VanillaEnchantment::BaneOfArthropods => "Bane of Arthropods",
            VanillaEnchantment::BindingCurse => "Curse of Binding",
            VanillaEnchantment::BlastProtection => "Blast Protection",
            VanillaEnchantment::Channeling => "Channeling",
            VanillaEnchantment::DepthStrider => "Depth Strider",
            VanillaEnchantment::Density => "Density",
            VanillaEnchantment::Efficiency => "Efficiency",
            VanillaEnchantment::FeatherFalling => "Feather Falling",
            VanillaEnchantment::FireAspect => "Fire Aspect",
            VanillaEnchantment::FireProtection => "Fire Protection",
            VanillaEnchantment::Flame => "Flame",
            VanillaEnchantment::Fortune => "Fortune",
            VanillaEnchantment::FrostWalker => "Frost Walker",
            VanillaEnchantment::Impaling => "Impaling",
            VanillaEnchantment::Infinity => "Infinity",
            VanillaEnchantment::Knockback => "Knockback",
            VanillaEnchantment::Looting => "Looting",
            VanillaEnchantment::Loyalty => "Loyalty",
            VanillaEnchantment::LuckOfTheSea => "Luck of the Sea",
            VanillaEnchantment::Lure => "Lure",
            VanillaEnchantment::Mending => "Mending",
            VanillaEnchantment::Multishot => "Multishot",
            VanillaEnchantment::Piercing => "Piercing",
            VanillaEnchantment::Power => "Power",
            VanillaEnchantment::ProjectileProtection => "Projectile Protection",
            VanillaEnchantment::Protection => "Protection",
            VanillaEnchantment::Punch => "Punch",
            VanillaEnchantment::QuickCharge => "Quick Charge",
            VanillaEnchantment::Respiration => "Respiration",
            VanillaEnchantment::Riptide => "Riptide",
            VanillaEnchantment::Sharpness => "Sharpness",
            VanillaEnchantment::SilkTouch => "Silk Touch",
            VanillaEnchantment::Smite => "Smite",
            VanillaEnchantment::SoulSpeed => "Soul Speed",
            VanillaEnchantment::SweepingEdge => "Sweeping Edge",
            VanillaEnchantment::SwiftSneak => "Swift Sneak",
            VanillaEnchantment::Thorns => "Thorns",
            VanillaEnchantment::Unbreaking => "Unbreaking",
            VanillaEnchantment::VanishingCurse => "Curse of Vanishing",
            VanillaEnchantment::WindBurst => "Wind Burst",
            VanillaEnchantment::Breach => "Breach",
            VanillaEnchantment::Weaving => "Weaving",
        }
    }

    /// Get the maximum level for this enchantment
    pub fn max_level(self) -> u8 {
        match self {
            VanillaEnchantment::AquaAffinity
            | VanillaEnchantment::BindingCurse
            | VanillaEnchantment::Channeling
            | VanillaEnchantment::Flame
            | VanillaEnchantment::Infinity
            | VanillaEnchantment::Mending
            | VanillaEnchantment::Multishot
            | VanillaEnchantment::SilkTouch
            | VanillaEnchantment::VanishingCurse => 1,
            VanillaEnchantment::FireAspect
            | VanillaEnchantment::FrostWalker
            | VanillaEnchantment::Knockback
            | VanillaEnchantment::Punch
            | VanillaEnchantment::Weaving => 2,
            VanillaEnchantment::DepthStrider
            | VanillaEnchantment::Fortune
            | VanillaEnchantment::Looting
            | VanillaEnchantment::Loyalty
            | VanillaEnchantment::LuckOfTheSea
            | VanillaEnchantment::Lure
            | VanillaEnchantment::QuickCharge
            | VanillaEnchantment::Respiration
            | VanillaEnchantment::Riptide
            | VanillaEnchantment::SoulSpeed
            | VanillaEnchantment::SweepingEdge
            | VanillaEnchantment::SwiftSneak
            | VanillaEnchantment::Thorns
            | VanillaEnchantment::Unbreaking
            | VanillaEnchantment::WindBurst => 3,
            VanillaEnchantment::BlastProtection
            | VanillaEnchantment::FeatherFalling
            | VanillaEnchantment::FireProtection
            | VanillaEnchantment::Piercing
            | VanillaEnchantment::ProjectileProtection
            | VanillaEnchantment::Protection
            | VanillaEnchantment::Breach => 4,
            VanillaEnchantment::BaneOfArthropods
            | VanillaEnchantment::Density
            | VanillaEnchantment::Efficiency
            | VanillaEnchantment::Impaling
            | VanillaEnchantment::Power
            | VanillaEnchantment::Sharpness
            | VanillaEnchantment::Smite => 5,
        }
    }
}

impl std::fmt::Display for VanillaEnchantment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
