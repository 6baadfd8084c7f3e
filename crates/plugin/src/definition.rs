//! Operator-authored definitions.

use std::time::Duration;

use enchantcraft_core::{EnchantmentCost, ItemKind, LoreColor, TextLine, VanillaEnchantment};
use enchantcraft_scripting::{Criterion, TriggerRef};
use serde::{Deserialize, Serialize};

/// Triggers fired while active at exactly `level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveTriggers {
    /// Level the entry applies to.
    #[serde(default = "one_u8")]
    pub level: u8,
    /// Triggers to fire.
    #[serde(default)]
    pub triggers: Vec<TriggerRef>,
}

/// One custom enchantment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnchantmentDefinition {
    /// Stable id. Its sanitized form is the legacy registry key.
    pub id: String,
    /// Entry name. Its sanitized form is the primary registry key.
    #[serde(default)]
    pub name: String,
    /// Display name shown on items.
    #[serde(default)]
    pub display_name: String,
    /// Lore shown on items for this enchantment.
    #[serde(default)]
    pub enchantment_lore: String,
    /// Colour of the enchantment name.
    #[serde(default)]
    pub name_color: LoreColor,
    /// Items that support this enchantment.
    #[serde(default)]
    pub supported_items: Vec<ItemKind>,
    /// Cost in an anvil to combine.
    #[serde(default = "one_i32")]
    pub anvil_cost: i32,
    /// Maximum level.
    #[serde(default = "one_u8")]
    pub max_level: u8,
    /// Percent chance (0-100) of overriding an enchanting table offer.
    /// Values of 100 or more always win, 0 or less never do.
    #[serde(default = "one_i32")]
    pub weight: i32,
    /// Minimum cost when enchanting.
    #[serde(default)]
    pub minimum_cost: EnchantmentCost,
    /// Maximum cost when enchanting.
    #[serde(default)]
    pub maximum_cost: EnchantmentCost,
    /// Whether active triggers re-fire on a cooldown while active.
    #[serde(default = "enabled")]
    pub cooldown_enabled: bool,
    /// Cooldown between active trigger runs, in milliseconds.
    #[serde(default = "one_second_ms")]
    pub cooldown_ms: u64,
    /// Gate that must pass for the enchantment to be active.
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    /// Fired once when the enchantment stops being active.
    #[serde(default)]
    pub inactive_triggers: Vec<TriggerRef>,
    /// Fired while active, matched by exact level.
    #[serde(default)]
    pub active_triggers: Vec<ActiveTriggers>,
}

fn one_u8() -> u8 {
    1
}

fn one_i32() -> i32 {
    1
}

fn enabled() -> bool {
    true
}

fn one_second_ms() -> u64 {
    1000
}

impl EnchantmentDefinition {
    /// Definition with every optional field at its default.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: String::new(),
            enchantment_lore: String::new(),
            name_color: LoreColor::default(),
            supported_items: Vec::new(),
            anvil_cost: 1,
            max_level: 1,
            weight: 1,
            minimum_cost: EnchantmentCost::default(),
            maximum_cost: EnchantmentCost::default(),
            cooldown_enabled: true,
            cooldown_ms: one_second_ms(),
            criteria: Vec::new(),
            inactive_triggers: Vec::new(),
            active_triggers: Vec::new(),
        }
    }

    /// Cooldown as a duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Whether `kind` is in the supported item list.
    pub fn supports(&self, kind: &ItemKind) -> bool {
        self.supported_items.contains(kind)
    }

    /// Triggers for exactly `level`, if an entry exists.
    pub fn triggers_for_level(&self, level: u8) -> Option<&[TriggerRef]> {
        self.active_triggers
            .iter()
            .find(|entry| entry.level == level)
            .map(|entry| entry.triggers.as_slice())
    }

    /// Name line registered with the host: display name (or entry name when
    /// blank) in the name colour, never italic.
    pub fn description(&self) -> TextLine {
        let name = if self.display_name.trim().is_empty() {
            &self.name
        } else {
            &self.display_name
        };
        TextLine {
            text: name.clone(),
            color: Some(self.name_color),
            italic: false,
        }
    }
}

/// Built-in enchantments to strip from enchanting table offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VanillaEnchantmentBlacklistDefinition {
    /// Stable id.
    pub id: String,
    /// Entry name.
    #[serde(default)]
    pub name: String,
    /// Enchantments that never appear on the table.
    #[serde(default)]
    pub enchantments: Vec<VanillaEnchantment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_defaults_match_authoring_defaults() {
        let def: EnchantmentDefinition = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        assert_eq!(def, EnchantmentDefinition::new("abc", ""));
        assert_eq!(def.cooldown(), Duration::from_secs(1));
        assert_eq!(def.name_color, LoreColor::Gray);
    }

    #[test]
    fn description_falls_back_to_name() {
        let mut def = EnchantmentDefinition::new("id", "Frost Bite");
        def.name_color = LoreColor::Aqua;
        let line = def.description();
        assert_eq!(line.text, "Frost Bite");
        assert_eq!(line.color, Some(LoreColor::Aqua));
        assert!(!line.italic);

        def.display_name = "Frostbite".into();
        assert_eq!(def.description().text, "Frostbite");
    }

    #[test]
    fn level_matching_is_exact() {
        let mut def = EnchantmentDefinition::new("id", "name");
        def.active_triggers = vec![
            ActiveTriggers {
                level: 1,
                triggers: vec![TriggerRef::new("one")],
            },
            ActiveTriggers {
                level: 3,
                triggers: vec![TriggerRef::new("three")],
            },
        ];
        assert_eq!(def.triggers_for_level(3), Some(&[TriggerRef::new("three")][..]));
        assert!(def.triggers_for_level(2).is_none());
    }

    #[test]
    fn blacklist_parses_constant_names() {
        let def: VanillaEnchantmentBlacklistDefinition =
            serde_json::from_str(r#"{"id":"bl","enchantments":["MENDING","SWEEPING_EDGE"]}"#).unwrap();
        assert_eq!(
            def.enchantments,
            vec![VanillaEnchantment::Mending, VanillaEnchantment::SweepingEdge]
        );
    }
}
