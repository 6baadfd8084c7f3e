//! Built-in enchantments kept out of enchanting table offers.

use std::collections::BTreeSet;

use enchantcraft_core::EnchantmentId;
use enchantcraft_world::EnchantmentRegistry;
use tracing::{debug, warn};

use crate::definition::VanillaEnchantmentBlacklistDefinition;

/// Built-in enchantments resolved against the running host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VanillaBlacklist {
    ids: BTreeSet<EnchantmentId>,
}

impl VanillaBlacklist {
    /// Resolve every entry of every definition. Entries the host does not
    /// know are skipped and reported in one warning.
    pub fn resolve(
        registry: &EnchantmentRegistry,
        definitions: &[VanillaEnchantmentBlacklistDefinition],
    ) -> Self {
        let mut ids = BTreeSet::new();
        let mut missing = BTreeSet::new();
        for entry in definitions.iter().flat_map(|def| def.enchantments.iter().copied()) {
            match registry.get(&entry.key()) {
                Some(found) => {
                    ids.insert(found.id);
                }
                None => {
                    missing.insert(entry);
                }
            }
        }
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|e| e.display_name()).collect();
            warn!(
                "Unable to resolve vanilla enchantments for blacklist: {}",
                names.join(", ")
            );
        }
        debug!(count = ids.len(), "Vanilla blacklist loaded");
        Self { ids }
    }

    /// Whether the id is blacklisted.
    pub fn contains(&self, id: EnchantmentId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of resolved entries.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is blacklisted.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<EnchantmentId> for VanillaBlacklist {
    fn from_iter<I: IntoIterator<Item = EnchantmentId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
