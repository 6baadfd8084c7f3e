//! Host enchantment registry.
//!
//! The registry binds namespaced keys to enchantment entries. After boot it is
//! frozen: registration is rejected until a caller flips it back to unfrozen.
//! Newly registered entries stay *pending* and only become visible through
//! [`EnchantmentRegistry::get`] once a freeze transition binds them.
//!
//! Two mutation API shapes exist, mirroring how different engine builds
//! expose write access (see [`MutationApi`]):
//! - the typed [`WritableRegistry`] view with [`EnchantmentBuilder`]
//! - the string-keyed method table in [`crate::reflect`]

use std::collections::{BTreeSet, HashMap};

use enchantcraft_core::{
    EnchantmentCost, EnchantmentHandle, EnchantmentId, EquipmentSlotGroup, ItemKind, RegistryKey,
    TextLine,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised by the host registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    /// Registration attempted while the registry is frozen.
    #[error("registry is frozen, cannot register {0}")]
    Frozen(RegistryKey),
    /// A key is already bound or pending.
    #[error("key {0} is already registered")]
    DuplicateKey(RegistryKey),
    /// The key is not known to the registry.
    #[error("key {0} is not registered")]
    UnknownKey(RegistryKey),
    /// Dynamic lookup of a method failed.
    #[error("registry has no method `{0}`")]
    UnknownMethod(String),
    /// Dynamic call with the wrong argument shape.
    #[error("bad arguments for `{method}`: {reason}")]
    BadArguments {
        /// Invoked method.
        method: String,
        /// What was wrong.
        reason: String,
    },
    /// A required builder property was never set.
    #[error("builder property `{0}` is missing")]
    MissingProperty(&'static str),
    /// A builder property failed validation.
    #[error("builder property `{property}` is invalid: {reason}")]
    InvalidProperty {
        /// Property name.
        property: &'static str,
        /// What was wrong.
        reason: String,
    },
}

/// Which write API the running engine build exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationApi {
    /// `writable()` returns a typed [`WritableRegistry`].
    #[default]
    Typed,
    /// Only the dynamic method table is available.
    Dynamic,
    /// No write API at all: the method table answers lookups only.
    Sealed,
}

/// Engine build characteristics relevant to registry mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostProfile {
    /// Exposed write API.
    pub mutation_api: MutationApi,
    /// Whether the writable view carries its own freeze operation. When it
    /// does not, refreezing it only restores the flag and pending entries stay
    /// unbound until the outer registry goes through a freeze transition.
    pub writable_freeze: bool,
}

impl Default for HostProfile {
    fn default() -> Self {
        Self {
            mutation_api: MutationApi::Typed,
            writable_freeze: true,
        }
    }
}

/// Engine-owned enchantment entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredEnchantment {
    /// Registry-assigned id.
    pub id: EnchantmentId,
    /// Key the entry was registered under.
    pub key: RegistryKey,
    /// Display description (name line).
    pub description: TextLine,
    /// Items the enchantment may be applied to.
    pub supported_items: BTreeSet<ItemKind>,
    /// Anvil combination cost.
    pub anvil_cost: i32,
    /// Maximum level.
    pub max_level: u8,
    /// Random-offer weight.
    pub weight: i32,
    /// Minimum enchanting cost curve.
    pub minimum_cost: EnchantmentCost,
    /// Maximum enchanting cost curve.
    pub maximum_cost: EnchantmentCost,
    /// Slot groups in which the enchantment is active.
    pub active_slots: Vec<EquipmentSlotGroup>,
}

impl RegisteredEnchantment {
    /// Non-owning handle to this entry.
    pub fn handle(&self) -> EnchantmentHandle {
        EnchantmentHandle {
            id: self.id,
            key: self.key.clone(),
        }
    }

    /// Whether `kind` is in the supported item set.
    pub fn supports(&self, kind: &ItemKind) -> bool {
        self.supported_items.contains(kind)
    }
}

/// Typed builder passed to registration callbacks.
#[derive(Debug, Clone, Default)]
pub struct EnchantmentBuilder {
    description: Option<TextLine>,
    supported_items: BTreeSet<ItemKind>,
    anvil_cost: i32,
    max_level: u8,
    weight: i32,
    minimum_cost: EnchantmentCost,
    maximum_cost: EnchantmentCost,
    active_slots: Vec<EquipmentSlotGroup>,
}

impl EnchantmentBuilder {
    /// Set the description line.
    pub fn description(&mut self, description: TextLine) -> &mut Self {
        self.description = Some(description);
        self
    }

    /// Set the supported items.
    pub fn supported_items(&mut self, items: impl IntoIterator<Item = ItemKind>) -> &mut Self {
        self.supported_items = items.into_iter().collect();
        self
    }

    /// Set the anvil cost.
    pub fn anvil_cost(&mut self, cost: i32) -> &mut Self {
        self.anvil_cost = cost;
        self
    }

    /// Set the maximum level.
    pub fn max_level(&mut self, level: u8) -> &mut Self {
        self.max_level = level;
        self
    }

    /// Set the random-offer weight.
    pub fn weight(&mut self, weight: i32) -> &mut Self {
        self.weight = weight;
        self
    }

    /// Set the minimum cost curve.
    pub fn minimum_cost(&mut self, cost: EnchantmentCost) -> &mut Self {
        self.minimum_cost = cost;
        self
    }

    /// Set the maximum cost curve.
    pub fn maximum_cost(&mut self, cost: EnchantmentCost) -> &mut Self {
        self.maximum_cost = cost;
        self
    }

    /// Set the active slot groups.
    pub fn active_slots(&mut self, slots: impl IntoIterator<Item = EquipmentSlotGroup>) -> &mut Self {
        self.active_slots = slots.into_iter().collect();
        self
    }

    fn build(self, id: EnchantmentId, key: RegistryKey) -> Result<RegisteredEnchantment, HostError> {
        let description = self.description.ok_or(HostError::MissingProperty("description"))?;
        if self.max_level == 0 {
            return Err(HostError::InvalidProperty {
                property: "max_level",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.anvil_cost < 0 {
            return Err(HostError::InvalidProperty {
                property: "anvil_cost",
                reason: format!("{} is negative", self.anvil_cost),
            });
        }
        Ok(RegisteredEnchantment {
            id,
            key,
            description,
            supported_items: self.supported_items,
            anvil_cost: self.anvil_cost,
            max_level: self.max_level,
            weight: self.weight,
            minimum_cost: self.minimum_cost,
            maximum_cost: self.maximum_cost,
            active_slots: self.active_slots,
        })
    }
}

/// A registry layer carrying frozen state.
pub trait Freezable {
    /// Current frozen flag, or `None` when the layer has no frozen state at all.
    fn frozen(&self) -> Option<bool>;

    /// Write the frozen flag directly.
    fn set_frozen(&mut self, frozen: bool);

    /// Run the layer's own freeze operation. Returns `false` when the layer has
    /// none, in which case callers fall back to [`Freezable::set_frozen`].
    fn freeze(&mut self) -> bool;
}

#[derive(Debug, Default)]
struct MappedRegistry {
    entries: Vec<RegisteredEnchantment>,
    bound: HashMap<RegistryKey, EnchantmentId>,
    pending: Vec<EnchantmentId>,
    frozen: bool,
}

impl MappedRegistry {
    fn contains(&self, key: &RegistryKey) -> bool {
        self.bound.contains_key(key)
            || self
                .pending
                .iter()
                .any(|id| self.entries[id.0 as usize].key == *key)
    }

    fn register(&mut self, key: RegistryKey, builder: EnchantmentBuilder) -> Result<EnchantmentId, HostError> {
        if self.frozen {
            return Err(HostError::Frozen(key));
        }
        if self.contains(&key) {
            return Err(HostError::DuplicateKey(key));
        }
        let id = EnchantmentId(self.entries.len() as u32);
        let entry = builder.build(id, key)?;
        debug!(key = %entry.key, id = id.0, "Registered enchantment (pending bind)");
        self.entries.push(entry);
        self.pending.push(id);
        Ok(id)
    }

    fn bind_and_freeze(&mut self) {
        for id in self.pending.drain(..) {
            let key = self.entries[id.0 as usize].key.clone();
            trace!(%key, "Binding enchantment");
            self.bound.insert(key, id);
        }
        self.frozen = true;
    }

    fn unregister(&mut self, key: &RegistryKey) -> Result<(), HostError> {
        if self.frozen {
            return Err(HostError::Frozen(key.clone()));
        }
        self.bound
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| HostError::UnknownKey(key.clone()))
    }
}

/// The engine's enchantment registry (outer access object).
#[derive(Debug)]
pub struct EnchantmentRegistry {
    backing: MappedRegistry,
    profile: HostProfile,
}

impl EnchantmentRegistry {
    /// Create an empty, unfrozen registry for the given engine build.
    pub fn new(profile: HostProfile) -> Self {
        Self {
            backing: MappedRegistry::default(),
            profile,
        }
    }

    /// Engine build characteristics.
    pub fn profile(&self) -> HostProfile {
        self.profile
    }

    /// Look up a bound entry by key.
    pub fn get(&self, key: &RegistryKey) -> Option<&RegisteredEnchantment> {
        self.backing
            .bound
            .get(key)
            .map(|id| &self.backing.entries[id.0 as usize])
    }

    /// Look up an entry by id, bound or not.
    pub fn by_id(&self, id: EnchantmentId) -> Option<&RegisteredEnchantment> {
        self.backing.entries.get(id.0 as usize)
    }

    /// Iterate bound entries in id order.
    pub fn iter_bound(&self) -> impl Iterator<Item = &RegisteredEnchantment> {
        let mut ids: Vec<_> = self.backing.bound.values().copied().collect();
        ids.sort();
        ids.into_iter().map(|id| &self.backing.entries[id.0 as usize])
    }

    /// Number of entries registered over the process lifetime.
    pub fn registered_count(&self) -> usize {
        self.backing.entries.len()
    }

    /// Typed write access. `None` on engine builds without the typed API.
    pub fn writable(&mut self) -> Option<WritableRegistry<'_>> {
        match self.profile.mutation_api {
            MutationApi::Typed => Some(WritableRegistry { registry: self }),
            MutationApi::Dynamic | MutationApi::Sealed => None,
        }
    }

    /// Boot-time registration used by the engine itself, before the first freeze.
    pub fn bootstrap(
        &mut self,
        key: RegistryKey,
        configure: impl FnOnce(&mut EnchantmentBuilder),
    ) -> Result<EnchantmentId, HostError> {
        let mut builder = EnchantmentBuilder::default();
        configure(&mut builder);
        self.backing.register(key, builder)
    }

    pub(crate) fn register_built(
        &mut self,
        key: RegistryKey,
        builder: EnchantmentBuilder,
    ) -> Result<EnchantmentId, HostError> {
        self.backing.register(key, builder)
    }

    pub(crate) fn unregister_key(&mut self, key: &RegistryKey) -> Result<(), HostError> {
        self.backing.unregister(key)
    }
}

impl Freezable for EnchantmentRegistry {
    fn frozen(&self) -> Option<bool> {
        Some(self.backing.frozen)
    }

    fn set_frozen(&mut self, frozen: bool) {
        self.backing.frozen = frozen;
    }

    fn freeze(&mut self) -> bool {
        self.backing.bind_and_freeze();
        true
    }
}

/// Typed write view over the registry.
#[derive(Debug)]
pub struct WritableRegistry<'r> {
    registry: &'r mut EnchantmentRegistry,
}

impl WritableRegistry<'_> {
    /// Register a new entry configured by `configure`.
    pub fn register(
        &mut self,
        key: RegistryKey,
        configure: impl FnOnce(&mut EnchantmentBuilder),
    ) -> Result<EnchantmentId, HostError> {
        let mut builder = EnchantmentBuilder::default();
        configure(&mut builder);
        self.registry.backing.register(key, builder)
    }
}

impl Freezable for WritableRegistry<'_> {
    fn frozen(&self) -> Option<bool> {
        Some(self.registry.backing.frozen)
    }

    fn set_frozen(&mut self, frozen: bool) {
        self.registry.backing.frozen = frozen;
    }

    fn freeze(&mut self) -> bool {
        if !self.registry.profile.writable_freeze {
            return false;
        }
        self.registry.backing.bind_and_freeze();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(path: &str) -> RegistryKey {
        RegistryKey::new("enchantcraft", path).unwrap()
    }

    fn describe(b: &mut EnchantmentBuilder) {
        b.description(TextLine::plain("Test")).max_level(2);
    }

    #[test]
    fn bootstrap_entries_bind_on_first_freeze() {
        let mut registry = EnchantmentRegistry::new(HostProfile::default());
        registry.bootstrap(key("a"), describe).unwrap();
        assert!(registry.get(&key("a")).is_none());
        assert!(registry.freeze());
        assert_eq!(registry.get(&key("a")).unwrap().max_level, 2);
    }

    #[test]
    fn frozen_registry_rejects_registration() {
        let mut registry = EnchantmentRegistry::new(HostProfile::default());
        registry.freeze();
        let mut writable = registry.writable().unwrap();
        assert_eq!(
            writable.register(key("a"), describe),
            Err(HostError::Frozen(key("a")))
        );
    }

    #[test]
    fn duplicate_keys_are_rejected_even_while_pending() {
        let mut registry = EnchantmentRegistry::new(HostProfile::default());
        registry.bootstrap(key("a"), describe).unwrap();
        assert_eq!(
            registry.bootstrap(key("a"), describe),
            Err(HostError::DuplicateKey(key("a")))
        );
    }

    #[test]
    fn builder_requires_description_and_level() {
        let mut registry = EnchantmentRegistry::new(HostProfile::default());
        assert_eq!(
            registry.bootstrap(key("a"), |b| {
                b.max_level(1);
            }),
            Err(HostError::MissingProperty("description"))
        );
        assert!(matches!(
            registry.bootstrap(key("b"), |b| {
                b.description(TextLine::plain("x"));
            }),
            Err(HostError::InvalidProperty { property: "max_level", .. })
        ));
    }

    #[test]
    fn writable_view_without_freeze_leaves_entries_pending() {
        let profile = HostProfile {
            mutation_api: MutationApi::Typed,
            writable_freeze: false,
        };
        let mut registry = EnchantmentRegistry::new(profile);
        registry.freeze();
        {
            let mut writable = registry.writable().unwrap();
            writable.set_frozen(false);
            writable.register(key("late"), describe).unwrap();
            assert!(!writable.freeze());
            writable.set_frozen(true);
        }
        assert!(registry.get(&key("late")).is_none());
        registry.set_frozen(false);
        registry.freeze();
        assert!(registry.get(&key("late")).is_some());
    }

    #[test]
    fn dynamic_builds_have_no_typed_view() {
        let profile = HostProfile {
            mutation_api: MutationApi::Dynamic,
            writable_freeze: true,
        };
        let mut registry = EnchantmentRegistry::new(profile);
        assert!(registry.writable().is_none());
    }
}
