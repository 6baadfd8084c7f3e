//! Idempotent injection of definitions into the host registry.
//!
//! Each definition is bound under its primary (name) key and, when different,
//! its legacy (id) key. Keys already bound are recorded as-is; missing keys
//! are written through the probed [`RegistryMutator`], then the outer registry
//! is cycled through a freeze so hosts that bind on freeze publish the entry,
//! then the key is resolved again. Failures degrade to a missing enchantment
//! and are never propagated.

use std::collections::BTreeMap;

use enchantcraft_core::{EnchantmentHandle, RegistryKey};
use enchantcraft_world::reflect::{DynValue, DynamicObject, METHOD_UNREGISTER};
use enchantcraft_world::EnchantmentRegistry;
use tracing::{debug, warn};

use crate::definition::EnchantmentDefinition;
use crate::keys::derive_keys;
use crate::mutator::{probe_mutator, EntrySpec, RegistryMutator};
use crate::unfreeze::Unfrozen;

/// A definition together with the registry handles it resolved to.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Latest copy of the definition.
    pub definition: EnchantmentDefinition,
    /// Distinct handles in the order they were recorded.
    pub handles: Vec<EnchantmentHandle>,
}

impl Binding {
    /// First recorded handle.
    pub fn primary(&self) -> Option<&EnchantmentHandle> {
        self.handles.first()
    }
}

#[derive(Debug, Default)]
struct Bindings {
    by_definition: Vec<Binding>,
    by_key: BTreeMap<RegistryKey, (String, EnchantmentHandle)>,
}

impl Bindings {
    fn record(&mut self, def: &EnchantmentDefinition, key: &RegistryKey, handle: EnchantmentHandle) {
        self.by_key
            .insert(key.clone(), (def.id.clone(), handle.clone()));
        match self
            .by_definition
            .iter_mut()
            .find(|binding| binding.definition.id == def.id)
        {
            Some(binding) => {
                binding.definition = def.clone();
                if !binding.handles.contains(&handle) {
                    binding.handles.push(handle);
                }
            }
            None => self.by_definition.push(Binding {
                definition: def.clone(),
                handles: vec![handle],
            }),
        }
    }

    fn resolve(&mut self, registry: &EnchantmentRegistry, def: &EnchantmentDefinition, key: &RegistryKey) -> bool {
        match registry.get(key) {
            Some(entry) => {
                self.record(def, key, entry.handle());
                true
            }
            None => false,
        }
    }
}

/// Registers definitions and remembers what they resolved to.
pub struct RegistryAdapter {
    namespace: String,
    mutator: Option<Box<dyn RegistryMutator>>,
    bindings: Bindings,
}

impl std::fmt::Debug for RegistryAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryAdapter")
            .field("namespace", &self.namespace)
            .field("mutator", &self.mutator.as_ref().map(|m| m.label()))
            .field("bindings", &self.bindings.by_definition.len())
            .finish()
    }
}

impl RegistryAdapter {
    /// Adapter registering under `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            mutator: None,
            bindings: Bindings::default(),
        }
    }

    /// Namespace custom keys live in.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Label of the probed mutator, once one was needed.
    pub fn mutator_label(&self) -> Option<&'static str> {
        self.mutator.as_ref().map(|m| m.label())
    }

    /// Make sure `def` is bound in `registry` and recorded here.
    ///
    /// Safe to call any number of times; once a key is bound it is only
    /// looked up again.
    pub fn ensure_registered(&mut self, registry: &mut EnchantmentRegistry, def: &EnchantmentDefinition) {
        let keys = match derive_keys(&self.namespace, def) {
            Ok(keys) => keys,
            Err(err) => {
                warn!(definition = %def.id, error = %err, "Cannot derive registry key, enchantment skipped");
                return;
            }
        };

        if let Some(primary) = &keys.primary {
            if self.bindings.resolve(registry, def, primary) {
                if let Some(legacy) = &keys.legacy {
                    self.bindings.resolve(registry, def, legacy);
                }
                return;
            }
        }

        let mutator = self.mutator.get_or_insert_with(|| {
            let mutator = probe_mutator(registry);
            debug!(mutator = mutator.label(), "Probed registry mutation API");
            mutator
        });
        let spec = EntrySpec::from(def);
        for key in keys.iter() {
            if self.bindings.resolve(registry, def, key) {
                continue;
            }
            match mutator.register(registry, key, &spec) {
                Ok(()) => {
                    Unfrozen::cycle(registry);
                    debug!(%key, definition = %def.id, mutator = mutator.label(), "Registered enchantment");
                }
                Err(err) => {
                    warn!(%key, definition = %def.id, error = %err, "Failed to register enchantment");
                }
            }
            if !self.bindings.resolve(registry, def, key) {
                debug!(%key, "Key still unbound after registration");
            }
        }
    }

    /// First handle recorded for the definition with `definition_id`.
    pub fn enchantment_for(&self, definition_id: &str) -> Option<&EnchantmentHandle> {
        self.bindings
            .by_definition
            .iter()
            .find(|binding| binding.definition.id == definition_id)
            .and_then(Binding::primary)
    }

    /// Handle recorded under `key` and the id of its definition.
    pub fn handle_for_key(&self, key: &RegistryKey) -> Option<(&str, &EnchantmentHandle)> {
        self.bindings
            .by_key
            .get(key)
            .map(|(id, handle)| (id.as_str(), handle))
    }

    /// Bound definitions in first-recorded order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings.by_definition
    }

    /// Try to unbind `key` from the host. Best effort: failures are logged at
    /// debug level and the local record is kept.
    pub fn unregister(&self, registry: &mut EnchantmentRegistry, key: &RegistryKey) {
        if !registry.has_method(METHOD_UNREGISTER) {
            debug!(%key, "Registry cannot unregister");
            return;
        }
        let mut unfrozen = Unfrozen::acquire(registry);
        if let Err(err) = unfrozen.invoke(METHOD_UNREGISTER, vec![DynValue::Key(key.clone())]) {
            debug!(%key, error = %err, "Unregister failed");
        }
    }

    /// Forget every binding and the probed mutator. Host entries stay bound.
    pub fn clear(&mut self) {
        self.bindings = Bindings::default();
        self.mutator = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enchantcraft_core::ItemKind;
    use enchantcraft_world::{bootstrap_vanilla, Freezable, HostProfile, MutationApi};

    fn registry(mutation_api: MutationApi, writable_freeze: bool) -> EnchantmentRegistry {
        let mut registry = EnchantmentRegistry::new(HostProfile {
            mutation_api,
            writable_freeze,
        });
        bootstrap_vanilla(&mut registry, &[]);
        registry
    }

    fn glow() -> EnchantmentDefinition {
        let mut def = EnchantmentDefinition::new("glow_v1", "Glow");
        def.max_level = 2;
        def.supported_items = vec![ItemKind::parse("diamond_sword").unwrap()];
        def
    }

    fn key(path: &str) -> RegistryKey {
        RegistryKey::new("enchantcraft", path).unwrap()
    }

    #[test]
    fn registers_primary_and_legacy_keys() {
        let mut registry = registry(MutationApi::Typed, true);
        let mut adapter = RegistryAdapter::new("enchantcraft");
        adapter.ensure_registered(&mut registry, &glow());

        assert!(registry.get(&key("glow")).is_some());
        assert!(registry.get(&key("glow_v1")).is_some());
        assert_eq!(adapter.bindings().len(), 1);
        assert_eq!(adapter.bindings()[0].handles.len(), 2);
        assert_eq!(adapter.enchantment_for("glow_v1").unwrap().key, key("glow"));
        assert_eq!(registry.frozen(), Some(true));
        assert_eq!(adapter.mutator_label(), Some("typed"));
    }

    #[test]
    fn repeated_calls_do_not_register_again() {
        let mut registry = registry(MutationApi::Typed, true);
        let mut adapter = RegistryAdapter::new("enchantcraft");
        adapter.ensure_registered(&mut registry, &glow());
        let count = registry.registered_count();
        let first = adapter.enchantment_for("glow_v1").cloned();
        for _ in 0..5 {
            adapter.ensure_registered(&mut registry, &glow());
        }
        assert_eq!(registry.registered_count(), count);
        assert_eq!(adapter.enchantment_for("glow_v1").cloned(), first);
        assert_eq!(adapter.bindings()[0].handles.len(), 2);
    }

    #[test]
    fn outer_freeze_cycle_publishes_pending_entries() {
        let mut registry = registry(MutationApi::Typed, false);
        let mut adapter = RegistryAdapter::new("enchantcraft");
        adapter.ensure_registered(&mut registry, &glow());
        assert!(registry.get(&key("glow")).is_some());
        assert!(adapter.enchantment_for("glow_v1").is_some());
    }

    #[test]
    fn dynamic_builds_use_method_table() {
        let mut registry = registry(MutationApi::Dynamic, false);
        let mut adapter = RegistryAdapter::new("enchantcraft");
        adapter.ensure_registered(&mut registry, &glow());
        assert_eq!(adapter.mutator_label(), Some("dynamic"));
        assert!(registry.get(&key("glow")).is_some());
        assert!(registry.get(&key("glow_v1")).is_some());
    }

    #[test]
    fn invalid_definitions_are_swallowed() {
        let mut registry = registry(MutationApi::Typed, true);
        let mut adapter = RegistryAdapter::new("enchantcraft");
        let mut bad = glow();
        bad.max_level = 0;
        adapter.ensure_registered(&mut registry, &bad);
        adapter.ensure_registered(&mut registry, &EnchantmentDefinition::new("", ""));
        assert!(adapter.bindings().is_empty());
        assert_eq!(registry.frozen(), Some(true));
    }

    #[test]
    fn dynamic_failures_leave_keys_unbound() {
        let mut registry = registry(MutationApi::Dynamic, false);
        let mut adapter = RegistryAdapter::new("enchantcraft");
        let mut bad = glow();
        bad.max_level = 0;
        let before = registry.registered_count();
        adapter.ensure_registered(&mut registry, &bad);

        assert_eq!(adapter.mutator_label(), Some("dynamic"));
        assert!(adapter.bindings().is_empty());
        assert!(registry.get(&key("glow")).is_none());
        assert!(registry.get(&key("glow_v1")).is_none());
        assert_eq!(registry.registered_count(), before);
        assert_eq!(registry.frozen(), Some(true));
    }

    #[test]
    fn sealed_builds_register_nothing() {
        let mut registry = registry(MutationApi::Sealed, false);
        let mut adapter = RegistryAdapter::new("enchantcraft");
        let before = registry.registered_count();
        adapter.ensure_registered(&mut registry, &glow());
        adapter.ensure_registered(&mut registry, &glow());

        assert_eq!(adapter.mutator_label(), Some("dynamic"));
        assert!(adapter.bindings().is_empty());
        assert!(adapter.enchantment_for("glow_v1").is_none());
        assert_eq!(registry.registered_count(), before);
        assert_eq!(registry.frozen(), Some(true));
    }

    #[test]
    fn long_names_register_both_keys() {
        let mut registry = registry(MutationApi::Typed, true);
        let mut adapter = RegistryAdapter::new("enchantcraft");
        let name = format!("Blade of the {}Kings", "Ancient ".repeat(16));
        let mut def = EnchantmentDefinition::new("ancient_kings", name.clone());
        def.supported_items = vec![ItemKind::parse("diamond_sword").unwrap()];
        adapter.ensure_registered(&mut registry, &def);

        let primary = key(&enchantcraft_core::sanitize_path(&name));
        assert_eq!(primary.path().len(), 146);
        assert!(registry.get(&primary).is_some());
        assert!(registry.get(&key("ancient_kings")).is_some());
        assert_eq!(adapter.bindings()[0].handles.len(), 2);
        assert_eq!(adapter.enchantment_for("ancient_kings").unwrap().key, primary);
    }

    #[test]
    fn blank_name_still_registers_legacy_key() {
        let mut registry = registry(MutationApi::Typed, true);
        let mut adapter = RegistryAdapter::new("enchantcraft");
        let def = EnchantmentDefinition::new("nameless", "");
        adapter.ensure_registered(&mut registry, &def);
        assert!(registry.get(&key("nameless")).is_some());
        assert_eq!(adapter.enchantment_for("nameless").unwrap().key, key("nameless"));
    }

    #[test]
    fn existing_keys_from_another_path_are_adopted() {
        let mut registry = registry(MutationApi::Typed, true);
        RegistryAdapter::new("enchantcraft").ensure_registered(&mut registry, &glow());
        let count = registry.registered_count();

        let mut fresh = RegistryAdapter::new("enchantcraft");
        fresh.ensure_registered(&mut registry, &glow());
        assert_eq!(registry.registered_count(), count);
        assert_eq!(fresh.bindings()[0].handles.len(), 2);
        assert!(fresh.mutator_label().is_none());
    }

    #[test]
    fn legacy_key_alone_still_binds_primary() {
        let mut registry = registry(MutationApi::Typed, true);
        let mut renamed = glow();
        renamed.name = "Old Glow".into();
        let mut adapter = RegistryAdapter::new("enchantcraft");
        adapter.ensure_registered(&mut registry, &renamed);

        adapter.ensure_registered(&mut registry, &glow());
        let handles = &adapter.bindings()[0].handles;
        assert_eq!(handles.len(), 3);
        assert!(adapter.handle_for_key(&key("glow")).is_some());
        assert!(adapter.handle_for_key(&key("old_glow")).is_some());
    }

    #[test]
    fn unregister_is_best_effort() {
        let mut registry = registry(MutationApi::Typed, true);
        let mut adapter = RegistryAdapter::new("enchantcraft");
        adapter.ensure_registered(&mut registry, &glow());
        adapter.unregister(&mut registry, &key("glow"));
        assert!(registry.get(&key("glow")).is_none());
        adapter.unregister(&mut registry, &key("never_there"));
        assert_eq!(registry.frozen(), Some(true));
    }
}
