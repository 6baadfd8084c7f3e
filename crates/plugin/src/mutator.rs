//! Registry mutation strategies.
//!
//! Engine builds expose registry writes in one of two shapes. The shape is
//! probed once and the matching [`RegistryMutator`] is kept for the life of
//! the service.

use enchantcraft_core::{EnchantmentCost, EquipmentSlotGroup, ItemKind, RegistryKey, TextLine};
use enchantcraft_world::reflect::{
    DynValue, DynamicObject, METHOD_EMPTY_BUILDER, METHOD_GET, METHOD_REGISTER,
};
use enchantcraft_world::{EnchantmentBuilder, EnchantmentRegistry};
use tracing::debug;

use crate::definition::EnchantmentDefinition;
use crate::error::RegistrationError;
use crate::unfreeze::Unfrozen;

/// Slot groups every custom enchantment is active in.
pub const ACTIVE_SLOTS: [EquipmentSlotGroup; 2] = [EquipmentSlotGroup::Armor, EquipmentSlotGroup::Hand];

/// Registry entry contents derived from a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySpec {
    /// Name line.
    pub description: TextLine,
    /// Supported items.
    pub supported_items: Vec<ItemKind>,
    /// Anvil cost.
    pub anvil_cost: i32,
    /// Maximum level.
    pub max_level: u8,
    /// Offer weight.
    pub weight: i32,
    /// Minimum enchanting cost.
    pub minimum_cost: EnchantmentCost,
    /// Maximum enchanting cost.
    pub maximum_cost: EnchantmentCost,
    /// Active slot groups.
    pub active_slots: Vec<EquipmentSlotGroup>,
}

impl From<&EnchantmentDefinition> for EntrySpec {
    fn from(def: &EnchantmentDefinition) -> Self {
        Self {
            description: def.description(),
            supported_items: def.supported_items.clone(),
            anvil_cost: def.anvil_cost,
            max_level: def.max_level,
            weight: def.weight,
            minimum_cost: def.minimum_cost,
            maximum_cost: def.maximum_cost,
            active_slots: ACTIVE_SLOTS.to_vec(),
        }
    }
}

impl EntrySpec {
    fn apply(&self, builder: &mut EnchantmentBuilder) {
        builder
            .description(self.description.clone())
            .supported_items(self.supported_items.iter().cloned())
            .anvil_cost(self.anvil_cost)
            .max_level(self.max_level)
            .weight(self.weight)
            .minimum_cost(self.minimum_cost)
            .maximum_cost(self.maximum_cost)
            .active_slots(self.active_slots.iter().copied());
    }
}

/// One way of writing a new entry into the host registry.
pub trait RegistryMutator {
    /// Short label for logs.
    fn label(&self) -> &'static str;

    /// Register `spec` under `key`, holding the registry unfrozen for the
    /// duration of the write and refreezing it afterwards on every path.
    fn register(
        &self,
        registry: &mut EnchantmentRegistry,
        key: &RegistryKey,
        spec: &EntrySpec,
    ) -> Result<(), RegistrationError>;
}

/// Writes through the typed writable view.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedMutator;

impl RegistryMutator for TypedMutator {
    fn label(&self) -> &'static str {
        "typed"
    }

    fn register(
        &self,
        registry: &mut EnchantmentRegistry,
        key: &RegistryKey,
        spec: &EntrySpec,
    ) -> Result<(), RegistrationError> {
        let mut writable = registry
            .writable()
            .ok_or(RegistrationError::ApiUnavailable("writable registry"))?;
        let mut unfrozen = Unfrozen::acquire(&mut writable);
        unfrozen.register(key.clone(), |builder| spec.apply(builder))?;
        Ok(())
    }
}

/// Writes through the registry's method table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicMutator;

impl DynamicMutator {
    fn builder(spec: &EntrySpec, bag: &mut enchantcraft_world::reflect::PropertyBag) {
        bag.set("description", DynValue::Text(spec.description.clone()))
            .set("supported_items", DynValue::Items(spec.supported_items.clone()))
            .set("anvil_cost", DynValue::Int(i64::from(spec.anvil_cost)))
            .set("max_level", DynValue::Int(i64::from(spec.max_level)))
            .set("weight", DynValue::Int(i64::from(spec.weight)))
            .set("minimum_cost", DynValue::Cost(spec.minimum_cost))
            .set("maximum_cost", DynValue::Cost(spec.maximum_cost))
            .set("active_slots", DynValue::Slots(spec.active_slots.clone()));
    }
}

impl RegistryMutator for DynamicMutator {
    fn label(&self) -> &'static str {
        "dynamic"
    }

    fn register(
        &self,
        registry: &mut EnchantmentRegistry,
        key: &RegistryKey,
        spec: &EntrySpec,
    ) -> Result<(), RegistrationError> {
        for method in [METHOD_GET, METHOD_EMPTY_BUILDER, METHOD_REGISTER] {
            if !registry.has_method(method) {
                return Err(RegistrationError::ApiUnavailable(method));
            }
        }
        if let DynValue::Handle(existing) =
            registry.invoke(METHOD_GET, vec![DynValue::Key(key.clone())])?
        {
            debug!(key = %existing.key, "Key already bound, nothing to register");
            return Ok(());
        }

        let DynValue::Builder(mut bag) = registry.invoke(METHOD_EMPTY_BUILDER, Vec::new())? else {
            return Err(RegistrationError::UnexpectedReply(METHOD_EMPTY_BUILDER));
        };
        Self::builder(spec, &mut bag);

        let mut unfrozen = Unfrozen::acquire(registry);
        unfrozen.invoke(
            METHOD_REGISTER,
            vec![DynValue::Key(key.clone()), DynValue::Builder(bag)],
        )?;
        Ok(())
    }
}

/// Pick the mutator matching the running engine build.
pub fn probe_mutator(registry: &mut EnchantmentRegistry) -> Box<dyn RegistryMutator> {
    if registry.writable().is_some() {
        Box::new(TypedMutator)
    } else {
        Box::new(DynamicMutator)
    }
}
