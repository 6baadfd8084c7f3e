//! String-keyed method table over the registry.
//!
//! Engine builds without the typed [`crate::WritableRegistry`] still answer
//! calls by method name. Callers discover what exists with
//! [`DynamicObject::has_method`], build entries through a property bag, and
//! invoke `register` with positional arguments.

use std::collections::BTreeMap;

use enchantcraft_core::{
    EnchantmentCost, EnchantmentHandle, EquipmentSlotGroup, ItemKind, RegistryKey, TextLine,
};

use crate::registry::{EnchantmentBuilder, EnchantmentRegistry, HostError, MutationApi};

/// Method that looks a key up. Args: `[Key]`. Returns `Handle` or `Unit`.
pub const METHOD_GET: &str = "get";
/// Method that hands out an empty builder. Args: `[]`. Returns `Builder`.
pub const METHOD_EMPTY_BUILDER: &str = "empty_builder";
/// Method that registers an entry. Args: `[Key, Builder]`. Returns `Unit`.
pub const METHOD_REGISTER: &str = "register";
/// Method that unbinds a key. Args: `[Key]`. Returns `Unit`.
pub const METHOD_UNREGISTER: &str = "unregister";

const REGISTRY_METHODS: [&str; 4] = [
    METHOD_GET,
    METHOD_EMPTY_BUILDER,
    METHOD_REGISTER,
    METHOD_UNREGISTER,
];

/// Dynamically typed argument or return value.
#[derive(Debug, Clone, PartialEq)]
pub enum DynValue {
    /// No value.
    Unit,
    /// Integer.
    Int(i64),
    /// Registry key.
    Key(RegistryKey),
    /// Enchantment handle.
    Handle(EnchantmentHandle),
    /// Styled text.
    Text(TextLine),
    /// Item kinds.
    Items(Vec<ItemKind>),
    /// Slot groups.
    Slots(Vec<EquipmentSlotGroup>),
    /// Cost curve.
    Cost(EnchantmentCost),
    /// Builder property bag.
    Builder(PropertyBag),
}

/// Builder populated by property name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    properties: BTreeMap<String, DynValue>,
}

impl PropertyBag {
    /// Set a property, replacing any previous value.
    pub fn set(&mut self, name: &str, value: DynValue) -> &mut Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    /// Read a property.
    pub fn get(&self, name: &str) -> Option<&DynValue> {
        self.properties.get(name)
    }

    fn into_builder(self) -> Result<EnchantmentBuilder, HostError> {
        let mut builder = EnchantmentBuilder::default();
        for (name, value) in self.properties {
            match (name.as_str(), value) {
                ("description", DynValue::Text(text)) => {
                    builder.description(text);
                }
                ("supported_items", DynValue::Items(items)) => {
                    builder.supported_items(items);
                }
                ("anvil_cost", DynValue::Int(v)) => {
                    builder.anvil_cost(int_property("anvil_cost", v)?);
                }
                ("max_level", DynValue::Int(v)) => {
                    let level = u8::try_from(v).map_err(|_| HostError::InvalidProperty {
                        property: "max_level",
                        reason: format!("{v} is out of range"),
                    })?;
                    builder.max_level(level);
                }
                ("weight", DynValue::Int(v)) => {
                    builder.weight(int_property("weight", v)?);
                }
                ("minimum_cost", DynValue::Cost(cost)) => {
                    builder.minimum_cost(cost);
                }
                ("maximum_cost", DynValue::Cost(cost)) => {
                    builder.maximum_cost(cost);
                }
                ("active_slots", DynValue::Slots(slots)) => {
                    builder.active_slots(slots);
                }
                (other, value) => {
                    return Err(HostError::BadArguments {
                        method: METHOD_REGISTER.to_string(),
                        reason: format!("unexpected property `{other}` = {value:?}"),
                    });
                }
            }
        }
        Ok(builder)
    }
}

fn int_property(property: &'static str, value: i64) -> Result<i32, HostError> {
    i32::try_from(value).map_err(|_| HostError::InvalidProperty {
        property,
        reason: format!("{value} is out of range"),
    })
}

/// An object answering calls by method name.
pub trait DynamicObject {
    /// Whether `method` exists on this object.
    fn has_method(&self, method: &str) -> bool;

    /// Invoke `method` with positional arguments.
    fn invoke(&mut self, method: &str, args: Vec<DynValue>) -> Result<DynValue, HostError>;
}

impl DynamicObject for EnchantmentRegistry {
    fn has_method(&self, method: &str) -> bool {
        match self.profile().mutation_api {
            MutationApi::Sealed => method == METHOD_GET,
            MutationApi::Typed | MutationApi::Dynamic => REGISTRY_METHODS.contains(&method),
        }
    }

    fn invoke(&mut self, method: &str, args: Vec<DynValue>) -> Result<DynValue, HostError> {
        if !self.has_method(method) {
            return Err(HostError::UnknownMethod(method.to_string()));
        }
        let bad_args = |reason: &str| HostError::BadArguments {
            method: method.to_string(),
            reason: reason.to_string(),
        };
        match method {
            METHOD_GET => match args.as_slice() {
                [DynValue::Key(key)] => Ok(self
                    .get(key)
                    .map(|entry| DynValue::Handle(entry.handle()))
                    .unwrap_or(DynValue::Unit)),
                _ => Err(bad_args("expected [Key]")),
            },
            METHOD_EMPTY_BUILDER => {
                if !args.is_empty() {
                    return Err(bad_args("expected no arguments"));
                }
                Ok(DynValue::Builder(PropertyBag::default()))
            }
            METHOD_REGISTER => {
                let mut args = args.into_iter();
                match (args.next(), args.next(), args.next()) {
                    (Some(DynValue::Key(key)), Some(DynValue::Builder(bag)), None) => {
                        let builder = bag.into_builder()?;
                        self.register_built(key, builder)?;
                        Ok(DynValue::Unit)
                    }
                    _ => Err(bad_args("expected [Key, Builder]")),
                }
            }
            METHOD_UNREGISTER => match args.as_slice() {
                [DynValue::Key(key)] => {
                    self.unregister_key(key)?;
                    Ok(DynValue::Unit)
                }
                _ => Err(bad_args("expected [Key]")),
            },
            other => Err(HostError::UnknownMethod(other.to_string())),
        }
    }
}
