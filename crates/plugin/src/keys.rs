//! Registry key derivation for definitions.

use enchantcraft_core::{sanitize_path, RegistryKey};

use crate::definition::EnchantmentDefinition;
use crate::error::RegistrationError;

/// Keys a definition registers under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKeys {
    /// Key derived from the entry name, when valid.
    pub primary: Option<RegistryKey>,
    /// Key derived from the id, when it differs from the name and is valid.
    pub legacy: Option<RegistryKey>,
}

impl DerivedKeys {
    /// Primary key first, then the legacy key if any.
    pub fn iter(&self) -> impl Iterator<Item = &RegistryKey> {
        self.primary.iter().chain(self.legacy.as_ref())
    }
}

/// Derive the primary (name) and legacy (id) keys in `namespace`.
///
/// Each key is validated on its own. Fails only when neither key is usable,
/// e.g. a blank name and a blank id.
pub fn derive_keys(
    namespace: &str,
    def: &EnchantmentDefinition,
) -> Result<DerivedKeys, RegistrationError> {
    let main_name = sanitize_path(&def.name);
    let primary = RegistryKey::new(namespace, &main_name)
        .map_err(|err| RegistrationError::invalid_key(&def.name, err));

    let legacy_name = sanitize_path(&def.id);
    let legacy = if legacy_name == main_name {
        None
    } else {
        RegistryKey::new(namespace, &legacy_name).ok()
    };

    match (primary, legacy) {
        (Ok(primary), legacy) => Ok(DerivedKeys {
            primary: Some(primary),
            legacy,
        }),
        (Err(_), Some(legacy)) => Ok(DerivedKeys {
            primary: None,
            legacy: Some(legacy),
        }),
        (Err(err), None) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn name_and_id_give_two_keys() {
        let def = EnchantmentDefinition::new("a1b2", "My Enchant!");
        let keys = derive_keys("enchantcraft", &def).unwrap();
        assert_eq!(keys.primary.unwrap().to_string(), "enchantcraft:my_enchant_");
        assert_eq!(keys.legacy.unwrap().to_string(), "enchantcraft:a1b2");
    }

    #[test]
    fn equal_sanitized_forms_give_one_key() {
        let def = EnchantmentDefinition::new("frost_bite", "Frost Bite");
        let keys = derive_keys("enchantcraft", &def).unwrap();
        assert!(keys.legacy.is_none());
        assert_eq!(keys.iter().count(), 1);
    }

    #[test]
    fn blank_name_falls_back_to_id() {
        let def = EnchantmentDefinition::new("x", "");
        let keys = derive_keys("enchantcraft", &def).unwrap();
        assert!(keys.primary.is_none());
        assert_eq!(keys.legacy.unwrap().to_string(), "enchantcraft:x");
    }

    #[test]
    fn long_names_keep_their_full_path() {
        let name = format!("Blade of the {}Kings", "Ancient ".repeat(16));
        let def = EnchantmentDefinition::new("ancient_kings", name);
        let keys = derive_keys("enchantcraft", &def).unwrap();
        assert_eq!(keys.primary.unwrap().path().len(), 146);
        assert_eq!(keys.legacy.unwrap().path(), "ancient_kings");
    }

    #[test]
    fn blank_name_and_id_are_rejected() {
        let def = EnchantmentDefinition::new("", "");
        assert!(matches!(
            derive_keys("enchantcraft", &def),
            Err(RegistrationError::InvalidKey { .. })
        ));
    }

    proptest! {
        #[test]
        fn printable_names_always_derive(name in "[ -~]{1,40}", id in "[ -~]{0,40}") {
            let def = EnchantmentDefinition::new(id, name);
            let keys = derive_keys("enchantcraft", &def).unwrap();
            let expected = sanitize_path(&def.name);
            let primary = keys.primary.unwrap();
            prop_assert_eq!(primary.path(), expected.as_str());
            if let Some(legacy) = &keys.legacy {
                prop_assert_ne!(legacy, &primary);
            }
        }
    }
}
