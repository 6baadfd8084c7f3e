//! Query-by-type access to definitions.

use std::sync::RwLock;

/// Source of every definition of type `T`.
pub trait DefinitionSource<T> {
    /// All definitions currently known, in a stable order.
    fn find_all(&self) -> Vec<T>;

    /// Definition with the given id.
    fn find_by_id(&self, id: &str) -> Option<T>
    where
        T: HasId,
    {
        self.find_all().into_iter().find(|def| def.id() == id)
    }
}

/// Definitions addressable by id.
pub trait HasId {
    /// Stable id.
    fn id(&self) -> &str;
}

impl HasId for crate::EnchantmentDefinition {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for crate::VanillaEnchantmentBlacklistDefinition {
    fn id(&self) -> &str {
        &self.id
    }
}

/// In-memory source; definitions can be added at runtime.
#[derive(Debug, Default)]
pub struct StaticSource<T> {
    items: RwLock<Vec<T>>,
}

impl<T: Clone> StaticSource<T> {
    /// Source holding `items`.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Append a definition.
    pub fn push(&self, item: T) {
        if let Ok(mut items) = self.items.write() {
            items.push(item);
        }
    }
}

impl<T: Clone> DefinitionSource<T> for StaticSource<T> {
    fn find_all(&self) -> Vec<T> {
        self.items.read().map(|items| items.clone()).unwrap_or_default()
    }
}
