//! Anvil combination preview.

use enchantcraft_core::ItemStack;

use crate::player::PlayerId;

/// Preview of combining `first` with `second` on an anvil.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareAnvilEvent {
    /// Player at the anvil.
    pub player: PlayerId,
    /// Target item.
    pub first: Option<ItemStack>,
    /// Sacrifice item.
    pub second: Option<ItemStack>,
    /// Previewed result; `None` blocks the combination.
    pub result: Option<ItemStack>,
}

impl PrepareAnvilEvent {
    /// Event with the host's own result preview.
    pub fn preview(player: PlayerId, first: Option<ItemStack>, second: Option<ItemStack>) -> Self {
        let result = match (&first, &second) {
            (Some(first), Some(second)) => Some(combine(first, second)),
            _ => None,
        };
        Self {
            player,
            first,
            second,
            result,
        }
    }
}

/// Merge the sacrifice's enchantments onto the target, keeping the higher
/// level on conflicts and bumping equal levels by one.
pub fn combine(first: &ItemStack, second: &ItemStack) -> ItemStack {
    let mut result = first.clone();
    let incoming = second
        .enchantments
        .iter()
        .chain(second.stored_enchantments.iter());
    for (&id, &level) in incoming {
        let current = result.enchantment_level(id);
        let merged = if current == level {
            level.saturating_add(1)
        } else {
            current.max(level)
        };
        result.enchantments.insert(id, merged);
    }
    result
}
