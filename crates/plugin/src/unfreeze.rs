//! Scoped write access to a frozen registry layer.

use std::ops::{Deref, DerefMut};

use enchantcraft_world::Freezable;
use tracing::trace;

/// Holds a registry layer unfrozen for its lifetime.
///
/// On acquire, a frozen target is unfrozen. On drop, a target that was frozen
/// is refrozen through its own freeze operation, or by restoring the flag when
/// it has none. Drop runs on every exit path, so a failed registration still
/// leaves the registry frozen. Targets without frozen state are left alone.
pub struct Unfrozen<'a, T: Freezable + ?Sized> {
    target: &'a mut T,
    was_frozen: bool,
}

impl<'a, T: Freezable + ?Sized> Unfrozen<'a, T> {
    /// Unfreeze `target` until the guard drops.
    pub fn acquire(target: &'a mut T) -> Self {
        let was_frozen = target.frozen() == Some(true);
        if was_frozen {
            target.set_frozen(false);
        }
        Self { target, was_frozen }
    }

    /// Unfreeze and immediately refreeze `target`. Hosts that bind pending
    /// entries on a freeze transition publish them here.
    pub fn cycle(target: &'a mut T) {
        drop(Self::acquire(target));
    }
}

impl<T: Freezable + ?Sized> Deref for Unfrozen<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.target
    }
}

impl<T: Freezable + ?Sized> DerefMut for Unfrozen<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.target
    }
}

impl<T: Freezable + ?Sized> Drop for Unfrozen<'_, T> {
    fn drop(&mut self) {
        if !self.was_frozen {
            return;
        }
        if !self.target.freeze() {
            trace!("Layer has no freeze operation, restoring flag");
            self.target.set_frozen(true);
        }
    }
}
