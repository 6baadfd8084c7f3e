//! Fixture builders shared by integration tests.

use enchantcraft_core::{EnchantmentId, ItemKind, ItemStack};
use enchantcraft_world::{
    bootstrap_vanilla, EnchantmentRegistry, EquipmentSlot, HostProfile, Player, PlayerId, Server,
};

/// Server whose registry holds every built-in enchantment.
pub fn vanilla_server(profile: HostProfile, world_seed: u64) -> Server {
    let mut registry = EnchantmentRegistry::new(profile);
    bootstrap_vanilla(&mut registry, &[]);
    Server::new(registry, world_seed)
}

/// Item of `kind`, panicking on an invalid key. Test input only.
pub fn item(kind: &str) -> ItemStack {
    match ItemKind::parse(kind) {
        Ok(kind) => ItemStack::new(kind, 1),
        Err(err) => panic!("invalid item kind `{kind}`: {err}"),
    }
}

/// Player holding `kind` in the main hand, enchanted with `id` at `level`.
pub fn holding(id: PlayerId, name: &str, kind: &str, enchantment: EnchantmentId, level: u8) -> Player {
    let mut player = Player::new(id, name);
    player
        .equipment
        .set(EquipmentSlot::MainHand, Some(item(kind).with_enchantment(enchantment, level)));
    player
}
