//! Enchanting table and anvil hooks.

use enchantcraft_world::{EnchantmentOffer, PrepareAnvilEvent, PrepareEnchantEvent};
use rand::Rng;
use tracing::debug;

use crate::adapter::Binding;
use crate::blacklist::VanillaBlacklist;

/// Strip blacklisted offers, then let each custom definition roll for a slot.
///
/// A definition competes only when its weight is positive and the item is
/// supported. `weight` is a percent chance: the offer is placed when a roll in
/// `0..100` is below it. The winner overwrites a random slot with a random
/// level in `1..=max_level`, keeping that slot's cost or using `slot + 1`.
/// Later definitions may overwrite earlier ones.
pub fn filter_offers(
    event: &mut PrepareEnchantEvent,
    blacklist: &VanillaBlacklist,
    bindings: &[Binding],
    rng: &mut impl Rng,
) {
    if !blacklist.is_empty() {
        for offer in &mut event.offers {
            if offer.is_some_and(|o| blacklist.contains(o.enchantment)) {
                *offer = None;
            }
        }
    }

    if event.offers.is_empty() {
        return;
    }

    for binding in bindings {
        let Some(handle) = binding.primary() else {
            continue;
        };
        let def = &binding.definition;
        if def.weight <= 0 || !def.supports(&event.item.kind) {
            continue;
        }
        if rng.gen_range(0..100) >= def.weight {
            continue;
        }
        let slot = rng.gen_range(0..event.offers.len());
        let level = rng.gen_range(1..=def.max_level.max(1));
        let cost = event.offers[slot].map_or(slot as i32 + 1, |existing| existing.cost);
        debug!(definition = %def.id, slot, level, "Injected enchanting offer");
        event.offers[slot] = Some(EnchantmentOffer {
            enchantment: handle.id,
            level,
            cost,
        });
    }
}

/// Block anvil results that would put a custom enchantment on an item that
/// does not support it. Returns `true` when the result was vetoed.
pub fn veto_anvil(event: &mut PrepareAnvilEvent, bindings: &[Binding]) -> bool {
    let (Some(first), Some(second), Some(result)) = (&event.first, &event.second, &event.result)
    else {
        return false;
    };
    for binding in bindings {
        let Some(handle) = binding.primary() else {
            continue;
        };
        let def = &binding.definition;
        let from_book = second.has_stored_enchantment(handle.id) && !def.supports(&first.kind);
        let onto_unsupported = first.enchantment_level(handle.id) > 0
            && !def.supports(&second.kind)
            && result.enchantment_level(handle.id) > 0;
        if from_book || onto_unsupported {
            debug!(definition = %def.id, "Vetoed anvil result");
            event.result = None;
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::EnchantmentDefinition;
    use enchantcraft_core::{EnchantmentHandle, EnchantmentId, ItemKind, ItemStack, RegistryKey};
    use enchantcraft_world::PlayerId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const CUSTOM: EnchantmentId = EnchantmentId(90);

    fn binding(weight: i32) -> Binding {
        let mut def = EnchantmentDefinition::new("glow", "Glow");
        def.supported_items = vec![ItemKind::parse("diamond_sword").unwrap()];
        def.weight = weight;
        def.max_level = 3;
        Binding {
            definition: def,
            handles: vec![EnchantmentHandle {
                id: CUSTOM,
                key: RegistryKey::new("enchantcraft", "glow").unwrap(),
            }],
        }
    }

    fn offer(id: u32, cost: i32) -> Option<EnchantmentOffer> {
        Some(EnchantmentOffer {
            enchantment: EnchantmentId(id),
            level: 1,
            cost,
        })
    }

    fn sword() -> ItemStack {
        ItemStack::new(ItemKind::parse("diamond_sword").unwrap(), 1)
    }

    fn event(item: ItemStack) -> PrepareEnchantEvent {
        PrepareEnchantEvent {
            player: PlayerId(1),
            item,
            offers: vec![offer(1, 3), offer(2, 7), offer(3, 12)],
        }
    }

    #[test]
    fn weight_at_least_hundred_always_places() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let mut e = event(sword());
            filter_offers(&mut e, &VanillaBlacklist::default(), &[binding(100)], &mut rng);
            let placed: Vec<_> = e.offers.iter().flatten().filter(|o| o.enchantment == CUSTOM).collect();
            assert_eq!(placed.len(), 1);
            let o = placed[0];
            assert!((1..=3).contains(&o.level));
            assert!([3, 7, 12].contains(&o.cost));
        }
    }

    #[test]
    fn non_positive_weight_or_unsupported_item_never_places() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut e = event(sword());
        filter_offers(&mut e, &VanillaBlacklist::default(), &[binding(0)], &mut rng);
        assert_eq!(e, event(sword()));

        let stick = ItemStack::new(ItemKind::parse("stick").unwrap(), 1);
        let mut e = event(stick.clone());
        filter_offers(&mut e, &VanillaBlacklist::default(), &[binding(100)], &mut rng);
        assert_eq!(e, event(stick));
    }

    #[test]
    fn empty_slot_cost_falls_back_to_index() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut e = PrepareEnchantEvent {
            player: PlayerId(1),
            item: sword(),
            offers: vec![None, None, None],
        };
        filter_offers(&mut e, &VanillaBlacklist::default(), &[binding(100)], &mut rng);
        let (slot, o) = e
            .offers
            .iter()
            .enumerate()
            .find_map(|(i, o)| o.map(|o| (i, o)))
            .unwrap();
        assert_eq!(o.cost, slot as i32 + 1);
    }

    #[test]
    fn no_offer_slots_is_a_no_op() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut e = PrepareEnchantEvent {
            player: PlayerId(1),
            item: sword(),
            offers: Vec::new(),
        };
        filter_offers(&mut e, &VanillaBlacklist::default(), &[binding(100)], &mut rng);
        assert!(e.offers.is_empty());
    }

    #[test]
    fn roll_is_a_percent_chance() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut placed = 0;
        for _ in 0..2000 {
            let mut e = event(sword());
            filter_offers(&mut e, &VanillaBlacklist::default(), &[binding(25)], &mut rng);
            if e.offers.iter().flatten().any(|o| o.enchantment == CUSTOM) {
                placed += 1;
            }
        }
        assert!((400..600).contains(&placed), "placed {placed} of 2000");
    }

    fn anvil(first: ItemStack, second: ItemStack) -> PrepareAnvilEvent {
        PrepareAnvilEvent::preview(PlayerId(1), Some(first), Some(second))
    }

    #[test]
    fn book_onto_unsupported_item_is_vetoed() {
        let mut book = ItemStack::new(ItemKind::enchanted_book(), 1);
        book.add_stored_enchantment(CUSTOM, 1, 3, true);

        let mut e = anvil(ItemStack::new(ItemKind::parse("stick").unwrap(), 1), book.clone());
        assert!(veto_anvil(&mut e, &[binding(1)]));
        assert!(e.result.is_none());

        let mut e = anvil(sword(), book);
        assert!(!veto_anvil(&mut e, &[binding(1)]));
        assert!(e.result.is_some());
    }

    #[test]
    fn enchanted_target_with_unsupported_sacrifice_is_vetoed() {
        let enchanted = sword().with_enchantment(CUSTOM, 2);
        let mut e = anvil(enchanted, ItemStack::new(ItemKind::parse("stick").unwrap(), 1));
        assert!(veto_anvil(&mut e, &[binding(1)]));
        assert!(e.result.is_none());
    }

    #[test]
    fn missing_inputs_are_ignored() {
        let mut e = PrepareAnvilEvent::preview(PlayerId(1), Some(sword()), None);
        assert!(!veto_anvil(&mut e, &[binding(1)]));
    }

    #[test]
    fn blacklisted_offers_are_emptied() {
        let blacklist: VanillaBlacklist = [EnchantmentId(2)].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(1);
        let mut e = event(sword());
        filter_offers(&mut e, &blacklist, &[], &mut rng);
        assert_eq!(e.offers, vec![offer(1, 3), None, offer(3, 12)]);
    }
}
