//! Per-tick activation state machine.
//!
//! Every tick, for each online player and each bound definition, the tracker
//! computes the effective level from the fixed equipment slot list, applies
//! the definition's criteria and fires triggers on the edges:
//!
//! - cooldown on: while eligible, the exact-level trigger list re-fires each
//!   time the cooldown has elapsed and the state is `ACTIVE` in between
//! - cooldown off: the exact-level list fires once on `INACTIVE -> ACTIVE`
//! - in both modes losing eligibility fires the inactive list once, at once

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use enchantcraft_core::SimTick;
use enchantcraft_scripting::{CriteriaEvaluator, InteractionContext, TriggerDispatcher};
use enchantcraft_world::{Player, PlayerId};
use tracing::{debug, trace};

use crate::adapter::Binding;

/// Activation and cooldown state for every (player, definition) pair.
#[derive(Debug, Default)]
pub struct ActivationTracker {
    active: BTreeMap<PlayerId, BTreeSet<String>>,
    last_run: BTreeMap<(PlayerId, String), Duration>,
}

impl ActivationTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the definition is currently active for the player.
    pub fn is_active(&self, player: PlayerId, definition_id: &str) -> bool {
        self.active
            .get(&player)
            .is_some_and(|defs| defs.contains(definition_id))
    }

    /// Players with any tracked state.
    pub fn tracked_players(&self) -> usize {
        let mut players: BTreeSet<PlayerId> = self.active.keys().copied().collect();
        players.extend(self.last_run.keys().map(|(player, _)| *player));
        players.len()
    }

    /// Forget all state.
    pub fn clear(&mut self) {
        self.active.clear();
        self.last_run.clear();
    }

    /// Evaluate one tick.
    pub fn tick<'p>(
        &mut self,
        now: SimTick,
        bindings: &[Binding],
        players: impl IntoIterator<Item = &'p Player>,
        criteria: &dyn CriteriaEvaluator,
        triggers: &dyn TriggerDispatcher,
        context_source: &str,
    ) {
        let elapsed = now.elapsed();
        let context = InteractionContext::new(now, context_source);
        let mut online = BTreeSet::new();
        for player in players {
            online.insert(player.id);
            for binding in bindings {
                self.check(player, binding, elapsed, &context, criteria, triggers);
            }
        }
        self.prune(&online);
    }

    fn check(
        &mut self,
        player: &Player,
        binding: &Binding,
        now: Duration,
        context: &InteractionContext,
        criteria: &dyn CriteriaEvaluator,
        triggers: &dyn TriggerDispatcher,
    ) {
        let def = &binding.definition;
        let level = binding
            .handles
            .iter()
            .map(|handle| player.equipped_level(handle.id, |item| def.supports(&item.kind)))
            .max()
            .unwrap_or(0);
        let player_active = self.active.entry(player.id).or_default();
        let was_active = player_active.contains(&def.id);
        let eligible = level > 0 && criteria.matches(&def.criteria, player, context);

        if eligible {
            let fire = if def.cooldown_enabled {
                let last_key = (player.id, def.id.clone());
                let ready = self
                    .last_run
                    .get(&last_key)
                    .map_or(true, |last| now.saturating_sub(*last) >= def.cooldown());
                if ready {
                    self.last_run.insert(last_key, now);
                }
                ready
            } else {
                !was_active
            };
            if fire {
                match def.triggers_for_level(level) {
                    Some(list) => triggers.trigger_entries_for(list, player, context),
                    None => trace!(definition = %def.id, level, "No active triggers for level"),
                }
            }
            if !was_active {
                debug!(player = %player.name, definition = %def.id, level, "Enchantment active");
                self.active.entry(player.id).or_default().insert(def.id.clone());
            }
        } else if was_active {
            triggers.trigger_entries_for(&def.inactive_triggers, player, context);
            if let Some(defs) = self.active.get_mut(&player.id) {
                defs.remove(&def.id);
            }
            debug!(player = %player.name, definition = %def.id, "Enchantment inactive");
        }
    }

    fn prune(&mut self, online: &BTreeSet<PlayerId>) {
        self.active.retain(|player, _| online.contains(player));
        self.last_run.retain(|(player, _), _| online.contains(player));
    }
}
