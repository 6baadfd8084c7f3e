//! Fact-table criteria and log-only triggers used by the headless host.

use std::collections::BTreeMap;
use std::sync::RwLock;

use enchantcraft_world::{Player, PlayerId};
use tracing::{info, warn};

use crate::{CriteriaEvaluator, Criterion, InteractionContext, TriggerDispatcher, TriggerRef};

/// Named numeric facts about one player.
pub type Facts = BTreeMap<String, f64>;

/// Evaluates criteria against per-player fact tables. Missing facts read as 0.
#[derive(Debug, Default)]
pub struct FactCriteria {
    facts: RwLock<BTreeMap<PlayerId, Facts>>,
}

impl FactCriteria {
    /// Empty fact tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one fact for a player.
    pub fn set(&self, player: PlayerId, fact: &str, value: f64) {
        match self.facts.write() {
            Ok(mut facts) => {
                facts.entry(player).or_default().insert(fact.to_string(), value);
            }
            Err(_) => warn!(%player, fact, "Fact table poisoned, update dropped"),
        }
    }

    /// Replace all facts for a player.
    pub fn replace(&self, player: PlayerId, table: Facts) {
        if let Ok(mut facts) = self.facts.write() {
            facts.insert(player, table);
        }
    }

    fn value(&self, player: PlayerId, fact: &str) -> f64 {
        self.facts
            .read()
            .ok()
            .and_then(|facts| facts.get(&player).and_then(|t| t.get(fact)).copied())
            .unwrap_or(0.0)
    }
}

impl CriteriaEvaluator for FactCriteria {
    fn matches(&self, criteria: &[Criterion], player: &Player, _context: &InteractionContext) -> bool {
        criteria
            .iter()
            .all(|c| c.op.holds(self.value(player.id, &c.fact), c.value))
    }
}

/// Dispatcher that only logs what it would run.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTriggers;

impl TriggerDispatcher for LoggingTriggers {
    fn trigger_entries_for(&self, triggers: &[TriggerRef], player: &Player, context: &InteractionContext) {
        for trigger in triggers {
            info!(
                trigger = %trigger.0,
                player = %player.name,
                source = %context.source,
                tick = context.tick.0,
                "Trigger fired"
            );
        }
    }
}
