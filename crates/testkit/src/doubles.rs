//! Test doubles for the criteria and trigger interfaces.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use enchantcraft_core::SimTick;
use enchantcraft_scripting::{
    CriteriaEvaluator, Criterion, InteractionContext, TriggerDispatcher, TriggerRef,
};
use enchantcraft_world::Player;
use serde::Serialize;

/// One trigger dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiredTrigger {
    /// Tick of the dispatch.
    pub tick: SimTick,
    /// Player name.
    pub player: String,
    /// Trigger id.
    pub trigger: String,
}

/// Records every dispatched trigger in order.
#[derive(Debug, Default)]
pub struct RecordingTriggers {
    fired: Mutex<Vec<FiredTrigger>>,
}

impl RecordingTriggers {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FiredTrigger>> {
        self.fired.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Everything recorded so far.
    pub fn fired(&self) -> Vec<FiredTrigger> {
        self.lock().clone()
    }

    /// Take and clear the recording.
    pub fn take(&self) -> Vec<FiredTrigger> {
        std::mem::take(&mut *self.lock())
    }

    /// Trigger ids fired so far, in order.
    pub fn names(&self) -> Vec<String> {
        self.lock().iter().map(|f| f.trigger.clone()).collect()
    }

    /// How many times `trigger` fired.
    pub fn count(&self, trigger: &str) -> usize {
        self.lock().iter().filter(|f| f.trigger == trigger).count()
    }
}

impl TriggerDispatcher for RecordingTriggers {
    fn trigger_entries_for(&self, triggers: &[TriggerRef], player: &Player, context: &InteractionContext) {
        let mut fired = self.lock();
        fired.extend(triggers.iter().map(|trigger| FiredTrigger {
            tick: context.tick,
            player: player.name.clone(),
            trigger: trigger.0.clone(),
        }));
    }
}

/// Criteria gate flipped by the test.
#[derive(Debug)]
pub struct ToggleCriteria {
    pass: AtomicBool,
}

impl ToggleCriteria {
    /// Gate starting in the given state.
    pub fn new(pass: bool) -> Self {
        Self {
            pass: AtomicBool::new(pass),
        }
    }

    /// Change the outcome of every later evaluation.
    pub fn set(&self, pass: bool) {
        self.pass.store(pass, Ordering::SeqCst);
    }
}

impl Default for ToggleCriteria {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CriteriaEvaluator for ToggleCriteria {
    fn matches(&self, _criteria: &[Criterion], _player: &Player, _context: &InteractionContext) -> bool {
        self.pass.load(Ordering::SeqCst)
    }
}
