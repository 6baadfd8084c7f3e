#![warn(missing_docs)]
//! Criteria and trigger hooks consumed by content plugins.
//!
//! Plugins hand criteria lists and trigger references to these interfaces
//! without knowing how they are evaluated or what a trigger does.

mod facts;

use enchantcraft_core::SimTick;
use enchantcraft_world::Player;
use serde::{Deserialize, Serialize};

pub use facts::{FactCriteria, Facts, LoggingTriggers};

/// Where and when an evaluation happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionContext {
    /// Tick of the evaluation.
    pub tick: SimTick,
    /// Label of the content that asked, e.g. a definition id.
    pub source: String,
}

impl InteractionContext {
    /// Context for `source` at `tick`.
    pub fn new(tick: SimTick, source: impl Into<String>) -> Self {
        Self {
            tick,
            source: source.into(),
        }
    }
}

/// Comparison applied by a [`Criterion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `fact == value`
    Eq,
    /// `fact != value`
    Ne,
    /// `fact > value`
    Gt,
    /// `fact >= value`
    #[default]
    Ge,
    /// `fact < value`
    Lt,
    /// `fact <= value`
    Le,
}

impl Comparison {
    /// Apply the comparison.
    pub fn holds(self, fact: f64, value: f64) -> bool {
        match self {
            Comparison::Eq => fact == value,
            Comparison::Ne => fact != value,
            Comparison::Gt => fact > value,
            Comparison::Ge => fact >= value,
            Comparison::Lt => fact < value,
            Comparison::Le => fact <= value,
        }
    }
}

/// One gate condition over a named numeric fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Fact name, e.g. `health` or `in_water`.
    pub fact: String,
    /// Comparison operator.
    #[serde(default)]
    pub op: Comparison,
    /// Right-hand side.
    pub value: f64,
}

/// Reference to an externally defined trigger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerRef(pub String);

impl TriggerRef {
    /// Reference by id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Evaluates a criteria list for a player.
pub trait CriteriaEvaluator: Send + Sync {
    /// Whether every criterion passes for `player`.
    fn matches(&self, criteria: &[Criterion], player: &Player, context: &InteractionContext) -> bool;
}

/// Fires triggers. Fire-and-forget.
pub trait TriggerDispatcher: Send + Sync {
    /// Run each referenced trigger for `player`.
    fn trigger_entries_for(&self, triggers: &[TriggerRef], player: &Player, context: &InteractionContext);
}

/// Criteria evaluator that passes everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysPass;

impl CriteriaEvaluator for AlwaysPass {
    fn matches(&self, _criteria: &[Criterion], _player: &Player, _context: &InteractionContext) -> bool {
        true
    }
}
