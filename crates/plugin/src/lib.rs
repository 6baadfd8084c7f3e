#![warn(missing_docs)]
//! Declarative custom enchantments.
//!
//! [`EnchantmentService`] is the plugin entry point. It injects operator
//! definitions into the host's frozen enchantment registry, tracks per-player
//! activation every tick and filters enchanting table and anvil results.

mod adapter;
mod blacklist;
mod book;
mod definition;
mod error;
mod filters;
mod keys;
mod mutator;
mod query;
mod service;
mod sync;
mod tracker;
mod unfreeze;

pub use adapter::{Binding, RegistryAdapter};
pub use blacklist::VanillaBlacklist;
pub use book::{to_roman, GiveEnchantmentBook};
pub use definition::{ActiveTriggers, EnchantmentDefinition, VanillaEnchantmentBlacklistDefinition};
pub use error::{RegistrationError, SyncCallError};
pub use filters::{filter_offers, veto_anvil};
pub use keys::{derive_keys, DerivedKeys};
pub use mutator::{probe_mutator, DynamicMutator, EntrySpec, RegistryMutator, TypedMutator};
pub use query::{DefinitionSource, HasId, StaticSource};
pub use service::{EnchantmentService, PreLoginHandler, ServiceOptions, DEFAULT_NAMESPACE};
pub use sync::{RegistrationSummary, SyncEndpoint, SyncHandle, SyncRequest};
pub use tracker::ActivationTracker;
pub use unfreeze::Unfrozen;
