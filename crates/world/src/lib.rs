#![warn(missing_docs)]
//! Host engine model: the frozen enchantment registry, players, table and
//! anvil events, and the tick-driven server that loads plugins.

mod anvil;
mod enchanting;
mod inventory;
mod player;
pub mod reflect;
mod registry;
mod server;
mod vanilla;

pub use anvil::*;
pub use enchanting::*;
pub use inventory::*;
pub use player::*;
pub use registry::*;
pub use server::*;
pub use vanilla::*;
