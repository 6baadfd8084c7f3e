//! Headless demo run: boot a host, load the plugin, log players in through
//! pre-login, equip them from the config and step the simulation.

use anyhow::{Context, Result};
use enchantcraft_core::{EnchantmentId, ItemKind, ItemStack};
use enchantcraft_plugin::{
    derive_keys, DefinitionSource, EnchantmentDefinition, EnchantmentService, ServiceOptions,
};
use enchantcraft_scripting::{FactCriteria, LoggingTriggers};
use enchantcraft_world::{
    bootstrap_vanilla, EnchantmentRegistry, Host, PlayerId, Server,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{DemoItem, HostConfig};
use crate::content_packs::ContentPacks;

/// What a finished run looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Ticks stepped, including those spent waiting on logins.
    pub ticks: u64,
    /// Players online at shutdown.
    pub players_online: usize,
    /// Registry entries at shutdown.
    pub registered: usize,
}

fn resolve(
    registry: &EnchantmentRegistry,
    packs: &ContentPacks,
    namespace: &str,
    definition_id: &str,
) -> Option<EnchantmentId> {
    let def: EnchantmentDefinition = packs.find_by_id(definition_id)?;
    let keys = derive_keys(namespace, &def).ok()?;
    let id = keys
        .iter()
        .find_map(|key| registry.get(key))
        .map(|entry| entry.id);
    id
}

fn build_item(
    registry: &EnchantmentRegistry,
    packs: &ContentPacks,
    namespace: &str,
    spec: &DemoItem,
) -> Result<ItemStack> {
    let kind = ItemKind::parse(&spec.item).with_context(|| format!("Invalid item `{}`", spec.item))?;
    let mut stack = ItemStack::new(kind, 1);
    for (definition_id, level) in &spec.enchantments {
        match resolve(registry, packs, namespace, definition_id) {
            Some(id) => stack = stack.with_enchantment(id, *level),
            None => warn!("Unknown enchantment `{definition_id}` on {}", spec.item),
        }
    }
    Ok(stack)
}

/// Run the configured simulation to completion.
pub fn run(config: &HostConfig, packs: ContentPacks) -> Result<RunReport> {
    let mut registry = EnchantmentRegistry::new(config.host);
    bootstrap_vanilla(&mut registry, &[]);
    let packs = Arc::new(packs);
    let criteria = Arc::new(FactCriteria::new());

    let options = ServiceOptions {
        namespace: config.namespace.clone(),
        pre_login_timeout: config.pre_login_timeout(),
        ..ServiceOptions::default()
    };
    let service = EnchantmentService::new(
        options,
        packs.clone(),
        packs.clone(),
        criteria.clone(),
        Arc::new(LoggingTriggers),
    );

    let mut host = Host::new(Server::new(registry, config.world_seed));
    host.load(Box::new(service));

    let mut ids = Vec::with_capacity(config.players.len());
    for (index, player) in config.players.iter().enumerate() {
        let id = PlayerId(index as u64 + 1);
        criteria.replace(id, player.facts.clone());
        host.server_mut()
            .begin_login(id, &player.name)
            .with_context(|| format!("Failed to start login for {}", player.name))?;
        ids.push(id);
    }
    while host.server().has_pending_logins() {
        host.tick();
        std::thread::yield_now();
    }

    for (id, player) in ids.into_iter().zip(&config.players) {
        let mut items = Vec::with_capacity(player.equipment.len());
        for spec in &player.equipment {
            let stack = build_item(&host.server().registry, &packs, &config.namespace, spec)?;
            items.push((spec.slot, stack));
        }
        let Some(online) = host.server_mut().player_mut(id) else {
            warn!("{} never came online", player.name);
            continue;
        };
        for (slot, stack) in items {
            online.equipment.set(slot, Some(stack));
        }
    }

    info!(ticks = config.ticks, "Simulating");
    for _ in 0..config.ticks {
        host.tick();
    }

    let server = host.shutdown();
    Ok(RunReport {
        ticks: server.tick().0,
        players_online: server.online_players().count(),
        registered: server.registry.registered_count(),
    })
}
