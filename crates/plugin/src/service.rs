//! The owning service wired into the host plugin lifecycle.

use std::sync::Arc;
use std::time::Duration;

use enchantcraft_core::{mix_domain, EnchantmentHandle};
use enchantcraft_scripting::{CriteriaEvaluator, TriggerDispatcher};
use enchantcraft_world::{
    EnchantmentRegistry, EventKind, ListenerId, Plugin, PlayerId, PreLoginEvent, PreLoginListener,
    Server, ServerEvent, TaskId,
};
use tracing::{debug, error, info, warn};

use crate::adapter::RegistryAdapter;
use crate::blacklist::VanillaBlacklist;
use crate::book::GiveEnchantmentBook;
use crate::definition::{EnchantmentDefinition, VanillaEnchantmentBlacklistDefinition};
use crate::filters::{filter_offers, veto_anvil};
use crate::query::DefinitionSource;
use crate::sync::{self, RegistrationSummary, SyncEndpoint, SyncHandle, SyncRequest};
use crate::tracker::ActivationTracker;

/// Namespace custom enchantments are registered under.
pub const DEFAULT_NAMESPACE: &str = "enchantcraft";

const PLUGIN_NAME: &str = "enchantcraft";

/// RNG domain for enchanting table offers.
const OFFER_DOMAIN: u64 = 0x656e_6368_616e_7473;

/// Tunables for [`EnchantmentService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Namespace of custom registry keys.
    pub namespace: String,
    /// Longest a pre-login waits for the main thread.
    pub pre_login_timeout: Duration,
    /// Ticks between activation passes.
    pub tick_period: u64,
    /// Ticks before the first activation pass.
    pub tick_delay: u64,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            pre_login_timeout: Duration::from_secs(10),
            tick_period: 1,
            tick_delay: 1,
        }
    }
}

/// Pre-login listener that blocks the connection thread until every
/// definition is registered on the main thread.
#[derive(Debug)]
pub struct PreLoginHandler {
    sync: SyncHandle,
}

impl PreLoginHandler {
    /// Listener forwarding through `sync`.
    pub fn new(sync: SyncHandle) -> Self {
        Self { sync }
    }
}

impl PreLoginListener for PreLoginHandler {
    fn on_pre_login(&self, event: &PreLoginEvent) {
        match self.sync.prepare_login(event.player) {
            Ok(summary) => debug!(
                player = %event.name,
                definitions = summary.definitions,
                keys = summary.bound_keys,
                "Enchantments ready for login"
            ),
            Err(err) => error!(
                player = %event.name,
                error = %err,
                "Failed to register enchantments during pre-login"
            ),
        }
    }
}

/// Custom enchantment service.
///
/// Created once at plugin load and torn down on disable; owns the adapter's
/// lookup tables, activation state and resolved blacklist. Entries it
/// registered stay bound in the host after shutdown.
pub struct EnchantmentService {
    options: ServiceOptions,
    definitions: Arc<dyn DefinitionSource<EnchantmentDefinition>>,
    blacklists: Arc<dyn DefinitionSource<VanillaEnchantmentBlacklistDefinition>>,
    criteria: Arc<dyn CriteriaEvaluator>,
    triggers: Arc<dyn TriggerDispatcher>,
    adapter: RegistryAdapter,
    tracker: ActivationTracker,
    blacklist: VanillaBlacklist,
    task: Option<TaskId>,
    listener: Option<ListenerId>,
    endpoint: Option<SyncEndpoint>,
}

impl std::fmt::Debug for EnchantmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnchantmentService")
            .field("options", &self.options)
            .field("adapter", &self.adapter)
            .field("blacklist", &self.blacklist.len())
            .field("task", &self.task)
            .field("listener", &self.listener)
            .finish()
    }
}

impl EnchantmentService {
    /// Service reading definitions from the given sources.
    pub fn new(
        options: ServiceOptions,
        definitions: Arc<dyn DefinitionSource<EnchantmentDefinition>>,
        blacklists: Arc<dyn DefinitionSource<VanillaEnchantmentBlacklistDefinition>>,
        criteria: Arc<dyn CriteriaEvaluator>,
        triggers: Arc<dyn TriggerDispatcher>,
    ) -> Self {
        let adapter = RegistryAdapter::new(options.namespace.clone());
        Self {
            options,
            definitions,
            blacklists,
            criteria,
            triggers,
            adapter,
            tracker: ActivationTracker::new(),
            blacklist: VanillaBlacklist::default(),
            task: None,
            listener: None,
            endpoint: None,
        }
    }

    /// Options the service was built with.
    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Registry adapter and its bindings.
    pub fn adapter(&self) -> &RegistryAdapter {
        &self.adapter
    }

    /// Resolved vanilla blacklist.
    pub fn blacklist(&self) -> &VanillaBlacklist {
        &self.blacklist
    }

    /// Whether the service is enabled.
    pub fn is_enabled(&self) -> bool {
        self.task.is_some()
    }

    /// Make sure one definition is registered.
    pub fn ensure_registered(&mut self, registry: &mut EnchantmentRegistry, def: &EnchantmentDefinition) {
        self.adapter.ensure_registered(registry, def);
    }

    /// Register every known definition and reload the blacklist.
    pub fn register_all(&mut self, registry: &mut EnchantmentRegistry) -> RegistrationSummary {
        for def in self.definitions.find_all() {
            self.adapter.ensure_registered(registry, &def);
        }
        self.reload_blacklist(registry);
        let bindings = self.adapter.bindings();
        RegistrationSummary {
            definitions: bindings.len(),
            bound_keys: bindings.iter().map(|binding| binding.handles.len()).sum(),
            blacklisted: self.blacklist.len(),
        }
    }

    /// Resolve every blacklist definition against `registry`.
    pub fn reload_blacklist(&mut self, registry: &EnchantmentRegistry) {
        self.blacklist = VanillaBlacklist::resolve(registry, &self.blacklists.find_all());
    }

    /// First handle recorded for a definition.
    pub fn enchantment_for(&self, definition_id: &str) -> Option<&EnchantmentHandle> {
        self.adapter.enchantment_for(definition_id)
    }

    /// Whether the definition is active for the player.
    pub fn is_active(&self, player: PlayerId, definition_id: &str) -> bool {
        self.tracker.is_active(player, definition_id)
    }

    /// Give a player enchanted books. Returns `false` and does nothing when
    /// the definition, its registry entry or the player is missing.
    pub fn give_book(&mut self, server: &mut Server, player: PlayerId, action: &GiveEnchantmentBook) -> bool {
        let Some(def) = self.definitions.find_by_id(&action.enchantment) else {
            debug!(definition = %action.enchantment, "Unknown enchantment for book");
            return false;
        };
        self.adapter.ensure_registered(&mut server.registry, &def);
        let Some(handle) = self.adapter.enchantment_for(&def.id) else {
            debug!(definition = %def.id, "Enchantment not registered, no book given");
            return false;
        };
        let book = action.build(&def, handle);
        match server.player_mut(player) {
            Some(target) => {
                target.give(book);
                true
            }
            None => false,
        }
    }

    fn serve_requests(&mut self, server: &mut Server) {
        let Some(endpoint) = &self.endpoint else {
            return;
        };
        let requests = endpoint.drain();
        for request in requests {
            match request {
                SyncRequest::PrepareLogin { player, respond_to } => {
                    let summary = self.register_all(&mut server.registry);
                    if respond_to.send(summary).is_err() {
                        warn!(%player, "Pre-login gave up before registration finished");
                    }
                }
            }
        }
    }
}

impl Plugin for EnchantmentService {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn enable(&mut self, server: &mut Server) {
        let summary = self.register_all(&mut server.registry);
        info!(
            definitions = summary.definitions,
            keys = summary.bound_keys,
            blacklisted = summary.blacklisted,
            "Custom enchantments registered"
        );

        let (handle, endpoint) = sync::channel(self.options.pre_login_timeout);
        self.endpoint = Some(endpoint);
        let pre_login: Arc<dyn PreLoginListener> = Arc::new(PreLoginHandler::new(handle));
        self.listener = Some(server.events.register(
            PLUGIN_NAME,
            [EventKind::PrepareEnchant, EventKind::PrepareAnvil],
            Some(pre_login),
        ));

        let now = server.tick();
        self.task = Some(server.scheduler.run_task_timer(
            PLUGIN_NAME,
            now,
            self.options.tick_delay,
            self.options.tick_period,
        ));
    }

    fn disable(&mut self, server: &mut Server) {
        if let Some(task) = self.task.take() {
            server.scheduler.cancel(task);
        }
        if let Some(listener) = self.listener.take() {
            server.events.unregister(listener);
        }
        self.endpoint = None;
        self.adapter.clear();
        self.tracker.clear();
        self.blacklist = VanillaBlacklist::default();
        info!("Custom enchantments disabled");
    }

    fn on_tick(&mut self, server: &mut Server) {
        self.serve_requests(server);
    }

    fn on_task(&mut self, task: TaskId, server: &mut Server) {
        if self.task != Some(task) {
            return;
        }
        self.tracker.tick(
            server.tick(),
            self.adapter.bindings(),
            server.online_players(),
            self.criteria.as_ref(),
            self.triggers.as_ref(),
            PLUGIN_NAME,
        );
    }

    fn on_event(&mut self, event: ServerEvent<'_>, server: &mut Server) {
        match event {
            ServerEvent::PrepareEnchant(event) => {
                let mut rng = server.rng(mix_domain(OFFER_DOMAIN, event.player.0));
                filter_offers(event, &self.blacklist, self.adapter.bindings(), &mut rng);
            }
            ServerEvent::PrepareAnvil(event) => {
                veto_anvil(event, self.adapter.bindings());
            }
        }
    }
}
