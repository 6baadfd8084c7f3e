//! Authoritative simulation host.
//!
//! [`Server`] holds the world state plugins operate on: the enchantment
//! registry, online players, the tick scheduler and event subscriptions.
//! [`Host`] owns the server together with the loaded plugins and drives them
//! one tick at a time on the calling (main) thread.
//!
//! Player pre-login runs on a separate connection thread per login attempt.
//! Listeners registered for it must be `Send + Sync`; everything else is
//! serialized on the main thread.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::Result;
use enchantcraft_core::{mix_domain, scoped_rng, ItemStack, SimTick};
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::anvil::PrepareAnvilEvent;
use crate::enchanting::PrepareEnchantEvent;
use crate::player::{Player, PlayerId};
use crate::registry::EnchantmentRegistry;

/// Identifier of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

/// Identifier of an event subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone)]
struct Timer {
    owner: String,
    next_due: SimTick,
    period: u64,
}

/// Repeating tick-based task timers.
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    timers: BTreeMap<TaskId, Timer>,
}

impl Scheduler {
    /// Schedule a task for `owner` first running `delay` ticks after `now`,
    /// then every `period` ticks (a period of 0 is treated as 1).
    pub fn run_task_timer(&mut self, owner: &str, now: SimTick, delay: u64, period: u64) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.timers.insert(
            id,
            Timer {
                owner: owner.to_string(),
                next_due: now.advance(delay),
                period: period.max(1),
            },
        );
        id
    }

    /// Cancel a task. Returns `false` when it was not scheduled.
    pub fn cancel(&mut self, task: TaskId) -> bool {
        self.timers.remove(&task).is_some()
    }

    /// Whether a task is still scheduled.
    pub fn is_scheduled(&self, task: TaskId) -> bool {
        self.timers.contains_key(&task)
    }

    /// Tasks due at `now` with their owners, rescheduling each one.
    fn take_due(&mut self, now: SimTick) -> Vec<(String, TaskId)> {
        let mut due = Vec::new();
        for (id, timer) in &mut self.timers {
            if timer.next_due <= now {
                timer.next_due = now.advance(timer.period);
                due.push((timer.owner.clone(), *id));
            }
        }
        due
    }
}

/// Events plugins can subscribe to on the main thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Enchanting table offers are being prepared.
    PrepareEnchant,
    /// Anvil result is being previewed.
    PrepareAnvil,
}

/// A main-thread event, mutable by listeners.
#[derive(Debug)]
pub enum ServerEvent<'a> {
    /// See [`PrepareEnchantEvent`].
    PrepareEnchant(&'a mut PrepareEnchantEvent),
    /// See [`PrepareAnvilEvent`].
    PrepareAnvil(&'a mut PrepareAnvilEvent),
}

impl ServerEvent<'_> {
    /// Kind used for subscription matching.
    pub fn kind(&self) -> EventKind {
        match self {
            ServerEvent::PrepareEnchant(_) => EventKind::PrepareEnchant,
            ServerEvent::PrepareAnvil(_) => EventKind::PrepareAnvil,
        }
    }
}

/// A login attempt, delivered on the connection thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreLoginEvent {
    /// Player that is about to join.
    pub player: PlayerId,
    /// Player name.
    pub name: String,
}

/// Listener for [`PreLoginEvent`]. Runs off the main thread.
pub trait PreLoginListener: Send + Sync {
    /// Handle a login attempt. Returning lets the login proceed.
    fn on_pre_login(&self, event: &PreLoginEvent);
}

struct Subscription {
    owner: String,
    kinds: BTreeSet<EventKind>,
    pre_login: Option<Arc<dyn PreLoginListener>>,
}

/// Event subscriptions keyed by listener id.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscriptions: BTreeMap<ListenerId, Subscription>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.subscriptions.len())
            .finish()
    }
}

impl EventBus {
    /// Subscribe `owner` to main-thread `kinds` and, optionally, pre-login.
    pub fn register(
        &mut self,
        owner: &str,
        kinds: impl IntoIterator<Item = EventKind>,
        pre_login: Option<Arc<dyn PreLoginListener>>,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.subscriptions.insert(
            id,
            Subscription {
                owner: owner.to_string(),
                kinds: kinds.into_iter().collect(),
                pre_login,
            },
        );
        id
    }

    /// Drop a subscription. Returns `false` when it was not registered.
    pub fn unregister(&mut self, listener: ListenerId) -> bool {
        self.subscriptions.remove(&listener).is_some()
    }

    /// Whether the subscription is live.
    pub fn is_registered(&self, listener: ListenerId) -> bool {
        self.subscriptions.contains_key(&listener)
    }

    fn owners_of(&self, kind: EventKind) -> Vec<String> {
        self.subscriptions
            .values()
            .filter(|sub| sub.kinds.contains(&kind))
            .map(|sub| sub.owner.clone())
            .collect()
    }

    fn pre_login_listeners(&self) -> Vec<Arc<dyn PreLoginListener>> {
        self.subscriptions
            .values()
            .filter_map(|sub| sub.pre_login.clone())
            .collect()
    }
}

/// A plugin loaded into the [`Host`].
pub trait Plugin {
    /// Unique plugin name; owns its tasks and subscriptions.
    fn name(&self) -> &str;

    /// Called once when the plugin is loaded.
    fn enable(&mut self, server: &mut Server);

    /// Called once when the host shuts down.
    fn disable(&mut self, server: &mut Server);

    /// Called at the start of every tick, before scheduled tasks.
    fn on_tick(&mut self, _server: &mut Server) {}

    /// Called when a task this plugin scheduled is due.
    fn on_task(&mut self, _task: TaskId, _server: &mut Server) {}

    /// Called for main-thread events this plugin subscribed to.
    fn on_event(&mut self, _event: ServerEvent<'_>, _server: &mut Server) {}
}

struct PendingLogin {
    player: PlayerId,
    name: String,
    connection: JoinHandle<()>,
}

/// World state shared with plugins.
pub struct Server {
    /// Enchantment registry.
    pub registry: EnchantmentRegistry,
    /// Tick scheduler.
    pub scheduler: Scheduler,
    /// Event subscriptions.
    pub events: EventBus,
    players: BTreeMap<PlayerId, Player>,
    pending_logins: Vec<PendingLogin>,
    world_seed: u64,
    current_tick: SimTick,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("tick", &self.current_tick)
            .field("players", &self.players.len())
            .field("pending_logins", &self.pending_logins.len())
            .finish()
    }
}

impl Server {
    /// Create a server around an already bootstrapped registry.
    pub fn new(registry: EnchantmentRegistry, world_seed: u64) -> Self {
        Self {
            registry,
            scheduler: Scheduler::default(),
            events: EventBus::default(),
            players: BTreeMap::new(),
            pending_logins: Vec::new(),
            world_seed,
            current_tick: SimTick::ZERO,
        }
    }

    /// Current simulation tick.
    pub fn tick(&self) -> SimTick {
        self.current_tick
    }

    /// World seed.
    pub fn world_seed(&self) -> u64 {
        self.world_seed
    }

    /// Deterministic RNG for `domain` at the current tick.
    pub fn rng(&self, domain: u64) -> StdRng {
        scoped_rng(self.world_seed, domain, self.current_tick)
    }

    /// Online players in id order.
    pub fn online_players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Online player ids in id order.
    pub fn online_ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    /// Look up an online player.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Mutable access to an online player.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Put a player online directly, skipping pre-login.
    pub fn join(&mut self, player: Player) {
        info!(player = %player.name, id = %player.id, "Player joined");
        self.players.insert(player.id, player);
    }

    /// Take a player offline.
    pub fn quit(&mut self, id: PlayerId) -> Option<Player> {
        let player = self.players.remove(&id);
        if let Some(player) = &player {
            info!(player = %player.name, "Player left");
        }
        player
    }

    /// Start a login on a fresh connection thread that runs every pre-login
    /// listener before the player can join. The player goes online once the
    /// connection thread finishes and a later tick observes it.
    pub fn begin_login(&mut self, player: PlayerId, name: &str) -> Result<()> {
        let listeners = self.events.pre_login_listeners();
        let event = PreLoginEvent {
            player,
            name: name.to_string(),
        };
        let connection = std::thread::Builder::new()
            .name(format!("connection-{}", player.0))
            .spawn(move || {
                for listener in &listeners {
                    listener.on_pre_login(&event);
                }
            })?;
        self.pending_logins.push(PendingLogin {
            player,
            name: name.to_string(),
            connection,
        });
        Ok(())
    }

    /// Whether any login is still waiting on its connection thread.
    pub fn has_pending_logins(&self) -> bool {
        !self.pending_logins.is_empty()
    }

    fn complete_logins(&mut self) {
        let (finished, pending): (Vec<_>, Vec<_>) = self
            .pending_logins
            .drain(..)
            .partition(|login| login.connection.is_finished());
        self.pending_logins = pending;
        for login in finished {
            if login.connection.join().is_err() {
                warn!(player = %login.name, "Connection thread panicked, login dropped");
                continue;
            }
            self.join(Player::new(login.player, login.name));
        }
    }
}

/// Owns the server and its plugins.
pub struct Host {
    server: Server,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Host {
    /// Create a host with no plugins.
    pub fn new(server: Server) -> Self {
        Self {
            server,
            plugins: Vec::new(),
        }
    }

    /// Load and enable a plugin.
    pub fn load(&mut self, mut plugin: Box<dyn Plugin>) {
        info!(plugin = plugin.name(), "Enabling plugin");
        plugin.enable(&mut self.server);
        self.plugins.push(plugin);
    }

    /// Shared server state.
    pub fn server(&self) -> &Server {
        &self.server
    }

    /// Mutable server state.
    pub fn server_mut(&mut self) -> &mut Server {
        &mut self.server
    }

    /// Run a single deterministic tick.
    pub fn tick(&mut self) {
        self.server.current_tick = self.server.current_tick.advance(1);
        let now = self.server.current_tick;

        for plugin in &mut self.plugins {
            plugin.on_tick(&mut self.server);
        }

        let due = self.server.scheduler.take_due(now);
        for (owner, task) in due {
            // A task cancelled by an earlier task this tick does not run.
            if !self.server.scheduler.is_scheduled(task) {
                continue;
            }
            if let Some(plugin) = self.plugins.iter_mut().find(|p| p.name() == owner) {
                plugin.on_task(task, &mut self.server);
            }
        }

        self.server.complete_logins();
    }

    /// Roll enchanting offers for a player's item and let listeners edit them.
    pub fn prepare_enchant(
        &mut self,
        player: PlayerId,
        item: ItemStack,
        bookshelves: u32,
    ) -> PrepareEnchantEvent {
        let seed = mix_domain(mix_domain(self.server.world_seed, player.0), self.server.current_tick.0);
        let mut event =
            PrepareEnchantEvent::roll(&self.server.registry, player, item, bookshelves, seed);
        for owner in self.server.events.owners_of(EventKind::PrepareEnchant) {
            if let Some(plugin) = self.plugins.iter_mut().find(|p| p.name() == owner) {
                plugin.on_event(ServerEvent::PrepareEnchant(&mut event), &mut self.server);
            }
        }
        event
    }

    /// Preview an anvil combination and let listeners edit or veto it.
    pub fn prepare_anvil(
        &mut self,
        player: PlayerId,
        first: Option<ItemStack>,
        second: Option<ItemStack>,
    ) -> PrepareAnvilEvent {
        let mut event = PrepareAnvilEvent::preview(player, first, second);
        for owner in self.server.events.owners_of(EventKind::PrepareAnvil) {
            if let Some(plugin) = self.plugins.iter_mut().find(|p| p.name() == owner) {
                plugin.on_event(ServerEvent::PrepareAnvil(&mut event), &mut self.server);
            }
        }
        event
    }

    /// Disable every plugin in reverse load order and hand back the server.
    pub fn shutdown(mut self) -> Server {
        while let Some(mut plugin) = self.plugins.pop() {
            info!(plugin = plugin.name(), "Disabling plugin");
            plugin.disable(&mut self.server);
        }
        for login in self.server.pending_logins.drain(..) {
            debug!(player = %login.name, "Abandoning pending login");
        }
        self.server
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::HostProfile;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn server() -> Server {
        Server::new(EnchantmentRegistry::new(HostProfile::default()), 7)
    }

    struct Counter {
        tasks: Arc<AtomicUsize>,
        task: Option<TaskId>,
    }

    impl Plugin for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn enable(&mut self, server: &mut Server) {
            let now = server.tick();
            self.task = Some(server.scheduler.run_task_timer("counter", now, 1, 2));
        }

        fn disable(&mut self, server: &mut Server) {
            if let Some(task) = self.task.take() {
                server.scheduler.cancel(task);
            }
        }

        fn on_task(&mut self, _task: TaskId, _server: &mut Server) {
            self.tasks.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn timers_fire_on_period_until_disabled() {
        let tasks = Arc::new(AtomicUsize::new(0));
        let mut host = Host::new(server());
        host.load(Box::new(Counter {
            tasks: tasks.clone(),
            task: None,
        }));
        for _ in 0..6 {
            host.tick();
        }
        // due at ticks 1, 3, 5
        assert_eq!(tasks.load(Ordering::SeqCst), 3);
        assert_eq!(host.server().tick(), SimTick(6));
        let server = host.shutdown();
        assert!(server.scheduler.timers.is_empty());
    }

    #[test]
    fn cancelled_timer_stops_firing() {
        let mut scheduler = Scheduler::default();
        let task = scheduler.run_task_timer("p", SimTick::ZERO, 1, 1);
        assert_eq!(scheduler.take_due(SimTick(1)).len(), 1);
        assert!(scheduler.cancel(task));
        assert!(scheduler.take_due(SimTick(2)).is_empty());
        assert!(!scheduler.cancel(task));
    }

    #[test]
    fn zero_delay_runs_on_first_tick() {
        let mut scheduler = Scheduler::default();
        scheduler.run_task_timer("p", SimTick::ZERO, 0, 1);
        assert_eq!(scheduler.take_due(SimTick(1)).len(), 1);
    }

    struct CountingLogin(AtomicUsize);

    impl PreLoginListener for CountingLogin {
        fn on_pre_login(&self, _event: &PreLoginEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn logins_run_listeners_then_join() {
        let mut host = Host::new(server());
        let listener = Arc::new(CountingLogin(AtomicUsize::new(0)));
        let id = host
            .server_mut()
            .events
            .register("test", std::iter::empty(), Some(listener.clone() as Arc<dyn PreLoginListener>));
        host.server_mut().begin_login(PlayerId(3), "steve").unwrap();
        while host.server().has_pending_logins() {
            host.tick();
            std::thread::yield_now();
        }
        assert_eq!(listener.0.load(Ordering::SeqCst), 1);
        assert!(host.server().player(PlayerId(3)).is_some());
        assert!(host.server_mut().events.unregister(id));
    }

    #[test]
    fn events_reach_only_subscribers() {
        let mut bus = EventBus::default();
        let id = bus.register("a", [EventKind::PrepareAnvil], None);
        bus.register("b", [EventKind::PrepareEnchant], None);
        assert_eq!(bus.owners_of(EventKind::PrepareAnvil), vec!["a".to_string()]);
        assert!(bus.unregister(id));
        assert!(bus.owners_of(EventKind::PrepareAnvil).is_empty());
        assert!(!bus.is_registered(id));
    }
}
