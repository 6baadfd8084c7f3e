//! Registration, pre-login hand-off and shutdown against a live host.

use std::sync::Arc;
use std::time::Duration;

use enchantcraft_core::{RegistryKey, VanillaEnchantment};
use enchantcraft_plugin::{
    EnchantmentDefinition, EnchantmentService, ServiceOptions, StaticSource,
    VanillaEnchantmentBlacklistDefinition,
};
use enchantcraft_scripting::AlwaysPass;
use enchantcraft_testkit::{item, tick_until, vanilla_server, RecordingTriggers};
use enchantcraft_world::{
    Freezable, Host, HostProfile, ListenerId, MutationApi, PlayerId, Plugin, TaskId,
};

fn key(path: &str) -> RegistryKey {
    RegistryKey::new("enchantcraft", path).unwrap()
}

fn definition(id: &str, name: &str) -> EnchantmentDefinition {
    let mut def = EnchantmentDefinition::new(id, name);
    def.max_level = 2;
    def.supported_items = vec![item("diamond_sword").kind];
    def
}

fn service(
    options: ServiceOptions,
    defs: Arc<StaticSource<EnchantmentDefinition>>,
) -> EnchantmentService {
    EnchantmentService::new(
        options,
        defs,
        Arc::new(StaticSource::new(vec![VanillaEnchantmentBlacklistDefinition {
            id: "no_mending".into(),
            name: "No mending".into(),
            enchantments: vec![VanillaEnchantment::Mending],
        }])),
        Arc::new(AlwaysPass),
        Arc::new(RecordingTriggers::new()),
    )
}

#[test]
fn repeated_registration_binds_once_with_stable_handles() {
    for profile in [
        HostProfile::default(),
        HostProfile {
            mutation_api: MutationApi::Typed,
            writable_freeze: false,
        },
        HostProfile {
            mutation_api: MutationApi::Dynamic,
            writable_freeze: true,
        },
    ] {
        let mut server = vanilla_server(profile, 1);
        let before = server.registry.registered_count();
        let defs = Arc::new(StaticSource::new(vec![definition("frost_v1", "Frost")]));
        let mut service = service(ServiceOptions::default(), defs);

        service.register_all(&mut server.registry);
        let first = service.enchantment_for("frost_v1").cloned();
        assert!(first.is_some(), "{profile:?}");
        for _ in 0..5 {
            let summary = service.register_all(&mut server.registry);
            assert_eq!(summary.definitions, 1);
            assert_eq!(summary.bound_keys, 2);
        }
        assert_eq!(server.registry.registered_count(), before + 2, "{profile:?}");
        assert_eq!(service.enchantment_for("frost_v1").cloned(), first);
        assert_eq!(server.registry.frozen(), Some(true));
    }
}

#[test]
fn sanitized_name_is_the_primary_key() {
    let mut server = vanilla_server(HostProfile::default(), 1);
    let before = server.registry.registered_count();
    let defs = Arc::new(StaticSource::new(vec![definition("my_enchant_", "My Enchant!")]));
    let mut service = service(ServiceOptions::default(), defs);
    let summary = service.register_all(&mut server.registry);

    assert!(server.registry.get(&key("my_enchant_")).is_some());
    assert_eq!(server.registry.registered_count(), before + 1);
    assert_eq!(summary.bound_keys, 1);
}

#[test]
fn custom_namespace_is_honoured() {
    let mut server = vanilla_server(HostProfile::default(), 1);
    let defs = Arc::new(StaticSource::new(vec![definition("frost", "Frost")]));
    let options = ServiceOptions {
        namespace: "packs".into(),
        ..ServiceOptions::default()
    };
    let mut service = service(options, defs);
    service.register_all(&mut server.registry);
    let handle = service.enchantment_for("frost").unwrap();
    assert_eq!(handle.key, RegistryKey::new("packs", "frost").unwrap());
}

#[test]
fn pre_login_registers_new_definitions_before_join() {
    let defs = Arc::new(StaticSource::new(vec![definition("frost", "Frost")]));
    let mut host = Host::new(vanilla_server(HostProfile::default(), 1));
    host.load(Box::new(service(ServiceOptions::default(), defs.clone())));
    assert!(host.server().registry.get(&key("frost")).is_some());

    defs.push(definition("ember", "Ember"));
    assert!(host.server().registry.get(&key("ember")).is_none());

    host.server_mut().begin_login(PlayerId(9), "sam").unwrap();
    let joined = tick_until(&mut host, 10_000, |server| server.player(PlayerId(9)).is_some());
    assert!(joined.is_some());
    assert!(host.server().registry.get(&key("ember")).is_some());
}

#[test]
fn pre_login_timeout_still_lets_the_player_in() {
    let defs = Arc::new(StaticSource::new(vec![definition("frost", "Frost")]));
    let options = ServiceOptions {
        pre_login_timeout: Duration::from_millis(10),
        ..ServiceOptions::default()
    };
    let mut host = Host::new(vanilla_server(HostProfile::default(), 1));
    host.load(Box::new(service(options, defs)));

    host.server_mut().begin_login(PlayerId(2), "kai").unwrap();
    // nobody drains the queue while the main thread sleeps
    std::thread::sleep(Duration::from_millis(200));
    let joined = tick_until(&mut host, 10_000, |server| server.player(PlayerId(2)).is_some());
    assert!(joined.is_some());
}

#[test]
fn shutdown_releases_hooks_and_keeps_entries() {
    let defs = Arc::new(StaticSource::new(vec![definition("frost", "Frost")]));
    let mut host = Host::new(vanilla_server(HostProfile::default(), 1));
    host.load(Box::new(service(ServiceOptions::default(), defs)));
    host.tick();

    let server = host.shutdown();
    assert!(server.registry.get(&key("frost")).is_some());
    assert!(!server.scheduler.is_scheduled(TaskId(0)));
    assert!(!server.events.is_registered(ListenerId(0)));
}

#[test]
fn disable_forgets_bindings_but_not_entries() {
    let defs = Arc::new(StaticSource::new(vec![definition("frost", "Frost")]));
    let mut service = service(ServiceOptions::default(), defs);
    let mut server = vanilla_server(HostProfile::default(), 1);
    service.enable(&mut server);
    assert!(service.is_enabled());
    service.disable(&mut server);
    assert!(service.enchantment_for("frost").is_none());
    assert!(service.blacklist().is_empty());
    // registering again after disable adopts the existing entries
    service.register_all(&mut server.registry);
    assert!(service.enchantment_for("frost").is_some());
}
