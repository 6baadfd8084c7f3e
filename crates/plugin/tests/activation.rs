//! Host-driven activation scenarios: the service is loaded into a host and
//! stepped tick by tick while a recorder captures every trigger dispatch.

use std::sync::Arc;

use enchantcraft_core::{EnchantmentId, RegistryKey, SimTick};
use enchantcraft_plugin::{ActiveTriggers, EnchantmentDefinition, EnchantmentService, ServiceOptions, StaticSource};
use enchantcraft_scripting::TriggerRef;
use enchantcraft_testkit::{
    holding, item, run_ticks, vanilla_server, JsonlSink, RecordingTriggers, ToggleCriteria,
};
use enchantcraft_world::{EquipmentSlot, Host, HostProfile, PlayerId};

const ALEX: PlayerId = PlayerId(1);

fn definition(cooldown_enabled: bool, cooldown_ms: u64) -> EnchantmentDefinition {
    let mut def = EnchantmentDefinition::new("spark", "Spark");
    def.max_level = 3;
    def.supported_items = vec![item("diamond_sword").kind];
    def.cooldown_enabled = cooldown_enabled;
    def.cooldown_ms = cooldown_ms;
    def.inactive_triggers = vec![TriggerRef::new("off")];
    def.active_triggers = vec![
        ActiveTriggers {
            level: 1,
            triggers: vec![TriggerRef::new("on1")],
        },
        ActiveTriggers {
            level: 3,
            triggers: vec![TriggerRef::new("on3")],
        },
    ];
    def
}

struct Scenario {
    host: Host,
    recorder: Arc<RecordingTriggers>,
    gate: Arc<ToggleCriteria>,
    enchantment: EnchantmentId,
}

impl Scenario {
    fn new(def: EnchantmentDefinition) -> Self {
        let recorder = Arc::new(RecordingTriggers::new());
        let gate = Arc::new(ToggleCriteria::new(true));
        let service = EnchantmentService::new(
            ServiceOptions::default(),
            Arc::new(StaticSource::new(vec![def])),
            Arc::new(StaticSource::new(Vec::new())),
            gate.clone(),
            recorder.clone(),
        );
        let mut host = Host::new(vanilla_server(HostProfile::default(), 5));
        host.load(Box::new(service));
        let key = RegistryKey::new("enchantcraft", "spark").unwrap();
        let enchantment = host.server().registry.get(&key).unwrap().id;
        Self {
            host,
            recorder,
            gate,
            enchantment,
        }
    }

    fn equip(&mut self, level: u8) {
        let player = holding(ALEX, "alex", "diamond_sword", self.enchantment, level);
        self.host.server_mut().join(player);
    }

    fn unequip(&mut self) {
        let player = self.host.server_mut().player_mut(ALEX).unwrap();
        player.equipment.set(EquipmentSlot::MainHand, None);
    }

    fn fired_at(&self) -> Vec<(u64, String)> {
        self.recorder
            .fired()
            .into_iter()
            .map(|f| (f.tick.0, f.trigger))
            .collect()
    }
}

fn at(tick: u64, trigger: &str) -> (u64, String) {
    (tick, trigger.to_string())
}

#[test]
fn level_without_entry_activates_silently() {
    let mut s = Scenario::new(definition(true, 1000));
    s.equip(2);
    run_ticks(&mut s.host, 5, |_| ());
    assert!(s.recorder.fired().is_empty());

    // it was active: losing the item fires the inactive list
    s.unequip();
    s.host.tick();
    assert_eq!(s.fired_at(), vec![at(6, "off")]);
}

#[test]
fn exact_level_entry_fires() {
    let mut s = Scenario::new(definition(false, 0));
    s.equip(3);
    run_ticks(&mut s.host, 3, |_| ());
    assert_eq!(s.fired_at(), vec![at(1, "on3")]);
}

#[test]
fn cooldown_limits_refires_to_one_per_window() {
    // 100 ms is two ticks
    let mut s = Scenario::new(definition(true, 100));
    s.equip(1);
    run_ticks(&mut s.host, 10, |_| ());
    assert_eq!(
        s.fired_at(),
        vec![at(1, "on1"), at(3, "on1"), at(5, "on1"), at(7, "on1"), at(9, "on1")]
    );
}

#[test]
fn trigger_log_is_written_as_jsonl() {
    let mut s = Scenario::new(definition(true, 100));
    s.equip(1);
    run_ticks(&mut s.host, 4, |_| ());
    s.unequip();
    s.host.tick();

    let path = std::env::temp_dir().join(format!(
        "enchantcraft-activation-{}.jsonl",
        std::process::id()
    ));
    let mut sink = JsonlSink::create(&path).expect("sink create");
    sink.write_all(&s.recorder.take()).expect("write succeeds");
    assert!(s.recorder.fired().is_empty());

    let contents = std::fs::read_to_string(&path).expect("log readable");
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid json line"))
        .collect();
    let _ = std::fs::remove_file(&path);

    let log: Vec<(u64, &str)> = lines
        .iter()
        .map(|v| (v["tick"].as_u64().unwrap(), v["trigger"].as_str().unwrap()))
        .collect();
    assert_eq!(log, vec![(1, "on1"), (3, "on1"), (5, "off")]);
    assert!(lines.iter().all(|v| v["player"] == "alex"));
}

#[test]
fn deactivation_ignores_cooldown() {
    let mut s = Scenario::new(definition(true, 60_000));
    s.equip(1);
    s.host.tick();
    s.unequip();
    s.host.tick();
    assert_eq!(s.fired_at(), vec![at(1, "on1"), at(2, "off")]);
}

#[test]
fn without_cooldown_fires_once_per_edge() {
    let mut s = Scenario::new(definition(false, 0));
    s.equip(1);
    run_ticks(&mut s.host, 100, |_| ());
    assert_eq!(s.recorder.count("on1"), 1);
    assert_eq!(s.recorder.count("off"), 0);

    s.gate.set(false);
    run_ticks(&mut s.host, 10, |_| ());
    assert_eq!(s.recorder.count("on1"), 1);
    assert_eq!(s.recorder.count("off"), 1);
    assert_eq!(s.fired_at(), vec![at(1, "on1"), at(101, "off")]);
}

#[test]
fn losing_criteria_while_equipped_deactivates() {
    let mut s = Scenario::new(definition(true, 1000));
    s.equip(1);
    s.host.tick();
    s.gate.set(false);
    s.host.tick();
    s.gate.set(true);
    s.host.tick();
    // a new activation may fire again only once the cooldown has elapsed
    assert_eq!(s.fired_at(), vec![at(1, "on1"), at(2, "off")]);
}

#[test]
fn unsupported_item_never_activates() {
    let mut s = Scenario::new(definition(false, 0));
    let mut player = holding(ALEX, "alex", "stick", s.enchantment, 3);
    player
        .equipment
        .set(EquipmentSlot::Head, Some(item("diamond_helmet").with_enchantment(s.enchantment, 1)));
    s.host.server_mut().join(player);
    run_ticks(&mut s.host, 5, |_| ());
    assert!(s.recorder.fired().is_empty());
}

#[test]
fn offline_players_stop_firing() {
    let mut s = Scenario::new(definition(true, 50));
    s.equip(1);
    run_ticks(&mut s.host, 2, |_| ());
    s.host.server_mut().quit(ALEX);
    let frames = run_ticks(&mut s.host, 3, |server| server.online_players().count());
    assert!(frames.iter().all(|f| f.snapshot == 0));
    assert_eq!(s.fired_at(), vec![at(1, "on1"), at(2, "on1")]);
}

#[test]
fn disabled_service_stops_ticking() {
    let mut s = Scenario::new(definition(true, 50));
    s.equip(1);
    s.host.tick();
    let recorder = s.recorder.clone();
    let server = s.host.shutdown();
    assert_eq!(server.tick(), SimTick(1));
    assert_eq!(recorder.count("on1"), 1);
    assert_eq!(recorder.count("off"), 0);
}
