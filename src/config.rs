use anyhow::{Context, Result};
use enchantcraft_world::{EquipmentSlot, HostProfile};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use crate::content_packs;

pub const DEFAULT_CONFIG_PATH: &str = "config/enchantcraft.toml";

/// Headless host configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    /// Ticks to simulate before shutting down.
    pub ticks: u64,
    /// Directory scanned for content packs.
    pub content_packs_dir: String,
    pub world_seed: u64,
    /// Bound on the pre-login hand-off, in milliseconds.
    pub pre_login_timeout_ms: u64,
    /// Registry namespace for custom enchantments.
    pub namespace: String,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
    pub host: HostProfile,
    pub players: Vec<DemoPlayer>,
}

/// A simulated player logged in at startup.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DemoPlayer {
    pub name: String,
    #[serde(default)]
    pub equipment: Vec<DemoItem>,
    /// Facts consulted by enchantment criteria.
    #[serde(default)]
    pub facts: BTreeMap<String, f64>,
}

/// An equipped item, enchanted by definition id.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DemoItem {
    pub slot: EquipmentSlot,
    pub item: String,
    #[serde(default)]
    pub enchantments: BTreeMap<String, u8>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            ticks: 200,
            content_packs_dir: content_packs::CONTENT_PACKS_DIR.to_string(),
            world_seed: 0x00C0_FFEE,
            pre_login_timeout_ms: 10_000,
            namespace: enchantcraft_plugin::DEFAULT_NAMESPACE.to_string(),
            log_filter: None,
            host: HostProfile::default(),
            players: Vec::new(),
        }
    }
}

impl HostConfig {
    /// Load configuration from an explicit path.
    pub fn try_load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read host config {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn pre_login_timeout(&self) -> Duration {
        Duration::from_millis(self.pre_login_timeout_ms)
    }
}
