use anyhow::{Context, Result};
use enchantcraft_plugin::{
    DefinitionSource, EnchantmentDefinition, VanillaEnchantmentBlacklistDefinition,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Default directory containing content packs.
pub const CONTENT_PACKS_DIR: &str = "content_packs";

/// Content pack manifest file name.
pub const CONTENT_PACK_MANIFEST_FILE: &str = "pack.json";

/// Enchantment definitions inside a pack.
pub const ENCHANTMENTS_FILE: &str = "enchantments.json";

/// Vanilla blacklist definitions inside a pack.
pub const BLACKLISTS_FILE: &str = "blacklists.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentPackManifest {
    /// Human-friendly pack name (defaults to the directory name).
    pub name: Option<String>,
    /// Optional description, purely informational.
    pub description: Option<String>,
    /// If false, the pack is ignored.
    pub enabled: bool,
    /// Deterministic pack load ordering (lower loads earlier).
    pub priority: i32,
}

impl Default for ContentPackManifest {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            enabled: true,
            priority: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveredContentPack {
    pub id: String,
    pub dir: PathBuf,
    pub manifest: ContentPackManifest,
}

fn load_manifest(pack_dir: &Path, pack_id: &str) -> Result<ContentPackManifest> {
    let manifest_path = pack_dir.join(CONTENT_PACK_MANIFEST_FILE);
    let mut manifest = if !manifest_path.exists() {
        ContentPackManifest::default()
    } else {
        let contents = fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", manifest_path.display()))?
    };

    if manifest.name.as_deref().unwrap_or("").is_empty() {
        manifest.name = Some(pack_id.to_string());
    }

    Ok(manifest)
}

/// Discover content pack directories under the given root.
///
/// Pack discovery is deterministic: directories are returned in sorted order.
pub fn discover_pack_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err).with_context(|| format!("Failed to read {}", root.display())),
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read dir entry in {}", root.display()))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }

    dirs.sort();
    Ok(dirs)
}

/// Discover content packs under the given root, applying manifest ordering and enablement.
///
/// Packs with unreadable/invalid manifests are skipped with a warning.
pub fn discover_packs_lenient(root: &Path) -> Vec<DiscoveredContentPack> {
    let pack_dirs = match discover_pack_dirs(root) {
        Ok(pack_dirs) => pack_dirs,
        Err(err) => {
            warn!(
                "Failed to scan content packs dir {}: {err:#}",
                root.display()
            );
            return Vec::new();
        }
    };

    let mut packs = Vec::with_capacity(pack_dirs.len());
    for pack_dir in pack_dirs {
        let id = pack_dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| pack_dir.display().to_string());
        let manifest = match load_manifest(&pack_dir, &id) {
            Ok(manifest) => manifest,
            Err(err) => {
                warn!(
                    "Skipping content pack {} due to invalid manifest: {err:#}",
                    pack_dir.display()
                );
                continue;
            }
        };
        if !manifest.enabled {
            continue;
        }
        packs.push(DiscoveredContentPack {
            id,
            dir: pack_dir,
            manifest,
        });
    }

    packs.sort_by(|a, b| {
        a.manifest
            .priority
            .cmp(&b.manifest.priority)
            .then_with(|| a.id.cmp(&b.id))
    });
    packs
}

fn load_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Merge `incoming` into `into`; a later definition replaces an earlier one
/// with the same id in place.
fn merge_by_id<T>(into: &mut Vec<T>, incoming: Vec<T>, id: impl Fn(&T) -> &str) {
    for def in incoming {
        match into.iter().position(|existing| id(existing) == id(&def)) {
            Some(index) => {
                debug!(id = id(&def), "Definition overridden by later pack");
                into[index] = def;
            }
            None => into.push(def),
        }
    }
}

/// Definitions gathered from every enabled pack.
#[derive(Debug, Clone, Default)]
pub struct ContentPacks {
    enchantments: Vec<EnchantmentDefinition>,
    blacklists: Vec<VanillaEnchantmentBlacklistDefinition>,
}

impl ContentPacks {
    /// Load every enabled pack under `root` in priority order. Files that
    /// fail to parse are skipped with a warning.
    pub fn load_lenient(root: &Path) -> Self {
        let mut loaded = Self::default();
        for pack in discover_packs_lenient(root) {
            debug!(
                pack = %pack.id,
                name = ?pack.manifest.name,
                description = ?pack.manifest.description,
                "Loading content pack"
            );
            match load_list::<EnchantmentDefinition>(&pack.dir.join(ENCHANTMENTS_FILE)) {
                Ok(defs) => merge_by_id(&mut loaded.enchantments, defs, |d| d.id.as_str()),
                Err(err) => warn!("Skipping enchantments of pack {}: {err:#}", pack.id),
            }
            match load_list::<VanillaEnchantmentBlacklistDefinition>(&pack.dir.join(BLACKLISTS_FILE)) {
                Ok(defs) => merge_by_id(&mut loaded.blacklists, defs, |d| d.id.as_str()),
                Err(err) => warn!("Skipping blacklists of pack {}: {err:#}", pack.id),
            }
        }
        info!(
            enchantments = loaded.enchantments.len(),
            blacklists = loaded.blacklists.len(),
            "Loaded content packs from {}",
            root.display()
        );
        loaded
    }
}

impl DefinitionSource<EnchantmentDefinition> for ContentPacks {
    fn find_all(&self) -> Vec<EnchantmentDefinition> {
        self.enchantments.clone()
    }
}

impl DefinitionSource<VanillaEnchantmentBlacklistDefinition> for ContentPacks {
    fn find_all(&self) -> Vec<VanillaEnchantmentBlacklistDefinition> {
        self.blacklists.clone()
    }
}
