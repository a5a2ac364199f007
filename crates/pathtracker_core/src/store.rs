//! Campaign persistence.
//!
//! The JSON layout is two documents per campaign directory:
//!
//! - `loot.json`: `{"items": [{"name": ..., "value": ...}], "money": ...}`
//! - `xp.json`: `[{"value": ..., "description": ...}]`
//!
//! Totals are never stored; they are recomputed when a campaign is built.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::campaign::{Campaign, CampaignName, LootItem, XpReward};
use crate::error::{CoreError, CoreErrorCode};

const LOOT_FILE: &str = "loot.json";
const XP_FILE: &str = "xp.json";

pub trait CampaignStore {
    /// Load a campaign; a campaign with no saved data loads empty.
    fn load(&self, name: &CampaignName) -> Result<Campaign, CoreError>;

    fn save(&mut self, name: &CampaignName, campaign: &Campaign) -> Result<(), CoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LootDocument {
    items: Vec<LootItem>,
    money: f64,
}

/// Which files `JsonFileStore::ensure_files` had to create.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Bootstrap {
    pub created_dir: bool,
    pub created_loot: bool,
    pub created_xp: bool,
}

impl Bootstrap {
    pub fn is_noop(&self) -> bool {
        !(self.created_dir || self.created_loot || self.created_xp)
    }
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn campaign_dir(&self, name: &CampaignName) -> PathBuf {
        self.root.join(name.as_str())
    }

    /// Create the campaign directory and any missing document with empty
    /// contents.
    pub fn ensure_files(&self, name: &CampaignName) -> Result<Bootstrap, CoreError> {
        let dir = self.campaign_dir(name);
        let mut bootstrap = Bootstrap::default();

        if !dir.is_dir() {
            fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
            bootstrap.created_dir = true;
        }

        let loot_path = dir.join(LOOT_FILE);
        if !loot_path.exists() {
            write_json(&loot_path, &LootDocument::default())?;
            bootstrap.created_loot = true;
        }

        let xp_path = dir.join(XP_FILE);
        if !xp_path.exists() {
            write_json(&xp_path, &Vec::<XpReward>::new())?;
            bootstrap.created_xp = true;
        }

        if !bootstrap.is_noop() {
            info!("bootstrapped campaign files in {}: {bootstrap:?}", dir.display());
        }
        Ok(bootstrap)
    }
}

impl CampaignStore for JsonFileStore {
    fn load(&self, name: &CampaignName) -> Result<Campaign, CoreError> {
        let dir = self.campaign_dir(name);
        let loot: LootDocument = read_json(&dir.join(LOOT_FILE))?.unwrap_or_default();
        let rewards: Vec<XpReward> = read_json(&dir.join(XP_FILE))?.unwrap_or_default();
        info!(
            "loaded campaign '{name}': {} item(s), {} reward(s)",
            loot.items.len(),
            rewards.len()
        );
        Ok(Campaign::new(loot.items, loot.money, rewards))
    }

    fn save(&mut self, name: &CampaignName, campaign: &Campaign) -> Result<(), CoreError> {
        let dir = self.campaign_dir(name);
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;

        let loot = LootDocument {
            items: campaign.items().to_vec(),
            money: campaign.money(),
        };
        // Both documents are staged before either replaces its file.
        let loot_path = dir.join(LOOT_FILE);
        let xp_path = dir.join(XP_FILE);
        let staged_loot = stage_json(&loot_path, &loot)?;
        let staged_xp = stage_json(&xp_path, campaign.rewards())?;
        commit(staged_loot, &loot_path)?;
        commit(staged_xp, &xp_path)?;
        info!("saved campaign '{name}' to {}", dir.display());
        Ok(())
    }
}

/// Keeps saved campaigns in memory only.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    saved: HashMap<CampaignName, Campaign>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self, name: &CampaignName) -> Option<&Campaign> {
        self.saved.get(name)
    }
}

impl CampaignStore for MemoryStore {
    fn load(&self, name: &CampaignName) -> Result<Campaign, CoreError> {
        Ok(self.saved.get(name).cloned().unwrap_or_default())
    }

    fn save(&mut self, name: &CampaignName, campaign: &Campaign) -> Result<(), CoreError> {
        self.saved.insert(name.clone(), campaign.clone());
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(path, e)),
    };
    serde_json::from_str(&text).map(Some).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Json,
            format!("failed to parse {}: {e}", path.display()),
        )
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CoreError> {
    let staged = stage_json(path, value)?;
    commit(staged, path)
}

/// Encode `value` into a temporary file next to `path`.
fn stage_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<NamedTempFile, CoreError> {
    let text = serde_json::to_string(value).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Json,
            format!("failed to encode {}: {e}", path.display()),
        )
    })?;
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
    file.write_all(text.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| io_error(file.path(), e))?;
    Ok(file)
}

/// Atomically replace `path` with a staged file.
fn commit(staged: NamedTempFile, path: &Path) -> Result<(), CoreError> {
    staged
        .persist(path)
        .map(|_| ())
        .map_err(|e| io_error(path, e.error))
}

fn io_error(path: &Path, err: io::Error) -> CoreError {
    CoreError::new(CoreErrorCode::Io, format!("{}: {err}", path.display()))
}
