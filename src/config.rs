// Configuration management for persistent state

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs;
use std::path::PathBuf;

use crate::settings::ExplorerSettings;
use crate::workspace::WorkspaceState;

#[cfg(debug_assertions)]
const APP_NAME: &str = "nimbus-dev";

#[cfg(not(debug_assertions))]
const APP_NAME: &str = "nimbus";

/// Manages persistent configuration files
#[derive(Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager, initializing the config directory if needed
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;

        // Ensure config directory exists
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        }

        Ok(Self { config_dir })
    }

    /// Get the platform-specific config directory
    fn get_config_dir() -> Result<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_NAME)).context("Could not determine config directory")
    }

    /// Get path to a specific config file
    fn file_path(&self, filename: &str) -> PathBuf {
        self.config_dir.join(filename)
    }

    /// Load data from a binary (postcard) file
    fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.file_path(filename);

        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(&path).with_context(|| format!("Failed to read {}", filename))?;

        let value: T = postcard::from_bytes(&data)
            .with_context(|| format!("Failed to deserialize {}", filename))?;

        Ok(Some(value))
    }

    /// Save data to a binary (postcard) file (atomic via temp + rename).
    fn save<T: Serialize + ?Sized>(&self, filename: &str, data: &T) -> Result<()> {
        let path = self.file_path(filename);

        let bytes = postcard::to_allocvec(data)
            .with_context(|| format!("Failed to serialize {}", filename))?;

        atomic_write(&path, &bytes).with_context(|| format!("Failed to write {}", filename))?;

        Ok(())
    }

    /// Load data from a JSON file
    fn load_json<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.file_path(filename);

        if !path.exists() {
            return Ok(None);
        }

        let data =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {}", filename))?;

        let value: T = serde_json::from_str(&data)
            .with_context(|| format!("Failed to deserialize {}", filename))?;

        Ok(Some(value))
    }

    /// Save data to a JSON file (atomic via temp + rename).
    fn save_json<T: Serialize + ?Sized>(&self, filename: &str, data: &T) -> Result<()> {
        let path = self.file_path(filename);

        let json = serde_json::to_string_pretty(data)
            .with_context(|| format!("Failed to serialize {}", filename))?;

        atomic_write(&path, json.as_bytes())
            .with_context(|| format!("Failed to write {}", filename))?;

        Ok(())
    }

    const SETTINGS_FILE: &'static str = "settings.json";
    const WORKSPACE_FILE: &'static str = "workspace.bin";

    /// Load explorer settings from disk
    pub fn load_settings(&self) -> Result<ExplorerSettings> {
        Ok(self.load_json(Self::SETTINGS_FILE)?.unwrap_or_default())
    }

    /// Save explorer settings to disk
    pub fn save_settings(&self, settings: &ExplorerSettings) -> Result<()> {
        self.save_json(Self::SETTINGS_FILE, settings)
    }

    /// Load workspace state from disk
    pub fn load_workspace(&self) -> Result<WorkspaceState> {
        Ok(self.load(Self::WORKSPACE_FILE)?.unwrap_or_default())
    }

    /// Save workspace state to disk
    pub fn save_workspace(&self, workspace: &WorkspaceState) -> Result<()> {
        self.save(Self::WORKSPACE_FILE, workspace)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new().expect("Failed to initialize ConfigManager")
    }
}

/// Write `data` to `path` atomically: write to a sibling temp file first, then
/// rename. `rename` is atomic on POSIX (same filesystem), so readers never see
/// a truncated or partially-written file — they get either the old content or
/// the new content, never a corrupt intermediate.
fn atomic_write(path: &std::path::Path, data: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(path);
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut tmp, data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
