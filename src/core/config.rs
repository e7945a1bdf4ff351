//! Application configuration management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::loader::{DEFAULT_DOCUMENTS_DIR, DEFAULT_RECORD_EXTENSION};

/// Environment variable overriding the store root
pub const STORE_ENV: &str = "DOCSHELF_STORE";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root directory of the local file store
    pub store_root: Option<PathBuf>,
    /// Store directory holding document records
    pub documents_dir: String,
    /// Extension of document record files
    pub record_extension: String,
    /// Number of entries in the "Recent Documents" card
    pub recent_limit: usize,
    /// UI settings
    pub ui: UiConfig,
}

/// UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme (light/dark)
    pub theme: String,
    /// Initial window width
    pub window_width: f32,
    /// Initial window height
    pub window_height: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_root: None,
            documents_dir: DEFAULT_DOCUMENTS_DIR.to_string(),
            record_extension: DEFAULT_RECORD_EXTENSION.to_string(),
            recent_limit: 5,
            ui: UiConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            window_width: 1100.0,
            window_height: 760.0,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "docshelf", "Docshelf")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        let mut config = Self::load_from(&path)?;
        if let Some(root) = std::env::var_os(STORE_ENV) {
            config.store_root = Some(PathBuf::from(root));
        }
        Ok(config)
    }

    /// Load configuration from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// Check values the loader cannot work with.
    ///
    /// The documents directory is created with a single `mkdir`, so it must be
    /// one level below the store root.
    pub fn validate(&self) -> Result<()> {
        let segments: Vec<&str> = self
            .documents_dir
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        match segments.as_slice() {
            [name] if *name != "." && *name != ".." => {}
            _ => anyhow::bail!(
                "documents_dir must be a single directory below the store root, got {:?}",
                self.documents_dir
            ),
        }

        if self.record_extension.trim_start_matches('.').is_empty() {
            anyhow::bail!("record_extension must not be empty");
        }
        Ok(())
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Store root to use when none is configured
    pub fn default_store_root() -> PathBuf {
        ProjectDirs::from("com", "docshelf", "Docshelf")
            .map(|dirs| dirs.data_dir().join("store"))
            .unwrap_or_else(|| PathBuf::from("store"))
    }

    /// Configured store root, or the default one
    pub fn store_root(&self) -> PathBuf {
        self.store_root
            .clone()
            .unwrap_or_else(Self::default_store_root)
    }
}
