use anyhow::Context;
use dungeon_agent::ModelConfig;
use dungeon_session::{
    DocumentBackend, FileDocumentBackend, InMemoryDocumentBackend, PersistenceStore,
    DEFAULT_APP_ID,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Environment variable consulted when the config file has no API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

#[derive(Debug, Deserialize)]
pub struct DungeonConfig {
    #[serde(default = "default_app_id")]
    pub app_id: String,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
    None,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            model: ModelConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            dir: default_data_dir(),
        }
    }
}

fn default_app_id() -> String {
    DEFAULT_APP_ID.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl DungeonConfig {
    /// Reads the config file. A missing file yields defaults.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Fills the API key from `lookup(GOOGLE_API_KEY)` when the file left it blank.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.model.has_credentials() {
            if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
                self.model.api_key = key;
            }
        }
    }

    pub async fn open_store(&self) -> anyhow::Result<PersistenceStore> {
        let backend: Option<Arc<dyn DocumentBackend>> = match self.storage.backend {
            StorageBackend::File => {
                let backend = FileDocumentBackend::new(self.storage.dir.clone())
                    .await
                    .with_context(|| {
                        format!("Failed to open data dir '{}'", self.storage.dir.display())
                    })?;
                Some(Arc::new(backend))
            }
            StorageBackend::Memory => Some(Arc::new(InMemoryDocumentBackend::new())),
            StorageBackend::None => {
                warn!("Storage disabled; save and load are unavailable");
                None
            }
        };
        Ok(PersistenceStore::new(backend, self.app_id.clone()))
    }
}
