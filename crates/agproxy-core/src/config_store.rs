//! Typed key-value store for health and retention tunables.
//!
//! The config file is one JSON object; this store owns only its `health`
//! sub-object and preserves every other key across writes. Reads hand out
//! cloned copies of a complete prior version (copy-on-write), so a reader
//! never observes a half-applied patch.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use agproxy_types::{ConfigError, HealthConfig, HealthConfigPatch};

use crate::paths::{atomic_write, CONFIG_FILE};

/// Key inside the config object owned by this store.
const HEALTH_KEY: &str = "health";

pub struct ConfigStore {
    config_path: PathBuf,
    current: RwLock<Arc<HealthConfig>>,
}

impl ConfigStore {
    /// Load the store from `data_dir`, falling back to defaults when the
    /// file is missing or corrupt. Corruption is logged, never surfaced.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let config_path = data_dir.into().join(CONFIG_FILE);
        let config = Self::load(&config_path);

        Self { config_path, current: RwLock::new(Arc::new(config)) }
    }

    fn load(path: &std::path::Path) -> HealthConfig {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return HealthConfig::default();
            },
            Err(e) => {
                tracing::error!("Failed to read config file {}: {e}", path.display());
                return HealthConfig::default();
            },
        };

        let root: serde_json::Value = match serde_json::from_str(&content) {
            Ok(root) => root,
            Err(e) => {
                tracing::error!(
                    "Corrupt config file {}, using defaults: {e}",
                    path.display()
                );
                return HealthConfig::default();
            },
        };

        match root.get(HEALTH_KEY) {
            Some(health) => match serde_json::from_value(health.clone()) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("Invalid health config, using defaults: {e}");
                    HealthConfig::default()
                },
            },
            None => HealthConfig::default(),
        }
    }

    /// Current config as a defensive copy.
    pub fn get(&self) -> HealthConfig {
        self.current.read().as_ref().clone()
    }

    /// Validate and durably apply a partial patch.
    ///
    /// An invalid patch returns every failing field and leaves both memory
    /// and disk untouched.
    pub fn update(&self, patch: &HealthConfigPatch) -> Result<HealthConfig, ConfigError> {
        let mut merged = self.get();
        merged.apply(patch);
        merged.validate().map_err(|errors| ConfigError::Validation { errors })?;

        self.persist(&merged)?;
        *self.current.write() = Arc::new(merged.clone());

        tracing::info!("Health config updated");
        Ok(merged)
    }

    /// Rewrite the `health` key, keeping sibling keys owned by collaborators.
    fn persist(&self, config: &HealthConfig) -> Result<(), ConfigError> {
        let mut root: serde_json::Value = std::fs::read_to_string(&self.config_path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_else(|| serde_json::json!({}));

        if !root.is_object() {
            root = serde_json::json!({});
        }

        let health = serde_json::to_value(config).map_err(|e| ConfigError::StorageError {
            message: format!("Failed to serialize config: {e}"),
        })?;
        if let Some(obj) = root.as_object_mut() {
            obj.insert(HEALTH_KEY.to_string(), health);
        }

        let content =
            serde_json::to_string_pretty(&root).map_err(|e| ConfigError::StorageError {
                message: format!("Failed to serialize config file: {e}"),
            })?;

        atomic_write(&self.config_path, &content)
            .map_err(|message| ConfigError::StorageError { message })
    }
}
