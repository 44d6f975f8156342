//! Persistence of the AI provider configuration.

use super::{AiConfig, ProviderConfig};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Source of the AI provider configuration.
///
/// Implementations must return current values on every call; the AI
/// facade reads the store fresh for each operation so configuration
/// changes take effect without a restart.
pub trait ConfigStore: Send + Sync {
    /// Loads the full configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> Result<AiConfig>;

    /// Persists the full configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, config: &AiConfig) -> Result<()>;

    /// Returns the active provider's settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    fn get_active_provider_config(&self) -> Result<ProviderConfig> {
        Ok(self.load()?.active())
    }

    /// Stores `config` and makes its provider the active one.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or saved.
    fn set_active_provider_config(&self, config: ProviderConfig) -> Result<()> {
        let mut current = self.load()?;
        current.set_active(config);
        self.save(&current)
    }
}

/// Stores the configuration in the `[ai]` table of the settings file.
///
/// Other tables in the file are preserved on save.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// Creates a store backed by the given TOML file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<toml::Table> {
        if !self.path.exists() {
            return Ok(toml::Table::new());
        }
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| Error::OperationFailed {
                operation: "read_ai_config".to_string(),
                cause: format!("{}: {e}", self.path.display()),
            })?;
        contents.parse::<toml::Table>().map_err(|e| Error::OperationFailed {
            operation: "parse_ai_config".to_string(),
            cause: e.to_string(),
        })
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<AiConfig> {
        let Some(ai) = self.read_table()?.remove("ai") else {
            return Ok(AiConfig::default());
        };
        ai.try_into::<AiConfig>().map_err(|e| Error::OperationFailed {
            operation: "parse_ai_config".to_string(),
            cause: e.to_string(),
        })
    }

    fn save(&self, config: &AiConfig) -> Result<()> {
        let mut table = self.read_table()?;
        let ai = toml::Value::try_from(config).map_err(|e| Error::OperationFailed {
            operation: "serialize_ai_config".to_string(),
            cause: e.to_string(),
        })?;
        table.insert("ai".to_string(), ai);

        let contents = toml::to_string_pretty(&table).map_err(|e| Error::OperationFailed {
            operation: "serialize_ai_config".to_string(),
            cause: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_config_dir".to_string(),
                cause: e.to_string(),
            })?;
        }
        std::fs::write(&self.path, contents).map_err(|e| Error::OperationFailed {
            operation: "write_ai_config".to_string(),
            cause: format!("{}: {e}", self.path.display()),
        })?;

        tracing::debug!(path = %self.path.display(), provider = %config.provider, "Saved AI config");
        Ok(())
    }
}

/// In-process configuration store.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: Mutex<AiConfig>,
}

impl MemoryConfigStore {
    /// Creates a store holding `config`.
    #[must_use]
    pub fn new(config: AiConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }

    /// Creates a store whose active provider is `config`.
    #[must_use]
    pub fn with_active(config: ProviderConfig) -> Self {
        let mut ai = AiConfig::default();
        ai.set_active(config);
        Self::new(ai)
    }

    fn lock(&self) -> MutexGuard<'_, AiConfig> {
        self.config
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<AiConfig> {
        Ok(self.lock().clone())
    }

    fn save(&self, config: &AiConfig) -> Result<()> {
        *self.lock() = config.clone();
        Ok(())
    }
}
