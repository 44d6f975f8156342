//! Configuration management.
//!
//! Two layers:
//! - [`Settings`]: process-level settings (data directory, HTTP timeouts,
//!   logging) loaded once at startup.
//! - [`AiConfig`]: the provider selection plus settings for all three
//!   providers, read through a [`ConfigStore`] on every AI call.

mod store;

pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore};

use crate::llm::LlmHttpConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Available AI providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Ollama (local).
    #[default]
    Ollama,
    /// Google Gemini.
    Gemini,
    /// `OpenAI` or any compatible chat completions server.
    #[serde(rename = "openai", alias = "open-ai", alias = "open_ai")]
    OpenAi,
}

impl ProviderKind {
    /// Returns the provider name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }

    /// Returns the provider's display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Ollama => "Ollama",
            Self::Gemini => "Gemini",
            Self::OpenAi => "OpenAI",
        }
    }

    /// Parses a provider string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" | "local" => Some(Self::Ollama),
            "gemini" | "google" => Some(Self::Gemini),
            "openai" | "open-ai" | "open_ai" => Some(Self::OpenAi),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ollama settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Server URL.
    pub url: String,
    /// Model name.
    pub model: String,
}

impl OllamaConfig {
    /// Default server URL.
    pub const DEFAULT_URL: &'static str = "http://localhost:11434";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "llama3.2";
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: Self::DEFAULT_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
        }
    }
}

/// Gemini settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key.
    #[serde(rename = "apikey", alias = "api_key")]
    pub api_key: String,
    /// Model name.
    pub model: String,
}

impl GeminiConfig {
    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: Self::DEFAULT_MODEL.to_string(),
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .finish()
    }
}

/// `OpenAI`-compatible settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key; may be empty for local servers.
    #[serde(rename = "apikey", alias = "api_key")]
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// API base URL, e.g. `https://api.openai.com/v1`.
    #[serde(rename = "baseUrl", alias = "base_url")]
    pub base_url: String,
}

impl OpenAiConfig {
    /// Default API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn redact(key: &str) -> &'static str {
    if key.is_empty() { "<unset>" } else { "<redacted>" }
}

/// Settings of the active provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// Local Ollama server.
    Ollama(OllamaConfig),
    /// Gemini API.
    Gemini(GeminiConfig),
    /// `OpenAI`-compatible API.
    OpenAi(OpenAiConfig),
}

impl ProviderConfig {
    /// Returns which provider these settings belong to.
    #[must_use]
    pub const fn kind(&self) -> ProviderKind {
        match self {
            Self::Ollama(_) => ProviderKind::Ollama,
            Self::Gemini(_) => ProviderKind::Gemini,
            Self::OpenAi(_) => ProviderKind::OpenAi,
        }
    }

    /// Returns the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        match self {
            Self::Ollama(c) => &c.model,
            Self::Gemini(c) => &c.model,
            Self::OpenAi(c) => &c.model,
        }
    }
}

/// Provider selection plus the settings of every provider.
///
/// All three provider sections persist together so switching providers
/// does not lose settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// The active provider.
    pub provider: ProviderKind,
    /// Ollama settings.
    pub ollama: OllamaConfig,
    /// Gemini settings.
    pub gemini: GeminiConfig,
    /// `OpenAI`-compatible settings.
    pub openai: OpenAiConfig,
}

impl AiConfig {
    /// Returns a snapshot of the active provider's settings.
    #[must_use]
    pub fn active(&self) -> ProviderConfig {
        match self.provider {
            ProviderKind::Ollama => ProviderConfig::Ollama(self.ollama.clone()),
            ProviderKind::Gemini => ProviderConfig::Gemini(self.gemini.clone()),
            ProviderKind::OpenAi => ProviderConfig::OpenAi(self.openai.clone()),
        }
    }

    /// Stores `config` in its section and makes that provider active.
    pub fn set_active(&mut self, config: ProviderConfig) {
        self.provider = config.kind();
        match config {
            ProviderConfig::Ollama(c) => self.ollama = c,
            ProviderConfig::Gemini(c) => self.gemini = c,
            ProviderConfig::OpenAi(c) => self.openai = c,
        }
    }
}

/// Logging section of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Filter directives, e.g. `smart_notes=debug`.
    pub filter: Option<String>,
    /// Log file path; logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

/// HTTP section of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
    /// Connection-check timeout in milliseconds.
    pub check_timeout_ms: Option<u64>,
}

/// Settings file structure (for TOML parsing).
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// HTTP timeouts.
    pub http: Option<HttpSettings>,
    /// Logging.
    pub logging: Option<LoggingSettings>,
    /// AI provider configuration.
    pub ai: Option<AiConfig>,
}

/// Process-level settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding the notes database.
    pub data_dir: PathBuf,
    /// HTTP client timeouts for providers.
    pub http: LlmHttpConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// Settings file the values came from, if any.
    pub source: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            http: LlmHttpConfig::default(),
            logging: LoggingSettings::default(),
            source: None,
        }
    }
}

impl Settings {
    /// File name of the notes database inside the data directory.
    pub const DATABASE_FILE: &'static str = "notes.db";

    /// Loads settings from a file path.
    ///
    /// A missing file yields defaults, so a fresh install works before the
    /// first `config` command writes one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let file = if path.exists() {
            read_config_file(path)?
        } else {
            ConfigFile::default()
        };
        let mut settings = Self::from_config_file(file);
        settings.source = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Loads settings from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the default file exists but is invalid.
    pub fn load_default() -> crate::Result<Self> {
        Self::load_from_file(&default_config_path())
    }

    /// Path of the notes database.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(Self::DATABASE_FILE)
    }

    /// Converts a [`ConfigFile`] to [`Settings`], applying env overrides.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut settings = Self::default();

        if let Some(data_dir) = file.data_dir {
            settings.data_dir = PathBuf::from(data_dir);
        }
        if let Some(http) = file.http {
            if let Some(v) = http.timeout_ms {
                settings.http.timeout_ms = v;
            }
            if let Some(v) = http.connect_timeout_ms {
                settings.http.connect_timeout_ms = v;
            }
            if let Some(v) = http.check_timeout_ms {
                settings.http.check_timeout_ms = v;
            }
        }
        if let Some(logging) = file.logging {
            settings.logging = logging;
        }
        if let Ok(dir) = std::env::var("SMART_NOTES_DATA_DIR") {
            settings.data_dir = PathBuf::from(dir);
        }
        settings.http = settings.http.with_env_overrides();

        settings
    }
}

/// Reads and parses a settings file.
pub(crate) fn read_config_file(path: &Path) -> crate::Result<ConfigFile> {
    let contents = std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
        operation: "read_config_file".to_string(),
        cause: format!("{}: {e}", path.display()),
    })?;

    toml::from_str(&contents).map_err(|e| crate::Error::OperationFailed {
        operation: "parse_config_file".to_string(),
        cause: e.to_string(),
    })
}

/// Default settings file: `<config dir>/smart-notes/config.toml`.
#[must_use]
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("SMART_NOTES_CONFIG") {
        return PathBuf::from(path);
    }
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".smart-notes").join("config.toml"),
        |dirs| dirs.config_dir().join("smart-notes").join("config.toml"),
    )
}

fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".smart-notes"),
        |dirs| dirs.data_dir().join("smart-notes"),
    )
}
