//! Edits made by the `config` command.

use crate::config::{AiConfig, ProviderKind};
use crate::{Error, Result};

/// Requested configuration changes; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    /// Provider to switch to.
    pub provider: Option<String>,
    /// Model for the targeted provider.
    pub model: Option<String>,
    /// Ollama server URL.
    pub url: Option<String>,
    /// API key for Gemini or `OpenAI`.
    pub api_key: Option<String>,
    /// `OpenAI`-compatible base URL.
    pub base_url: Option<String>,
}

impl ConfigUpdate {
    /// Returns `true` when no change was requested.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.provider.is_none()
            && self.model.is_none()
            && self.url.is_none()
            && self.api_key.is_none()
            && self.base_url.is_none()
    }
}

/// Applies `update` to `config`.
///
/// Model and credential changes target the provider being switched to, or
/// the active one when the provider is unchanged.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for an unknown provider or a setting the
/// targeted provider does not have.
pub fn apply_config_update(mut config: AiConfig, update: ConfigUpdate) -> Result<AiConfig> {
    if let Some(name) = update.provider.as_deref() {
        config.provider = ProviderKind::parse(name).ok_or_else(|| {
            Error::InvalidInput(format!(
                "unknown provider '{name}' (expected ollama, gemini or openai)"
            ))
        })?;
    }
    let target = config.provider;

    let unsupported = |setting: &str| {
        Error::InvalidInput(format!(
            "{setting} does not apply to the {} provider",
            target.display_name()
        ))
    };

    if let Some(model) = update.model {
        match target {
            ProviderKind::Ollama => config.ollama.model = model,
            ProviderKind::Gemini => config.gemini.model = model,
            ProviderKind::OpenAi => config.openai.model = model,
        }
    }
    if let Some(url) = update.url {
        match target {
            ProviderKind::Ollama => config.ollama.url = url,
            _ => return Err(unsupported("--url")),
        }
    }
    if let Some(key) = update.api_key {
        match target {
            ProviderKind::Gemini => config.gemini.api_key = key,
            ProviderKind::OpenAi => config.openai.api_key = key,
            ProviderKind::Ollama => return Err(unsupported("--api-key")),
        }
    }
    if let Some(base_url) = update.base_url {
        match target {
            ProviderKind::OpenAi => config.openai.base_url = base_url,
            _ => return Err(unsupported("--base-url")),
        }
    }

    Ok(config)
}
