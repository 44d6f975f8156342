//! AI facade.
//!
//! Routes each call to the client for the active provider. The provider
//! settings are read from the [`ConfigStore`] on every call and nothing is
//! cached, so a configuration change applies to the very next request.

use crate::config::{ConfigStore, GeminiConfig, OllamaConfig, OpenAiConfig, ProviderConfig};
use crate::llm::{ASK_APOLOGY, AiProvider, GeminiClient, LlmHttpConfig, OllamaClient, OpenAiClient};
use crate::models::{AiOperation, AnalysisResult};
use crate::observability::{report_connection, report_degraded};
use crate::{AiConfig, Error};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Facade over the three provider clients.
pub struct AiService {
    config_store: Arc<dyn ConfigStore>,
    ollama: Box<dyn AiProvider<Config = OllamaConfig>>,
    gemini: Box<dyn AiProvider<Config = GeminiConfig>>,
    openai: Box<dyn AiProvider<Config = OpenAiConfig>>,
}

impl AiService {
    /// Creates a facade with HTTP clients using timeouts from the environment.
    #[must_use]
    pub fn new(config_store: Arc<dyn ConfigStore>) -> Self {
        Self::with_http_config(config_store, LlmHttpConfig::from_env())
    }

    /// Creates a facade with explicit HTTP timeouts.
    #[must_use]
    pub fn with_http_config(config_store: Arc<dyn ConfigStore>, http: LlmHttpConfig) -> Self {
        Self {
            config_store,
            ollama: Box::new(OllamaClient::with_http_config(http)),
            gemini: Box::new(GeminiClient::with_http_config(http)),
            openai: Box::new(OpenAiClient::with_http_config(http)),
        }
    }

    /// Replaces the Ollama client.
    #[must_use]
    pub fn with_ollama(mut self, client: impl AiProvider<Config = OllamaConfig> + 'static) -> Self {
        self.ollama = Box::new(client);
        self
    }

    /// Replaces the Gemini client.
    #[must_use]
    pub fn with_gemini(mut self, client: impl AiProvider<Config = GeminiConfig> + 'static) -> Self {
        self.gemini = Box::new(client);
        self
    }

    /// Replaces the `OpenAI` client.
    #[must_use]
    pub fn with_openai(mut self, client: impl AiProvider<Config = OpenAiConfig> + 'static) -> Self {
        self.openai = Box::new(client);
        self
    }

    /// Returns the configuration store.
    #[must_use]
    pub fn config_store(&self) -> &Arc<dyn ConfigStore> {
        &self.config_store
    }

    /// Snapshot of the active provider's settings.
    ///
    /// An unreadable store is logged and treated as the default
    /// configuration, so AI calls still go somewhere sensible.
    #[must_use]
    pub fn active_config(&self) -> ProviderConfig {
        self.config_store
            .get_active_provider_config()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Failed to read AI config, using defaults");
                AiConfig::default().active()
            })
    }

    /// Classifies a note with the active provider. Never fails.
    #[must_use]
    pub fn analyze_note(&self, note: &str) -> AnalysisResult {
        self.analyze_note_with(note, &self.active_config())
    }

    /// Classifies a note with explicit provider settings. Never fails.
    #[must_use]
    pub fn analyze_note_with(&self, note: &str, config: &ProviderConfig) -> AnalysisResult {
        guarded(config, AiOperation::Analyze, || AnalysisResult::fallback(note), || match config {
            ProviderConfig::Ollama(c) => self.ollama.analyze(note, c),
            ProviderConfig::Gemini(c) => self.gemini.analyze(note, c),
            ProviderConfig::OpenAi(c) => self.openai.analyze(note, c),
        })
    }

    /// Answers a question about a note with the active provider. Never fails.
    #[must_use]
    pub fn ask_question(&self, note: &str, question: &str) -> String {
        self.ask_question_with(note, question, &self.active_config())
    }

    /// Answers a question with explicit provider settings. Never fails.
    #[must_use]
    pub fn ask_question_with(&self, note: &str, question: &str, config: &ProviderConfig) -> String {
        guarded(config, AiOperation::Ask, || ASK_APOLOGY.to_string(), || match config {
            ProviderConfig::Ollama(c) => self.ollama.ask(note, question, c),
            ProviderConfig::Gemini(c) => self.gemini.ask(note, question, c),
            ProviderConfig::OpenAi(c) => self.openai.ask(note, question, c),
        })
    }

    /// Checks connectivity to the active provider.
    #[must_use]
    pub fn test_connection(&self) -> bool {
        self.test_connection_with(&self.active_config())
    }

    /// Checks connectivity to the provider described by `config`.
    #[must_use]
    pub fn test_connection_with(&self, config: &ProviderConfig) -> bool {
        let connected = guarded(config, AiOperation::TestConnection, || false, || match config {
            ProviderConfig::Ollama(c) => self.ollama.test_connection(c),
            ProviderConfig::Gemini(c) => self.gemini.test_connection(c),
            ProviderConfig::OpenAi(c) => self.openai.test_connection(c),
        });
        report_connection(config.kind().as_str(), connected);
        connected
    }

    /// Lists the active provider's models.
    #[must_use]
    pub fn get_available_models(&self) -> Vec<String> {
        self.get_available_models_with(&self.active_config())
    }

    /// Lists models for the provider described by `config`.
    #[must_use]
    pub fn get_available_models_with(&self, config: &ProviderConfig) -> Vec<String> {
        guarded(config, AiOperation::ListModels, Vec::new, || match config {
            ProviderConfig::Ollama(c) => self.ollama.list_models(c),
            ProviderConfig::Gemini(c) => self.gemini.list_models(c),
            ProviderConfig::OpenAi(c) => self.openai.list_models(c),
        })
    }
}

/// Runs `call`, substituting `fallback()` if it panics.
fn guarded<T>(
    config: &ProviderConfig,
    operation: AiOperation,
    fallback: impl FnOnce() -> T,
    call: impl FnOnce() -> T,
) -> T {
    catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|panic_info| {
        let panic_msg = panic_info
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| panic_info.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        let err = Error::OperationFailed {
            operation: operation.as_str().to_string(),
            cause: format!("provider panicked: {panic_msg}"),
        };
        report_degraded(config.kind().as_str(), operation, &err);
        fallback()
    })
}
