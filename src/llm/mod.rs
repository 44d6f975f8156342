//! AI provider abstraction.
//!
//! Each backend (Ollama, Gemini, OpenAI-compatible) implements
//! [`AiProvider`] by supplying raw text generation plus connectivity and
//! model-listing checks. The shared analysis and question-answering flow,
//! including the degrade-to-default policy, lives in the trait's provided
//! methods so every backend behaves the same way on failure.

mod gemini;
mod json_extract;
mod ollama;
mod openai;
mod prompts;

pub use gemini::GeminiClient;
pub use json_extract::{MAX_NESTING_DEPTH, extract_json};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use prompts::{build_analysis_prompt, build_ask_prompt};

use crate::models::{AiOperation, AnalysisResult};
use crate::observability::report_degraded;
use crate::{Error, Result};
use serde_json::Value;
use std::time::Duration;

/// Answer returned when a question cannot be processed.
pub const ASK_APOLOGY: &str = "Sorry, I could not process your question at this time.";

/// Output format requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Backend should constrain output to JSON where it supports that.
    Json,
    /// Unconstrained text.
    Text,
}

/// Trait for AI providers.
///
/// Configuration is passed on every call, never cached by the client, so
/// edits take effect on the next request.
pub trait AiProvider: Send + Sync {
    /// Provider-specific settings (endpoint, credentials, model).
    type Config: Send + Sync;

    /// The provider name.
    fn name(&self) -> &'static str;

    /// Model named in `config`.
    fn model<'a>(&self, config: &'a Self::Config) -> &'a str;

    /// Sends `prompt` to the backend and returns the generated text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the request cannot be sent,
    /// [`Error::Protocol`] on a non-success status and [`Error::Parse`] if
    /// the response envelope is malformed.
    fn generate(&self, prompt: &str, format: ResponseFormat, config: &Self::Config)
    -> Result<String>;

    /// Reports whether the backend is reachable with `config`.
    fn test_connection(&self, config: &Self::Config) -> bool;

    /// Lists models usable with `config`. Never fails; returns an empty or
    /// fixed list instead.
    fn list_models(&self, config: &Self::Config) -> Vec<String>;

    /// Classifies a note, propagating every failure.
    ///
    /// # Errors
    ///
    /// Returns the generation error, or [`Error::Parse`] when no JSON can be
    /// recovered from the response.
    fn try_analyze(&self, note: &str, config: &Self::Config) -> Result<AnalysisResult> {
        let prompt = build_analysis_prompt(note);
        let raw = self.generate(&prompt, ResponseFormat::Json, config)?;
        let value = extract_json(&raw)?;
        Ok(AnalysisResult::from_extracted(
            &value,
            note,
            Some(self.model(config)),
        ))
    }

    /// Classifies a note, degrading to [`AnalysisResult::fallback`] on any
    /// failure.
    fn analyze(&self, note: &str, config: &Self::Config) -> AnalysisResult {
        self.try_analyze(note, config).unwrap_or_else(|err| {
            report_degraded(self.name(), AiOperation::Analyze, &err);
            AnalysisResult::fallback(note)
        })
    }

    /// Answers a question about a note, propagating every failure.
    ///
    /// # Errors
    ///
    /// Returns the generation error, or [`Error::Parse`] if the backend
    /// produced no text at all.
    fn try_ask(&self, note: &str, question: &str, config: &Self::Config) -> Result<String> {
        let prompt = build_ask_prompt(note, question);
        let raw = self.generate(&prompt, ResponseFormat::Json, config)?;
        answer_from_response(&raw)
    }

    /// Answers a question about a note, degrading to [`ASK_APOLOGY`].
    fn ask(&self, note: &str, question: &str, config: &Self::Config) -> String {
        self.try_ask(note, question, config).unwrap_or_else(|err| {
            report_degraded(self.name(), AiOperation::Ask, &err);
            ASK_APOLOGY.to_string()
        })
    }
}

/// Picks the `answer` field out of a response, or keeps the raw text.
///
/// # Errors
///
/// Returns [`Error::Parse`] for an empty response.
pub fn answer_from_response(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(Error::Parse("empty response".to_string()));
    }
    let answer = extract_json(raw).ok().and_then(|value| {
        value
            .get("answer")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    });
    Ok(answer.unwrap_or_else(|| raw.to_string()))
}

/// HTTP client configuration for AI providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmHttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
    /// Timeout for connectivity checks and model listings.
    pub check_timeout_ms: u64,
}

impl Default for LlmHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            connect_timeout_ms: 3_000,
            check_timeout_ms: 5_000,
        }
    }
}

impl LlmHttpConfig {
    /// Loads HTTP configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_millis("SMART_NOTES_LLM_TIMEOUT_MS") {
            self.timeout_ms = v;
        }
        if let Some(v) = env_millis("SMART_NOTES_LLM_CONNECT_TIMEOUT_MS") {
            self.connect_timeout_ms = v;
        }
        if let Some(v) = env_millis("SMART_NOTES_LLM_CHECK_TIMEOUT_MS") {
            self.check_timeout_ms = v;
        }
        self
    }

    /// Connection-check timeout as a [`Duration`].
    #[must_use]
    pub const fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }
}

fn env_millis(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse::<u64>().ok())
}

/// Builds a blocking HTTP client with configured timeouts.
#[must_use]
pub fn build_http_client(config: LlmHttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build AI HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}

/// Converts a send failure into [`Error::Network`], logging its kind.
pub(crate) fn network_error(provider: &'static str, model: &str, e: &reqwest::Error) -> Error {
    let error_kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_request() {
        "request"
    } else {
        "unknown"
    };
    tracing::error!(
        provider = provider,
        model = %model,
        error = %e,
        error_kind = error_kind,
        "AI request failed"
    );
    Error::Network {
        provider,
        cause: format!("{error_kind} error: {e}"),
    }
}

/// Passes successful responses through; turns others into
/// [`Error::Protocol`].
pub(crate) fn ensure_success(
    provider: &'static str,
    model: &str,
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    tracing::error!(
        provider = provider,
        model = %model,
        status = %status,
        body = %body,
        "AI API returned error status"
    );
    Err(Error::Protocol {
        provider,
        status: status.as_u16(),
        body,
    })
}

/// Converts an envelope decoding failure into [`Error::Parse`].
pub(crate) fn envelope_error(provider: &'static str, e: &reqwest::Error) -> Error {
    tracing::error!(provider = provider, error = %e, "Failed to decode AI response envelope");
    Error::Parse(format!("{provider} response envelope: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NoteType, Priority};
    use std::sync::Mutex;

    /// Provider double replaying canned generations.
    struct ScriptedProvider {
        reply: Mutex<Option<Result<String>>>,
    }

    impl ScriptedProvider {
        fn replying(reply: Result<String>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
            }
        }
    }

    impl AiProvider for ScriptedProvider {
        type Config = String;

        fn name(&self) -> &'static str {
            "scripted"
        }

        fn model<'a>(&self, config: &'a String) -> &'a str {
            config
        }

        fn generate(&self, _prompt: &str, _format: ResponseFormat, _config: &String) -> Result<String> {
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(Error::Parse("exhausted".to_string())))
        }

        fn test_connection(&self, _config: &String) -> bool {
            true
        }

        fn list_models(&self, config: &String) -> Vec<String> {
            vec![config.clone()]
        }
    }

    #[test]
    fn test_analyze_maps_response() {
        let provider = ScriptedProvider::replying(Ok(
            r#"{"type":"todo","priority":"high","summary":"Buy milk","actionItems":["Go to store"]}"#
                .to_string(),
        ));
        let analysis = provider.analyze("buy milk", &"m1".to_string());
        assert_eq!(analysis.note_type, NoteType::Todo);
        assert_eq!(analysis.priority, Priority::High);
        assert_eq!(analysis.summary, "Buy milk");
        assert_eq!(analysis.action_items, vec!["Go to store".to_string()]);
        assert_eq!(analysis.model.as_deref(), Some("m1"));
    }

    #[test]
    fn test_analyze_falls_back_on_network_error() {
        let provider = ScriptedProvider::replying(Err(Error::Network {
            provider: "scripted",
            cause: "connect error".to_string(),
        }));
        let note = "x".repeat(120);
        let analysis = provider.analyze(&note, &"m1".to_string());
        assert_eq!(analysis, AnalysisResult::fallback(&note));
        assert_eq!(analysis.summary.len(), 50);
    }

    #[test]
    fn test_analyze_falls_back_on_unparseable_text() {
        let provider = ScriptedProvider::replying(Ok("I think this is a todo".to_string()));
        let analysis = provider.analyze("buy milk", &"m1".to_string());
        assert_eq!(analysis, AnalysisResult::fallback("buy milk"));
    }

    #[test]
    fn test_try_analyze_propagates_error() {
        let provider = ScriptedProvider::replying(Err(Error::Protocol {
            provider: "scripted",
            status: 503,
            body: String::new(),
        }));
        let err = provider.try_analyze("n", &"m".to_string()).unwrap_err();
        assert!(matches!(err, Error::Protocol { status: 503, .. }));
    }

    #[test]
    fn test_ask_returns_answer_field() {
        let provider = ScriptedProvider::replying(Ok(r#"{"answer": "At five."}"#.to_string()));
        assert_eq!(provider.ask("meeting at 5", "when?", &"m".to_string()), "At five.");
    }

    #[test]
    fn test_ask_returns_raw_text_without_answer() {
        let provider = ScriptedProvider::replying(Ok("It is at five.".to_string()));
        assert_eq!(provider.ask("meeting at 5", "when?", &"m".to_string()), "It is at five.");
    }

    #[test]
    fn test_ask_apologizes_on_failure() {
        let provider = ScriptedProvider::replying(Err(Error::Network {
            provider: "scripted",
            cause: "timeout".to_string(),
        }));
        assert_eq!(provider.ask("n", "q", &"m".to_string()), ASK_APOLOGY);
    }

    #[test]
    fn test_answer_from_response_rejects_empty() {
        assert!(answer_from_response("  ").is_err());
        assert_eq!(
            answer_from_response(r#"{"other": 1}"#).unwrap(),
            r#"{"other": 1}"#
        );
    }

    #[test]
    fn test_http_config_defaults() {
        let config = LlmHttpConfig::default();
        assert!(config.timeout_ms > 0);
        assert!(config.connect_timeout_ms > 0);
        assert_eq!(config.check_timeout(), Duration::from_millis(5_000));
    }
}
