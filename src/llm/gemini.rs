//! Google Gemini client.

use super::{
    AiProvider, LlmHttpConfig, ResponseFormat, build_http_client, ensure_success, envelope_error,
    network_error,
};
use crate::config::GeminiConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER: &str = "gemini";

/// Models offered by [`GeminiClient::list_models`].
pub const GEMINI_MODELS: [&str; 3] = ["gemini-2.5-flash", "gemini-2.5-flash-lite", "gemini-1.5-flash"];

/// Gemini API client.
pub struct GeminiClient {
    /// API root, without a trailing slash.
    endpoint: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
    /// Timeout for connectivity checks.
    check_timeout: Duration,
}

impl GeminiClient {
    /// Default API root.
    pub const DEFAULT_ENDPOINT: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    /// Creates a new Gemini client with timeouts from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_http_config(LlmHttpConfig::from_env())
    }

    /// Creates a client with explicit HTTP timeouts.
    #[must_use]
    pub fn with_http_config(config: LlmHttpConfig) -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            client: build_http_client(config),
            check_timeout: config.check_timeout(),
        }
    }

    /// Sets the API root (used for proxies and tests).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str, api_key: &str) -> Result<reqwest::Url> {
        reqwest::Url::parse_with_params(&format!("{}{path}", self.endpoint), &[("key", api_key)])
            .map_err(|e| Error::InvalidInput(format!("invalid Gemini endpoint: {e}")))
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AiProvider for GeminiClient {
    type Config = GeminiConfig;

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model<'a>(&self, config: &'a GeminiConfig) -> &'a str {
        &config.model
    }

    fn generate(
        &self,
        prompt: &str,
        _format: ResponseFormat,
        config: &GeminiConfig,
    ) -> Result<String> {
        if config.api_key.is_empty() {
            return Err(Error::InvalidInput("Gemini API key is not set".to_string()));
        }

        let url = self.url(
            &format!("/models/{}:generateContent", config.model),
            &config.api_key,
        )?;
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        tracing::debug!(provider = PROVIDER, model = %config.model, "Sending generateContent request");
        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .map_err(|e| network_error(PROVIDER, &config.model, &e))?;

        let response: GenerateContentResponse = ensure_success(PROVIDER, &config.model, response)?
            .json()
            .map_err(|e| envelope_error(PROVIDER, &e))?;

        Ok(response.text())
    }

    fn test_connection(&self, config: &GeminiConfig) -> bool {
        if config.api_key.is_empty() {
            return false;
        }
        let Ok(url) = self.url("/models", &config.api_key) else {
            return false;
        };
        self.client
            .get(url)
            .timeout(self.check_timeout)
            .send()
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn list_models(&self, _config: &GeminiConfig) -> Vec<String> {
        GEMINI_MODELS.iter().map(ToString::to_string).collect()
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Response envelope; every level may be missing.
#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, whitespace collapsed.
    /// Empty when any level is absent.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    }
}
