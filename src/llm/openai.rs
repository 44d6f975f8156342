//! `OpenAI`-compatible chat completions client.
//!
//! Works against api.openai.com and against local servers that speak the
//! same protocol (LM Studio, vLLM, llama.cpp server). The bearer header is
//! omitted when no API key is configured.

use super::{
    AiProvider, LlmHttpConfig, ResponseFormat, build_http_client, ensure_success, envelope_error,
    network_error,
};
use crate::config::OpenAiConfig;
use crate::models::AiOperation;
use crate::observability::report_degraded;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER: &str = "openai";
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.7;

/// Models offered when the listing endpoint cannot be reached.
pub const FALLBACK_MODELS: [&str; 3] = ["gpt-3.5-turbo", "gpt-4", "gpt-4-turbo"];

/// `OpenAI` LLM client.
pub struct OpenAiClient {
    /// HTTP client.
    client: reqwest::blocking::Client,
    /// Timeout for `/models` checks.
    check_timeout: Duration,
}

impl OpenAiClient {
    /// Creates a new `OpenAI` client with timeouts from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_http_config(LlmHttpConfig::from_env())
    }

    /// Creates a client with explicit HTTP timeouts.
    #[must_use]
    pub fn with_http_config(config: LlmHttpConfig) -> Self {
        Self {
            client: build_http_client(config),
            check_timeout: config.check_timeout(),
        }
    }

    fn get_models(&self, config: &OpenAiConfig) -> reqwest::Result<reqwest::blocking::Response> {
        authorize(
            self.client
                .get(endpoint(config, "/models"))
                .timeout(self.check_timeout),
            config,
        )
        .send()
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks if the model is a GPT-5 family or reasoning model.
///
/// These use `max_completion_tokens` instead of `max_tokens` and only
/// accept the default temperature.
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5") || model.starts_with("o1") || model.starts_with("o3")
}

fn endpoint(config: &OpenAiConfig, path: &str) -> String {
    format!("{}{path}", config.base_url.trim_end_matches('/'))
}

fn authorize(
    builder: reqwest::blocking::RequestBuilder,
    config: &OpenAiConfig,
) -> reqwest::blocking::RequestBuilder {
    if config.api_key.is_empty() {
        builder
    } else {
        builder.bearer_auth(&config.api_key)
    }
}

impl AiProvider for OpenAiClient {
    type Config = OpenAiConfig;

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model<'a>(&self, config: &'a OpenAiConfig) -> &'a str {
        &config.model
    }

    fn generate(
        &self,
        prompt: &str,
        _format: ResponseFormat,
        config: &OpenAiConfig,
    ) -> Result<String> {
        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }];
        let request = if is_reasoning_model(&config.model) {
            ChatCompletionRequest {
                model: &config.model,
                messages,
                max_tokens: None,
                max_completion_tokens: Some(MAX_TOKENS),
                temperature: None,
            }
        } else {
            ChatCompletionRequest {
                model: &config.model,
                messages,
                max_tokens: Some(MAX_TOKENS),
                max_completion_tokens: None,
                temperature: Some(TEMPERATURE),
            }
        };

        tracing::debug!(provider = PROVIDER, model = %config.model, "Sending chat completion request");
        let response = authorize(
            self.client
                .post(endpoint(config, "/chat/completions"))
                .json(&request),
            config,
        )
        .send()
        .map_err(|e| network_error(PROVIDER, &config.model, &e))?;

        let response: ChatCompletionResponse = ensure_success(PROVIDER, &config.model, response)?
            .json()
            .map_err(|e| envelope_error(PROVIDER, &e))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Error::Parse("no choices in response".to_string()))
    }

    fn test_connection(&self, config: &OpenAiConfig) -> bool {
        self.get_models(config)
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn list_models(&self, config: &OpenAiConfig) -> Vec<String> {
        let response = match self.get_models(config) {
            Ok(response) => response,
            Err(e) => {
                let err = network_error(PROVIDER, &config.model, &e);
                report_degraded(PROVIDER, AiOperation::ListModels, &err);
                return FALLBACK_MODELS.iter().map(ToString::to_string).collect();
            },
        };

        let listing: Result<ModelsResponse> = ensure_success(PROVIDER, &config.model, response)
            .and_then(|r| r.json().map_err(|e| envelope_error(PROVIDER, &e)));
        match listing {
            Ok(listing) => filter_chat_models(listing),
            Err(err) => {
                report_degraded(PROVIDER, AiOperation::ListModels, &err);
                Vec::new()
            },
        }
    }
}

fn filter_chat_models(listing: ModelsResponse) -> Vec<String> {
    listing
        .data
        .into_iter()
        .map(|m| m.id)
        .filter(|id| id.contains("gpt") || id.contains("o1"))
        .collect()
}

/// Request to the Chat Completions API.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// A message in the chat.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Response from the Chat Completions API.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Response from the Models API.
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}
