//! Ollama (local) client.

use super::{
    AiProvider, LlmHttpConfig, ResponseFormat, build_http_client, ensure_success, envelope_error,
    network_error,
};
use crate::Result;
use crate::config::OllamaConfig;
use crate::models::AiOperation;
use crate::observability::report_degraded;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER: &str = "ollama";

/// Ollama local LLM client.
pub struct OllamaClient {
    /// HTTP client.
    client: reqwest::blocking::Client,
    /// Timeout for `/api/tags` checks.
    check_timeout: Duration,
}

impl OllamaClient {
    /// Creates a new Ollama client with timeouts from the environment.
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

    fn tags(&self, config: &OllamaConfig) -> Result<TagsResponse> {
        let response = self
            .client
            .get(endpoint(config, "/api/tags"))
            .timeout(self.check_timeout)
            .send()
            .map_err(|e| network_error(PROVIDER, &config.model, &e))?;
        ensure_success(PROVIDER, &config.model, response)?
            .json()
            .map_err(|e| envelope_error(PROVIDER, &e))
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AiProvider for OllamaClient {
    type Config = OllamaConfig;

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model<'a>(&self, config: &'a OllamaConfig) -> &'a str {
        &config.model
    }

    fn generate(
        &self,
        prompt: &str,
        format: ResponseFormat,
        config: &OllamaConfig,
    ) -> Result<String> {
        let request = GenerateRequest {
            model: &config.model,
            prompt,
            stream: false,
            format: matches!(format, ResponseFormat::Json).then_some("json"),
        };

        tracing::debug!(provider = PROVIDER, model = %config.model, "Sending generate request");
        let response = self
            .client
            .post(endpoint(config, "/api/generate"))
            .json(&request)
            .send()
            .map_err(|e| network_error(PROVIDER, &config.model, &e))?;

        let response: GenerateResponse = ensure_success(PROVIDER, &config.model, response)?
            .json()
            .map_err(|e| envelope_error(PROVIDER, &e))?;

        Ok(response.response)
    }

    fn test_connection(&self, config: &OllamaConfig) -> bool {
        self.client
            .get(endpoint(config, "/api/tags"))
            .timeout(self.check_timeout)
            .send()
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn list_models(&self, config: &OllamaConfig) -> Vec<String> {
        match self.tags(config) {
            Ok(tags) => tags.models.into_iter().map(|m| m.name).collect(),
            Err(err) => {
                report_degraded(PROVIDER, AiOperation::ListModels, &err);
                Vec::new()
            },
        }
    }
}

fn endpoint(config: &OllamaConfig, path: &str) -> String {
    format!("{}{path}", config.url.trim_end_matches('/'))
}

/// Request to the Generate API.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

/// Response from the Generate API.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Response from the Tags API.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> OllamaConfig {
        OllamaConfig {
            url: format!("{}/", crate::test_support::closed_port_url()),
            model: "llama3.2".to_string(),
        }
    }

    fn fast_client() -> OllamaClient {
        OllamaClient::with_http_config(LlmHttpConfig {
            timeout_ms: 500,
            connect_timeout_ms: 200,
            check_timeout_ms: 200,
        })
    }

    #[test]
    fn test_client_creation() {
        let client = OllamaClient::default();
        assert_eq!(client.name(), "ollama");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = OllamaConfig {
            url: "http://localhost:11434/".to_string(),
            model: "llama3.2".to_string(),
        };
        assert_eq!(
            endpoint(&config, "/api/generate"),
            "http://localhost:11434/api/generate"
        );
    }

    #[test]
    fn test_generate_request_shape() {
        let request = GenerateRequest {
            model: "llama3.2",
            prompt: "hi",
            stream: false,
            format: Some("json"),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"model": "llama3.2", "prompt": "hi", "stream": false, "format": "json"})
        );

        let text = GenerateRequest {
            format: None,
            ..request
        };
        assert!(serde_json::to_value(&text).unwrap().get("format").is_none());
    }

    #[test]
    fn test_tags_response_names() {
        let tags: TagsResponse = serde_json::from_str(
            r#"{"models":[{"name":"llama3.2:latest","size":1},{"name":"mistral"}]}"#,
        )
        .unwrap();
        let names: Vec<_> = tags.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["llama3.2:latest", "mistral"]);
    }

    #[test]
    fn test_unreachable_server_degrades() {
        let client = fast_client();
        let config = unreachable_config();
        assert!(!client.test_connection(&config));
        assert!(client.list_models(&config).is_empty());
        assert!(matches!(
            client.generate("p", ResponseFormat::Json, &config),
            Err(crate::Error::Network { .. })
        ));
    }
}
