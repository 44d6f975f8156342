//! Provider integration tests.
//!
//! Each client talks to a `wiremock` server replaying canned responses, so
//! the request and envelope shapes are exercised end to end without a real
//! backend. The clients use blocking HTTP, so they are built, called and
//! dropped inside `spawn_blocking`. Refused ports cover the offline paths.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use serde_json::{Value, json};
use smart_notes::config::{
    ConfigStore, GeminiConfig, MemoryConfigStore, OllamaConfig, OpenAiConfig, ProviderConfig,
};
use smart_notes::llm::{
    ASK_APOLOGY, AiProvider, GeminiClient, LlmHttpConfig, OllamaClient, OpenAiClient,
    ResponseFormat,
};
use smart_notes::models::{AnalysisResult, NoteType, Priority};
use smart_notes::observability::global_event_bus;
use smart_notes::services::AiService;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const TODO_JSON: &str = r#"{"type":"todo","priority":"high","summary":"Buy milk","actionItems":["Go to store"]}"#;

fn http() -> LlmHttpConfig {
    LlmHttpConfig {
        timeout_ms: 5_000,
        connect_timeout_ms: 1_000,
        check_timeout_ms: 1_000,
    }
}

/// Base URL of a loopback port nothing listens on.
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Runs blocking client code off the async runtime.
async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

async fn received(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap()
}

fn body_json(request: &Request) -> Value {
    request.body_json().unwrap()
}

fn ok_json(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn ollama_config(url: String) -> OllamaConfig {
    OllamaConfig {
        url,
        model: "llama3.2".to_string(),
    }
}

fn openai_config(base_url: String, api_key: &str) -> OpenAiConfig {
    OpenAiConfig {
        api_key: api_key.to_string(),
        model: "gpt-4o-mini".to_string(),
        base_url,
    }
}

fn gemini_config(api_key: &str) -> GeminiConfig {
    GeminiConfig {
        api_key: api_key.to_string(),
        model: "gemini-2.5-flash".to_string(),
    }
}

fn assert_buy_milk(analysis: &AnalysisResult) {
    assert_eq!(analysis.note_type, NoteType::Todo);
    assert_eq!(analysis.priority, Priority::High);
    assert_eq!(analysis.summary, "Buy milk");
    assert_eq!(analysis.action_items, vec!["Go to store".to_string()]);
}

// Ollama

#[tokio::test]
async fn test_ollama_analyze_reads_response_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ok_json(json!({ "response": TODO_JSON })))
        .expect(1)
        .mount(&server)
        .await;
    let config = ollama_config(server.uri());

    let analysis = blocking(move || {
        OllamaClient::with_http_config(http()).analyze("buy milk tomorrow", &config)
    })
    .await;
    assert_buy_milk(&analysis);
    assert_eq!(analysis.model.as_deref(), Some("llama3.2"));

    let requests = received(&server).await;
    assert_eq!(requests.len(), 1);
    let sent = body_json(&requests[0]);
    assert_eq!(sent["model"], "llama3.2");
    assert_eq!(sent["stream"], false);
    assert_eq!(sent["format"], "json");
    assert!(sent["prompt"].as_str().unwrap().contains("buy milk tomorrow"));
}

#[tokio::test]
async fn test_ollama_trailing_slash_in_url_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ok_json(json!({ "response": TODO_JSON })))
        .expect(1)
        .mount(&server)
        .await;
    let config = ollama_config(format!("{}/", server.uri()));

    let analysis =
        blocking(move || OllamaClient::with_http_config(http()).analyze("buy milk", &config)).await;
    assert_buy_milk(&analysis);
    assert_eq!(received(&server).await[0].url.path(), "/api/generate");
}

#[tokio::test]
async fn test_ollama_server_error_degrades_to_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
        .expect(2)
        .mount(&server)
        .await;
    let config = ollama_config(server.uri());

    let (kind, fallback) = blocking(move || {
        let client = OllamaClient::with_http_config(http());
        let err = client.try_analyze("remember the keys", &config).unwrap_err();
        (err.kind(), client.analyze("remember the keys", &config))
    })
    .await;
    assert_eq!(kind, "protocol");
    assert_eq!(fallback, AnalysisResult::fallback("remember the keys"));
}

#[tokio::test]
async fn test_ollama_unparseable_model_output_degrades() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ok_json(json!({ "response": "I am not sure what you mean." })))
        .mount(&server)
        .await;
    let config = ollama_config(server.uri());

    let analysis =
        blocking(move || OllamaClient::with_http_config(http()).analyze("what now", &config)).await;
    assert_eq!(analysis, AnalysisResult::fallback("what now"));
}

#[tokio::test]
async fn test_ollama_ask_uses_answer_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ok_json(json!({ "response": r#"{"answer":"Tomorrow morning."}"# })))
        .mount(&server)
        .await;
    let config = ollama_config(server.uri());

    let answer = blocking(move || {
        OllamaClient::with_http_config(http()).ask("buy milk", "when?", &config)
    })
    .await;
    assert_eq!(answer, "Tomorrow morning.");

    let sent = body_json(&received(&server).await[0]);
    let prompt = sent["prompt"].as_str().unwrap();
    assert!(prompt.contains("buy milk"));
    assert!(prompt.contains("when?"));
}

#[tokio::test]
async fn test_ollama_lists_tag_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ok_json(
            json!({ "models": [{ "name": "llama3.2" }, { "name": "mistral" }] }),
        ))
        .expect(1)
        .mount(&server)
        .await;
    let config = ollama_config(server.uri());

    let models =
        blocking(move || OllamaClient::with_http_config(http()).list_models(&config)).await;
    assert_eq!(models, vec!["llama3.2".to_string(), "mistral".to_string()]);
}

#[tokio::test]
async fn test_ollama_connection_check() {
    let up = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ok_json(json!({ "models": [] })))
        .mount(&up)
        .await;
    // No mocks mounted: every request gets a 404.
    let missing = MockServer::start().await;
    let (up_url, missing_url) = (up.uri(), missing.uri());

    let results = blocking(move || {
        let client = OllamaClient::with_http_config(http());
        [up_url, missing_url, closed_port_url()]
            .map(|url| client.test_connection(&ollama_config(url)))
    })
    .await;
    assert_eq!(results, [true, false, false]);
}

// OpenAI-compatible

#[tokio::test]
async fn test_openai_analyze_reads_first_choice() {
    let server = MockServer::start().await;
    let content = format!("```json\n{TODO_JSON}\n```");
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ok_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let config = openai_config(format!("{}/v1", server.uri()), "sk-test");

    let analysis =
        blocking(move || OpenAiClient::with_http_config(http()).analyze("buy milk", &config)).await;
    assert_buy_milk(&analysis);

    let sent = body_json(&received(&server).await[0]);
    assert_eq!(sent["model"], "gpt-4o-mini");
    assert_eq!(sent["max_tokens"], 1000);
    assert!(sent.get("max_completion_tokens").is_none());
    assert_eq!(sent["messages"][0]["role"], "user");
}

#[tokio::test]
async fn test_openai_reasoning_model_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ok_json(
            json!({ "choices": [{ "message": { "content": TODO_JSON } }] }),
        ))
        .mount(&server)
        .await;
    let mut config = openai_config(server.uri(), "sk-test");
    config.model = "o1-mini".to_string();

    blocking(move || OpenAiClient::with_http_config(http()).analyze("buy milk", &config)).await;

    let sent = body_json(&received(&server).await[0]);
    assert_eq!(sent["max_completion_tokens"], 1000);
    assert!(sent.get("max_tokens").is_none());
    assert!(sent.get("temperature").is_none());
}

#[tokio::test]
async fn test_openai_local_server_without_key_sends_no_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ok_json(
            json!({ "choices": [{ "message": { "content": "{\"answer\":\"42\"}" } }] }),
        ))
        .mount(&server)
        .await;
    let config = openai_config(server.uri(), "");

    let answer = blocking(move || {
        OpenAiClient::with_http_config(http()).ask("note", "question", &config)
    })
    .await;
    assert_eq!(answer, "42");
    assert!(received(&server).await[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_openai_empty_choices_degrade() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ok_json(json!({ "choices": [] })))
        .mount(&server)
        .await;
    let config = openai_config(server.uri(), "sk-test");

    let answer = blocking(move || {
        OpenAiClient::with_http_config(http()).ask("note", "question", &config)
    })
    .await;
    assert_eq!(answer, ASK_APOLOGY);
}

#[tokio::test]
async fn test_openai_unauthorized_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "bad key" })))
        .mount(&server)
        .await;
    let config = openai_config(server.uri(), "sk-wrong");

    let kind = blocking(move || {
        OpenAiClient::with_http_config(http())
            .generate("hello", ResponseFormat::Text, &config)
            .unwrap_err()
            .kind()
    })
    .await;
    assert_eq!(kind, "protocol");
}

#[tokio::test]
async fn test_openai_list_models_filters_chat_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ok_json(json!({
            "data": [
                { "id": "gpt-4o" },
                { "id": "text-embedding-3-small" },
                { "id": "o1-preview" },
                { "id": "whisper-1" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let config = openai_config(server.uri(), "sk-test");

    let models =
        blocking(move || OpenAiClient::with_http_config(http()).list_models(&config)).await;
    assert_eq!(models, vec!["gpt-4o".to_string(), "o1-preview".to_string()]);
}

#[tokio::test]
async fn test_openai_list_models_rejected_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let config = openai_config(server.uri(), "sk-test");

    let models =
        blocking(move || OpenAiClient::with_http_config(http()).list_models(&config)).await;
    assert!(models.is_empty());
}

#[test]
fn test_openai_list_models_offline_uses_catalog() {
    let client = OpenAiClient::with_http_config(http());
    let config = openai_config(closed_port_url(), "sk-test");

    assert_eq!(
        client.list_models(&config),
        vec![
            "gpt-3.5-turbo".to_string(),
            "gpt-4".to_string(),
            "gpt-4-turbo".to_string()
        ]
    );
}

// Gemini

#[tokio::test]
async fn test_gemini_analyze_reads_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "abc123"))
        .respond_with(ok_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": TODO_JSON }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let endpoint = format!("{}/v1beta", server.uri());

    let analysis = blocking(move || {
        GeminiClient::with_http_config(http())
            .with_endpoint(endpoint)
            .analyze("buy milk", &gemini_config("abc123"))
    })
    .await;
    assert_buy_milk(&analysis);

    let sent = body_json(&received(&server).await[0]);
    assert!(
        sent["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("buy milk")
    );
}

#[tokio::test]
async fn test_gemini_missing_candidates_degrade() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok_json(json!({ "promptFeedback": { "blockReason": "SAFETY" } })))
        .mount(&server)
        .await;
    let endpoint = server.uri();

    let analysis = blocking(move || {
        GeminiClient::with_http_config(http())
            .with_endpoint(endpoint)
            .analyze("some note", &gemini_config("abc123"))
    })
    .await;
    assert_eq!(analysis, AnalysisResult::fallback("some note"));
}

#[tokio::test]
async fn test_gemini_without_key_never_sends() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    let endpoint = server.uri();

    let (kind, connected) = blocking(move || {
        let client = GeminiClient::with_http_config(http()).with_endpoint(endpoint);
        let config = gemini_config("");
        let err = client
            .generate("hello", ResponseFormat::Json, &config)
            .unwrap_err();
        (err.kind(), client.test_connection(&config))
    })
    .await;
    assert_eq!(kind, "invalid_input");
    assert!(!connected);
    assert!(received(&server).await.is_empty());
}

#[tokio::test]
async fn test_gemini_connection_check_lists_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(query_param("key", "abc123"))
        .respond_with(ok_json(json!({ "models": [] })))
        .expect(1)
        .mount(&server)
        .await;
    let endpoint = server.uri();

    let connected = blocking(move || {
        GeminiClient::with_http_config(http())
            .with_endpoint(endpoint)
            .test_connection(&gemini_config("abc123"))
    })
    .await;
    assert!(connected);
}

// Facade

#[tokio::test]
async fn test_facade_routes_to_active_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ok_json(json!({ "response": TODO_JSON })))
        .expect(1)
        .mount(&server)
        .await;
    let store = Arc::new(MemoryConfigStore::with_active(ProviderConfig::Ollama(
        ollama_config(server.uri()),
    )));

    let analysis =
        blocking(move || AiService::with_http_config(store, http()).analyze_note("buy milk")).await;
    assert_buy_milk(&analysis);
    assert_eq!(received(&server).await.len(), 1);
}

#[tokio::test]
async fn test_facade_reads_config_on_every_call() {
    let first = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ok_json(json!({ "response": r#"{"answer":"one"}"# })))
        .expect(1)
        .mount(&first)
        .await;
    let second = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ok_json(
            json!({ "choices": [{ "message": { "content": r#"{"answer":"two"}"# } }] }),
        ))
        .expect(1)
        .mount(&second)
        .await;
    let store = Arc::new(MemoryConfigStore::with_active(ProviderConfig::Ollama(
        ollama_config(first.uri()),
    )));
    let second_url = second.uri();

    let answers = blocking(move || {
        let ai = AiService::with_http_config(Arc::clone(&store) as Arc<dyn ConfigStore>, http());
        let before = ai.ask_question("note", "which?");

        let mut config = store.load().unwrap();
        config.set_active(ProviderConfig::OpenAi(openai_config(second_url, "")));
        store.save(&config).unwrap();

        (before, ai.ask_question("note", "which?"))
    })
    .await;
    assert_eq!(answers, ("one".to_string(), "two".to_string()));
}

#[test_case::test_case(ProviderConfig::Ollama(ollama_config(closed_port_url())) ; "ollama")]
#[test_case::test_case(ProviderConfig::OpenAi(openai_config(closed_port_url(), "sk")) ; "openai")]
fn test_facade_offline_provider_degrades(config: ProviderConfig) {
    let store = Arc::new(MemoryConfigStore::with_active(config));
    let ai = AiService::with_http_config(store, http());

    assert_eq!(
        ai.analyze_note("call the dentist"),
        AnalysisResult::fallback("call the dentist")
    );
    assert_eq!(ai.ask_question("call the dentist", "when?"), ASK_APOLOGY);
    assert!(!ai.test_connection());
}

#[test]
fn test_offline_analysis_publishes_degraded_event() {
    let mut degraded = global_event_bus().subscribe_filtered(|event| {
        event.event_type() == "degraded" && event.provider() == "ollama"
    });
    let client = OllamaClient::with_http_config(http());

    client.analyze("note", &ollama_config(closed_port_url()));

    let event = degraded.try_recv().expect("degraded event");
    assert_eq!(event.provider(), "ollama");
}
