//! Contract tests for the Gemini client against a local mock server.

use concierge_ai::{AiError, GeminiClient, GenerationConfig, TextGenerator};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-1.5-flash";
const GENERATE_PATH: &str = "/models/gemini-1.5-flash:generateContent";

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key", MODEL, &server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_generate_sends_prompt_and_sampling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "capital of France?"}]}],
            "generationConfig": {"topK": 40, "maxOutputTokens": 1024}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Paris."}]},
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server)
        .generate("capital of France?", &GenerationConfig::default())
        .await
        .unwrap();

    assert_eq!(text, "Paris.");
}

#[tokio::test]
async fn test_api_error_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .generate("hi", &GenerationConfig::default())
        .await
        .unwrap_err();

    match err {
        AiError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid.");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body_is_kept() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client(&server)
        .generate("hi", &GenerationConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "API returned 503: upstream unavailable");
}

#[tokio::test]
async fn test_empty_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let err = client(&server)
        .generate("hi", &GenerationConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AiError::EmptyResponse { reason: None }));
}
