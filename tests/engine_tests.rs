//! Engine adapter tests against mocked HTTP providers.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use polyglot::engines::{
    EngineError, GenerativeEngine, LexiconEngine, PhraseEngine, TranslateRequest,
    TranslationEngine,
};

fn request(text: &str, target: &str) -> TranslateRequest {
    TranslateRequest {
        text: text.to_string(),
        target_language: target.to_string(),
        source_language: None,
    }
}

#[tokio::test]
async fn test_lexicon_engine_translates_and_reports_zero_cost() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/language/translate/v2"))
        .and(body_partial_json(json!({"q": "Red sneakers", "target": "fr"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "translations": [
                    { "translatedText": "Baskets rouges" }
                ]
            }
        })))
        .mount(&server)
        .await;

    let engine = LexiconEngine::new(
        reqwest::Client::new(),
        server.uri(),
        Some("test-key".to_string()),
    );

    let outcome = engine
        .translate(request("Red sneakers", "fr"))
        .await
        .expect("translate succeeds");

    assert_eq!(outcome.translated_text, "Baskets rouges");
    assert_eq!(outcome.cost_units, 0);
}

#[tokio::test]
async fn test_lexicon_engine_without_key_is_unprovisioned() {
    let engine = LexiconEngine::new(
        reqwest::Client::new(),
        "https://translation.example.com".to_string(),
        None,
    );

    let result = engine.translate(request("hello", "fr")).await;

    match result {
        Err(err) => assert!(err.is_configuration()),
        Ok(_) => panic!("Expected configuration error"),
    }
}

#[tokio::test]
async fn test_lexicon_engine_propagates_http_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/language/translate/v2"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let engine = LexiconEngine::new(
        reqwest::Client::new(),
        server.uri(),
        Some("test-key".to_string()),
    );

    let result = engine.translate(request("hello", "fr")).await;

    match result {
        Err(EngineError::Http { status, body }) => {
            assert_eq!(status, 403);
            assert!(body.contains("quota exceeded"));
        }
        other => panic!("Expected HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_phrase_engine_translates_and_reports_zero_cost() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(body_partial_json(json!({
            "q": "Red sneakers",
            "source": "auto",
            "target": "de"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "translatedText": "Rote Turnschuhe"
        })))
        .mount(&server)
        .await;

    let engine = PhraseEngine::new(reqwest::Client::new(), Some(server.uri()), None);

    let outcome = engine
        .translate(request("Red sneakers", "de"))
        .await
        .expect("translate succeeds");

    assert_eq!(outcome.translated_text, "Rote Turnschuhe");
    assert_eq!(outcome.cost_units, 0);
}

#[tokio::test]
async fn test_phrase_engine_without_endpoint_is_unprovisioned() {
    let engine = PhraseEngine::new(reqwest::Client::new(), None, None);

    let result = engine.translate(request("hello", "de")).await;

    match result {
        Err(err) => assert!(err.is_configuration()),
        Ok(_) => panic!("Expected configuration error"),
    }
}

#[tokio::test]
async fn test_generative_engine_uses_reported_usage() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Baskets rouges" } }
            ],
            "usage": { "prompt_tokens": 30, "completion_tokens": 12, "total_tokens": 42 }
        })))
        .mount(&server)
        .await;

    let engine = GenerativeEngine::new(
        reqwest::Client::new(),
        server.uri(),
        Some("test-key".to_string()),
        "test-model".to_string(),
    );

    let outcome = engine
        .translate(request("Red sneakers", "fr"))
        .await
        .expect("translate succeeds");

    assert_eq!(outcome.translated_text, "Baskets rouges");
    assert_eq!(outcome.cost_units, 42);
}

#[tokio::test]
async fn test_generative_engine_estimates_cost_when_usage_missing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "abcd" } }
            ]
        })))
        .mount(&server)
        .await;

    let engine = GenerativeEngine::new(
        reqwest::Client::new(),
        server.uri(),
        Some("test-key".to_string()),
        "test-model".to_string(),
    );

    let outcome = engine
        .translate(request("abcdefgh", "fr"))
        .await
        .expect("translate succeeds");

    // ceil((8 + 4) / 4) = 3
    assert_eq!(outcome.cost_units, 3);
}

#[tokio::test]
async fn test_generative_engine_without_key_is_unprovisioned() {
    let engine = GenerativeEngine::new(
        reqwest::Client::new(),
        "https://api.example.com".to_string(),
        None,
        "test-model".to_string(),
    );

    let result = engine.translate(request("hello", "fr")).await;

    match result {
        Err(err) => assert!(err.is_configuration()),
        Ok(_) => panic!("Expected configuration error"),
    }
}

#[tokio::test]
async fn test_generative_engine_rejects_empty_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": []
        })))
        .mount(&server)
        .await;

    let engine = GenerativeEngine::new(
        reqwest::Client::new(),
        server.uri(),
        Some("test-key".to_string()),
        "test-model".to_string(),
    );

    let result = engine.translate(request("hello", "fr")).await;

    assert!(matches!(result, Err(EngineError::Malformed { .. })));
}

#[tokio::test]
async fn test_generative_engine_propagates_http_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let engine = GenerativeEngine::new(
        reqwest::Client::new(),
        server.uri(),
        Some("test-key".to_string()),
        "test-model".to_string(),
    );

    let result = engine.translate(request("hello", "fr")).await;

    match result {
        Err(EngineError::Http { status, .. }) => assert_eq!(status, 429),
        other => panic!("Expected HTTP error, got {:?}", other),
    }
}
