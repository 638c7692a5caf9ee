//! Integration tests for the model-server clients using wiremock HTTP mocks.

use tonepost_llm::{ChatClient, EmbeddingClient, LlmError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_chat_client(base_url: &str) -> ChatClient {
    ChatClient::new(base_url, "test-key", "test-model", 30, 700)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn complete_returns_all_choices_in_order() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": "draft one" } },
            { "index": 1, "message": { "role": "assistant", "content": "draft two" } },
            { "index": 2, "message": { "role": "assistant", "content": "draft three" } }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "n": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_chat_client(&server.uri());
    let drafts = client
        .complete("system", "user", 3, 0.7)
        .await
        .expect("should parse completions");

    assert_eq!(drafts, vec!["draft one", "draft two", "draft three"]);
}

#[tokio::test]
async fn complete_sends_fixed_anti_repetition_penalties() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "choices": [ { "index": 0, "message": { "role": "assistant", "content": "ok" } } ]
    });

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "frequency_penalty": 0.4,
            "presence_penalty": 0.4,
            "max_tokens": 700
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_chat_client(&server.uri());
    client
        .complete("system", "user", 1, 0.3)
        .await
        .expect("should succeed");
}

#[tokio::test]
async fn complete_maps_null_content_to_empty_string() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": null } },
            { "index": 1, "message": { "role": "assistant", "content": "kept" } }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_chat_client(&server.uri());
    let drafts = client.complete("s", "u", 2, 0.7).await.expect("parse");
    assert_eq!(drafts, vec![String::new(), "kept".to_string()]);
}

#[tokio::test]
async fn complete_surfaces_api_error_message() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": { "message": "insufficient_quota", "type": "insufficient_quota" }
    });

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_chat_client(&server.uri());
    let err = client.complete("s", "u", 3, 0.7).await.unwrap_err();
    match err {
        LlmError::Api(msg) => {
            assert!(msg.contains("429"), "status missing from message: {msg}");
            assert!(
                msg.contains("insufficient_quota"),
                "envelope message missing: {msg}"
            );
        }
        other => panic!("expected LlmError::Api, got {other:?}"),
    }
}

#[tokio::test]
async fn complete_rejects_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_chat_client(&server.uri());
    let err = client.complete("s", "u", 3, 0.7).await.unwrap_err();
    assert!(matches!(err, LlmError::Deserialize { .. }));
}

#[tokio::test]
async fn embed_returns_single_vector() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .and(body_partial_json(serde_json::json!({
            "inputs": ["신메뉴 딸기라떼 출시 비"]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([[0.1, 0.2, 0.3]])),
        )
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(&server.uri(), 10).expect("client");
    let vector = client.embed("신메뉴 딸기라떼 출시 비").await.expect("embed");
    assert_eq!(vector, vec![0.1, 0.2, 0.3]);
}

#[tokio::test]
async fn embed_rejects_wrong_vector_count() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([[0.1], [0.2]])),
        )
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(&server.uri(), 10).expect("client");
    let err = client.embed("text").await.unwrap_err();
    assert!(matches!(err, LlmError::Api(_)));
}

#[tokio::test]
async fn embed_surfaces_server_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(&server.uri(), 10).expect("client");
    let err = client.embed("text").await.unwrap_err();
    match err {
        LlmError::Api(msg) => assert!(msg.contains("503"), "status missing: {msg}"),
        other => panic!("expected LlmError::Api, got {other:?}"),
    }
}
