use std::sync::Arc;

use cyberai_core::{DispatchError, Dispatcher, SendOptions, FALLBACK_MODEL};
use cyberai_runtime::{OpenRouterProvider, ProviderConfig};
use httpmock::prelude::*;

fn completion_body(content: &str, model: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "gen-mock-1",
        "object": "chat.completion",
        "created": 1700000000,
        "model": model,
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ],
        "usage": { "prompt_tokens": 40, "completion_tokens": 8, "total_tokens": 48 }
    })
}

fn dispatcher_for(server: &MockServer) -> Dispatcher {
    let config = ProviderConfig::new("test-api-key", format!("{}/api/v1", server.base_url()));
    let provider = OpenRouterProvider::new(config).expect("provider should build");
    Dispatcher::with_defaults(Arc::new(provider)).expect("builtin models should resolve")
}

#[tokio::test]
#[ignore = "e2e-ish integration using httpmock"]
async fn primary_failure_falls_back_over_http() {
    let server = MockServer::start();

    let primary = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/chat/completions")
            .header("authorization", "Bearer test-api-key")
            .body_includes("\"model\":\"gpt-4-turbo\"");
        then.status(500).body("upstream exploded");
    });
    let fallback = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/chat/completions")
            .body_includes("\"model\":\"mixtral-8x7b\"")
            .body_includes("\"stream\":false");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(completion_body("fallback answer", "mistralai/mixtral-8x7b"));
    });

    let mut dispatcher = dispatcher_for(&server);
    let result = dispatcher
        .send_message("hello there", &SendOptions::new())
        .await
        .expect("fallback should answer");

    primary.assert();
    fallback.assert();
    assert_eq!(result.response, "fallback answer");
    assert_eq!(result.model, "Mixtral 8x7B");
    assert_eq!(result.model_id, FALLBACK_MODEL);
    assert_eq!(result.tokens, 48);
    assert_eq!(result.metadata.attempts, 2);
}

#[tokio::test]
#[ignore = "e2e-ish integration using httpmock"]
async fn both_models_failing_surfaces_exhausted_fallback() {
    let server = MockServer::start();

    let any = server.mock(|when, then| {
        when.method(POST).path("/api/v1/chat/completions");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(serde_json::json!({ "error": { "message": "model overloaded" } }));
    });

    let mut dispatcher = dispatcher_for(&server);
    let err = dispatcher
        .send_message("hello", &SendOptions::new())
        .await
        .expect_err("both attempts should fail");

    any.assert_calls(2);
    assert!(matches!(err, DispatchError::ExhaustedFallback { attempts: 2, .. }));
    assert!(!err.user_message().is_empty());
}
