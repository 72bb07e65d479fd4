//! Chat-completions responder against a mock API.

use botfleet_models::BehaviorSettings;
use botfleet_telegram::{OpenAiResponder, Responder, TelegramError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
}

#[tokio::test]
async fn test_reply_uses_settings() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "messages": [
                { "role": "system", "content": "You sell shoes.\n\nRespond in a formal tone." },
                { "role": "user", "content": "Do you have size 44?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("  Yes, we do.  ")))
        .expect(1)
        .mount(&server)
        .await;

    let responder = OpenAiResponder::new(Some("sk-test".into()), "gpt-4o-mini").with_api_base(server.uri());
    let settings = BehaviorSettings::new()
        .with("system_prompt", "You sell shoes.")
        .with("tone", "formal")
        .with("model", "gpt-4o");

    let reply = responder.reply(&settings, "Do you have size 44?").await.unwrap();
    assert_eq!(reply, "Yes, we do.");
}

#[tokio::test]
async fn test_missing_key_never_calls_api() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("hi")))
        .expect(0)
        .mount(&server)
        .await;

    let responder = OpenAiResponder::new(None, "gpt-4o-mini").with_api_base(server.uri());
    let result = responder.reply(&BehaviorSettings::new(), "hello").await;

    assert!(matches!(result, Err(TelegramError::NoApiKey)));
}

#[tokio::test]
async fn test_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let responder = OpenAiResponder::new(Some("sk".into()), "m").with_api_base(format!("{}/", server.uri()));
    let result = responder.reply(&BehaviorSettings::new(), "hello").await;

    assert!(matches!(result, Err(TelegramError::RequestFailed(_))));
}

#[tokio::test]
async fn test_empty_choices_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let responder = OpenAiResponder::new(Some("sk".into()), "m").with_api_base(server.uri());
    let result = responder.reply(&BehaviorSettings::new(), "hello").await;

    assert!(matches!(result, Err(TelegramError::ParseError(_))));
}
