//! Telegram connector against a mock Bot API.

use std::sync::Arc;
use std::time::Duration;

use botfleet_models::{BehaviorSettings, BotId};
use botfleet_runtime::{Connection, ConnectorError, PlatformConnector};
use botfleet_telegram::{OpenAiResponder, TelegramConnector};
use serde_json::json;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn connector(api_url: &str) -> TelegramConnector {
    let responder = Arc::new(OpenAiResponder::new(None, "gpt-4o-mini"));
    TelegramConnector::new(responder).with_api_url(api_url.parse().unwrap())
}

#[tokio::test]
async fn test_rejected_token_is_handshake_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = connector(&server.uri())
        .open(&BotId::from("a"), "123456:bad-token", &BehaviorSettings::new())
        .await;

    assert!(matches!(result, Err(ConnectorError::Handshake(_))));
}

#[tokio::test]
async fn test_unreachable_api_is_transport_error() {
    let result = connector("http://127.0.0.1:9")
        .open(&BotId::from("a"), "123456:token", &BehaviorSettings::new())
        .await;

    match result {
        Err(err) => assert!(err.is_transient(), "unexpected error: {err}"),
        Ok(_) => panic!("expected transport error"),
    }
}

#[test]
fn test_platform_name() {
    assert_eq!(connector("http://localhost").platform(), "telegram");
}

async fn mount_bot_api(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path_regex("(?i)/getme$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {
                "id": 123456,
                "is_bot": true,
                "first_name": "Acme Support",
                "username": "acme_support_bot",
                "can_join_groups": true,
                "can_read_all_group_messages": false,
                "supports_inline_queries": false,
                "can_connect_to_business": false,
                "has_main_web_app": false
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex("(?i)/getwebhookinfo$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"url": "", "has_custom_certificate": false, "pending_update_count": 0}
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex("(?i)/getupdates$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true, "result": []}))
                .set_delay(Duration::from_millis(50)),
        )
        .mount(server)
        .await;

    // deleteWebhook, setMyCommands and anything else that returns True.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
        .with_priority(10)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_open_registers_and_close_drains() {
    let server = MockServer::start().await;
    mount_bot_api(&server).await;

    let mut connection = connector(&server.uri())
        .open(&BotId::from("a"), "123456:token", &BehaviorSettings::new())
        .await
        .unwrap();

    assert_eq!(connection.username(), Some("acme_support_bot"));
    assert!(connection.is_connected());

    let requests = server.received_requests().await.unwrap();
    let called: Vec<String> = requests
        .iter()
        .map(|r| r.url.path().rsplit('/').next().unwrap_or_default().to_lowercase())
        .collect();
    let position = |name: &str| called.iter().position(|c| c == name).unwrap();
    assert!(position("getme") < position("deletewebhook"));
    assert!(position("deletewebhook") < position("setmycommands"));

    // Let the dispatcher start polling before shutting it down.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(connection.is_connected());

    connection.close().await.unwrap();
    assert!(!connection.is_connected());

    // Closing twice is harmless.
    connection.close().await.unwrap();
}
