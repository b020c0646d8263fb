mod common;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use common::MapSecretStore;
use image_descriptor::api::handler::{handle_event, outcome_response};
use image_descriptor::api::parsing::extract_update;
use image_descriptor::core::config::{
    DEFAULT_OPENAI_KEY_PARAM, DEFAULT_TELEGRAM_TOKEN_PARAM, Settings,
};
use image_descriptor::pipeline::{FailureStage, IgnoreReason, Outcome};
use mockito::Matcher;
use serde_json::{Value, json};

fn store() -> MapSecretStore {
    MapSecretStore::with(&[
        (DEFAULT_TELEGRAM_TOKEN_PARAM, "TEST_TOKEN"),
        (DEFAULT_OPENAI_KEY_PARAM, "sk-test"),
    ])
}

fn settings(base: &str) -> Settings {
    Settings {
        telegram_api_base: base.to_string(),
        openai_api_base: base.to_string(),
        ..Settings::default()
    }
}

/// Status code and decoded JSON body of a handler response.
fn unpack(response: &Value) -> (u64, Value) {
    let status = response["statusCode"].as_u64().unwrap();
    let body = serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
    (status, body)
}

fn proxy_event(update: &Value) -> Value {
    json!({
        "headers": { "content-type": "application/json" },
        "body": update.to_string(),
        "isBase64Encoded": false
    })
}

fn start_update() -> Value {
    json!({
        "update_id": 1,
        "message": {
            "message_id": 7,
            "from": { "id": 9, "is_bot": false, "first_name": "Ada" },
            "chat": { "id": 1, "type": "private" },
            "text": "/start"
        }
    })
}

fn photo_update() -> Value {
    json!({
        "update_id": 2,
        "message": {
            "message_id": 42,
            "from": { "id": 9, "is_bot": false },
            "chat": { "id": 1, "type": "private" },
            "photo": [
                { "file_id": "small", "width": 90, "height": 60 },
                { "file_id": "large", "width": 1280, "height": 853 }
            ]
        }
    })
}

// ============================================================================
// Event parsing
// ============================================================================

#[test]
fn test_extract_update_from_string_body() {
    let update = extract_update(&proxy_event(&start_update())).unwrap();
    assert_eq!(update.update_id, 1);
    assert_eq!(update.message.unwrap().text.as_deref(), Some("/start"));
}

#[test]
fn test_extract_update_from_base64_body() {
    let event = json!({
        "body": STANDARD.encode(start_update().to_string()),
        "isBase64Encoded": true
    });
    assert_eq!(extract_update(&event).unwrap().update_id, 1);
}

#[test]
fn test_extract_update_from_object_body_and_bare_update() {
    let event = json!({ "body": start_update() });
    assert_eq!(extract_update(&event).unwrap().update_id, 1);
    assert_eq!(extract_update(&start_update()).unwrap().update_id, 1);
}

#[test]
fn test_extract_update_rejects_garbage() {
    assert!(extract_update(&json!({ "body": "{not json" })).is_err());
    assert!(extract_update(&json!({ "body": 42 })).is_err());
    assert!(extract_update(&json!({ "hello": "world" })).is_err());
}

// ============================================================================
// Outcome mapping
// ============================================================================

#[test]
fn test_outcome_status_mapping() {
    let cases = [
        (Outcome::Ignored(IgnoreReason::NoChat), 200, "No chat ID found"),
        (Outcome::Ignored(IgnoreReason::NoMedia), 200, "Update processed"),
        (Outcome::Ignored(IgnoreReason::NoSender), 200, "Update processed"),
        (Outcome::Greeted, 200, "Start message sent"),
        (Outcome::Described, 200, "Description sent"),
    ];
    for (outcome, status, message) in cases {
        let (code, body) = unpack(&outcome_response(outcome));
        assert_eq!(code, status, "{outcome:?}");
        assert_eq!(body, json!({ "ok": true, "message": message }));
    }

    let cases = [
        (
            Outcome::Apologized(FailureStage::MediaResolution),
            400,
            "Failed to get file from Telegram",
        ),
        (
            Outcome::Apologized(FailureStage::Description),
            500,
            "Failed to describe image",
        ),
        (
            Outcome::Apologized(FailureStage::Internal),
            500,
            "Failed to describe image",
        ),
        (Outcome::SendFailed, 500, "Failed to send reply"),
    ];
    for (outcome, status, message) in cases {
        let (code, body) = unpack(&outcome_response(outcome));
        assert_eq!(code, status, "{outcome:?}");
        assert_eq!(body, json!({ "error": message }));
    }
}

// ============================================================================
// Whole invocations
// ============================================================================

#[tokio::test]
async fn test_missing_credentials_fail_before_parsing() {
    let event = json!({ "body": "{not json" });

    let response = handle_event(&event, Settings::default(), &MapSecretStore::default()).await;

    let (status, body) = unpack(&response);
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "Failed to load credentials" }));
}

#[tokio::test]
async fn test_malformed_payload_is_500() {
    let event = json!({ "body": "{not json" });

    let response = handle_event(&event, Settings::default(), &store()).await;

    let (status, body) = unpack(&response);
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "Invalid update payload" }));
}

#[tokio::test]
async fn test_panic_becomes_lambda_error() {
    let response = handle_event(
        &proxy_event(&start_update()),
        Settings::default(),
        &MapSecretStore::panicking(),
    )
    .await;

    let (status, body) = unpack(&response);
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "Lambda error: secret store exploded" }));
}

#[tokio::test]
async fn test_webhook_secret_is_enforced_when_configured() {
    let settings = Settings {
        webhook_secret: Some("s3cret".to_string()),
        ..Settings::default()
    };
    let no_chat = json!({ "update_id": 3, "message": { "message_id": 1, "from": { "id": 9 } } });

    let mut event = proxy_event(&no_chat);
    event["headers"]["x-telegram-bot-api-secret-token"] = json!("wrong");
    let (status, body) = unpack(&handle_event(&event, settings.clone(), &store()).await);
    assert_eq!(status, 401);
    assert_eq!(body, json!({ "error": "Invalid webhook secret" }));

    event["headers"]["x-telegram-bot-api-secret-token"] = json!("s3cret");
    let (status, _) = unpack(&handle_event(&event, settings, &store()).await);
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_ignored_updates_make_no_calls() {
    // Pointed at a closed port: any outbound call would turn into an error.
    let settings = settings("http://127.0.0.1:1");

    let no_chat = json!({ "update_id": 3, "message": { "message_id": 1, "from": { "id": 9 } } });
    let (status, body) =
        unpack(&handle_event(&proxy_event(&no_chat), settings.clone(), &store()).await);
    assert_eq!(status, 200);
    assert_eq!(body["message"], "No chat ID found");

    let text = json!({
        "update_id": 4,
        "message": {
            "message_id": 2,
            "from": { "id": 9 },
            "chat": { "id": 1 },
            "text": "what's up"
        }
    });
    let (status, body) = unpack(&handle_event(&proxy_event(&text), settings.clone(), &store()).await);
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Update processed");

    let no_message = json!({ "update_id": 5 });
    let (status, body) = unpack(&handle_event(&proxy_event(&no_message), settings, &store()).await);
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Update processed");
}

#[tokio::test]
async fn test_start_for_another_bot_is_ignored() {
    let settings = Settings {
        bot_username: Some("image_descriptor_bot".to_string()),
        ..settings("http://127.0.0.1:1")
    };
    let mut update = start_update();
    update["message"]["text"] = json!("/start@other_bot");

    let (status, body) = unpack(&handle_event(&proxy_event(&update), settings, &store()).await);

    assert_eq!(status, 200);
    assert_eq!(body["message"], "Update processed");
}

#[tokio::test]
async fn test_start_command_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let send = server
        .mock("POST", "/botTEST_TOKEN/sendMessage")
        .match_body(Matcher::Json(json!({
            "chat_id": 1,
            "text": "Hello! I'm Image Descriptor Bot. Send me an image and I'll give you a detailed description!"
        })))
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{"message_id":8}}"#)
        .create_async()
        .await;

    let response =
        handle_event(&proxy_event(&start_update()), settings(&server.url()), &store()).await;

    let (status, body) = unpack(&response);
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "ok": true, "message": "Start message sent" }));
    send.assert_async().await;
}

#[tokio::test]
async fn test_photo_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let get_file = server
        .mock("POST", "/botTEST_TOKEN/getFile")
        .match_body(Matcher::Json(json!({ "file_id": "large" })))
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{"file_id":"large","file_path":"photos/file_1.jpg"}}"#)
        .create_async()
        .await;
    let describe = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::Regex("/file/botTEST_TOKEN/photos/file_1.jpg".to_string()))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"A mountain landscape."}}]}"#)
        .create_async()
        .await;
    let send = server
        .mock("POST", "/botTEST_TOKEN/sendMessage")
        .match_body(Matcher::PartialJson(json!({
            "chat_id": 1,
            "text": "Here is the description of the image:\n\nA mountain landscape.",
            "reply_parameters": { "message_id": 42 }
        })))
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{"message_id":43}}"#)
        .create_async()
        .await;

    let response =
        handle_event(&proxy_event(&photo_update()), settings(&server.url()), &store()).await;

    let (status, body) = unpack(&response);
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Description sent");
    get_file.assert_async().await;
    describe.assert_async().await;
    send.assert_async().await;
}

#[tokio::test]
async fn test_unknown_file_is_400_after_apology() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/botTEST_TOKEN/getFile")
        .with_status(400)
        .with_body(r#"{"ok":false,"error_code":400,"description":"Bad Request: invalid file_id"}"#)
        .create_async()
        .await;
    let apology = server
        .mock("POST", "/botTEST_TOKEN/sendMessage")
        .match_body(Matcher::PartialJson(json!({
            "text": "Sorry, I could not process this image. Please try again later.",
            "reply_parameters": { "message_id": 42 }
        })))
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{"message_id":43}}"#)
        .create_async()
        .await;

    let response =
        handle_event(&proxy_event(&photo_update()), settings(&server.url()), &store()).await;

    let (status, body) = unpack(&response);
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "Failed to get file from Telegram" }));
    apology.assert_async().await;
}

#[tokio::test]
async fn test_provider_failure_is_500_after_apology() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/botTEST_TOKEN/getFile")
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{"file_id":"large","file_path":"photos/file_1.jpg"}}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(500)
        .with_body(r#"{"error":{"message":"server error"}}"#)
        .create_async()
        .await;
    let apology = server
        .mock("POST", "/botTEST_TOKEN/sendMessage")
        .match_body(Matcher::PartialJson(json!({
            "text": "Sorry, I could not process this image. Please try again later."
        })))
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{"message_id":43}}"#)
        .create_async()
        .await;

    let response =
        handle_event(&proxy_event(&photo_update()), settings(&server.url()), &store()).await;

    let (status, body) = unpack(&response);
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "Failed to describe image" }));
    apology.assert_async().await;
}

#[tokio::test]
async fn test_send_failure_is_500() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/botTEST_TOKEN/sendMessage")
        .with_status(403)
        .with_body(r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#)
        .create_async()
        .await;

    let response =
        handle_event(&proxy_event(&start_update()), settings(&server.url()), &store()).await;

    let (status, body) = unpack(&response);
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "Failed to send reply" }));
}
