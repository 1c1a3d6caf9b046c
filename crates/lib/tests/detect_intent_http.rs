//! Integration tests for the Dialogflow REST client against a local mock server.

use dialogflow_middleware::dialogflow::{DetectIntentRequest, DialogflowClient, DialogflowError};
use dialogflow_middleware::{DialogflowMiddleware, Message, MiddlewareConfig, MiddlewareError};
use mockito::Matcher;
use serde_json::json;

const SESSION: &str = "projects/travel/agent/sessions/abc";

#[tokio::test]
async fn detect_intent_posts_query_and_parses_result() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/projects/travel/agent/sessions/abc:detectIntent")
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::Json(json!({
            "queryInput": {"text": {"text": "hola", "languageCode": "es"}}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "responseId": "r-1",
                "queryResult": {
                    "queryText": "hola",
                    "intent": {"displayName": "greeting"},
                    "intentDetectionConfidence": 0.87,
                    "fulfillmentText": "¡Hola!"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = DialogflowClient::new(Some(server.url()), Some("test-token".to_string()));
    let result = client
        .detect_intent(&DetectIntentRequest::text(SESSION, "hola", "es"))
        .await
        .unwrap();

    assert_eq!(result.intent_name(), Some("greeting"));
    assert_eq!(result.intent_detection_confidence, 0.87);
    assert_eq!(result.fulfillment_text, "¡Hola!");
    mock.assert_async().await;
}

#[tokio::test]
async fn detect_intent_without_token_sends_no_auth_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/projects/travel/agent/sessions/abc:detectIntent")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"queryResult": {"queryText": "hi"}}).to_string())
        .create_async()
        .await;

    let client = DialogflowClient::new(Some(server.url()), None);
    let result = client
        .detect_intent(&DetectIntentRequest::text(SESSION, "hi", "en"))
        .await
        .unwrap();
    assert_eq!(result.intent_name(), None);
    mock.assert_async().await;
}

#[tokio::test]
async fn detect_intent_api_error_carries_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/projects/travel/agent/sessions/abc:detectIntent")
        .with_status(403)
        .with_body("permission denied")
        .create_async()
        .await;

    let client = DialogflowClient::new(Some(server.url()), None);
    let err = client
        .detect_intent(&DetectIntentRequest::text(SESSION, "hi", "en"))
        .await
        .unwrap_err();
    match err {
        DialogflowError::Api { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("permission denied"));
        }
        other => panic!("expected api error, got {:?}", other),
    }
}

#[tokio::test]
async fn detect_intent_without_query_result_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/projects/travel/agent/sessions/abc:detectIntent")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"responseId": "r-2"}).to_string())
        .create_async()
        .await;

    let client = DialogflowClient::new(Some(server.url()), None);
    let err = client
        .detect_intent(&DetectIntentRequest::text(SESSION, "hi", "en"))
        .await
        .unwrap_err();
    assert!(matches!(err, DialogflowError::MissingQueryResult));
}

#[tokio::test]
async fn middleware_over_http_annotates_and_forwards_failures() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock(
            "POST",
            Matcher::Regex(r"^/projects/travel/agent/sessions/[0-9a-f-]+:detectIntent$".to_string()),
        )
        .match_body(Matcher::PartialJson(json!({
            "queryInput": {"text": {"text": "book a flight to Paris"}}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "queryResult": {
                    "action": "flight.book",
                    "parameters": {"destination": "Paris"},
                    "intent": {"displayName": "book_flight"},
                    "intentDetectionConfidence": 0.95
                }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let mut config = MiddlewareConfig::new("travel");
    config.endpoint = Some(server.url());
    let mw = DialogflowMiddleware::new(config).unwrap();

    let mut msg = Message::new("book a flight to Paris")
        .with_field("user", "U1")
        .with_field("channel", "C1");
    let mut forwarded = None;
    mw.receive(&mut msg, |err| forwarded = Some(err)).await;
    assert!(matches!(forwarded, Some(None)));
    assert_eq!(msg.intent.as_deref(), Some("book_flight"));
    assert_eq!(msg.entities["destination"], "Paris");
    ok.assert_async().await;

    let failing = server
        .mock("POST", Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;
    let mut other = Message::new("something else").with_field("user", "U2");
    let mut forwarded = None;
    mw.receive(&mut other, |err| forwarded = Some(err)).await;
    assert!(matches!(
        forwarded,
        Some(Some(MiddlewareError::Transport(DialogflowError::Api { status: 500, .. })))
    ));
    assert!(other.intent.is_none());
    failing.assert_async().await;
}

#[tokio::test]
async fn rest_parameters_are_kept_verbatim() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "queryResult": {
                    "parameters": {"fields": {}},
                    "intent": {"displayName": "fill_form"},
                    "intentDetectionConfidence": 0.9
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut config = MiddlewareConfig::new("forms");
    config.endpoint = Some(server.url());
    let mw = DialogflowMiddleware::new(config).unwrap();

    let mut msg = Message::new("fill in the fields").with_field("user", "U1");
    mw.process(&mut msg).await.unwrap();
    assert_eq!(msg.intent.as_deref(), Some("fill_form"));
    assert_eq!(msg.entities.get("fields"), Some(&json!({})));
}
