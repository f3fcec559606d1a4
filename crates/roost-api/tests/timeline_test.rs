//! Read route integration tests.
//!
//! Run with: `cargo test -p roost-api --test timeline_test`

mod helpers;

use axum::http::StatusCode;
use helpers::{api_path, setup_test_app, setup_test_app_with, SCREEN_NAME};
use roost_core::RemoteCallError;
use roost_services::testing::{status_json, CallKind, MockRemote};
use serde_json::{json, Value};

#[tokio::test]
async fn test_root_and_health() {
    let app = setup_test_app(MockRemote::new());
    let client = app.client();

    let root = client.get("/").await;
    root.assert_status_ok();
    assert_eq!(root.text(), "Hello world!");

    let health = client.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>(), json!({"status": "alive"}));
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let app = setup_test_app(MockRemote::new());
    let client = app.client();

    let echoed = client
        .get("/health")
        .add_header("X-Request-ID", "abc-123")
        .await;
    assert_eq!(echoed.header("X-Request-ID"), "abc-123");

    let generated = client.get("/health").await;
    assert_eq!(generated.header("X-Request-ID").len(), 36);
}

#[tokio::test]
async fn test_user_timeline_is_cached() {
    let timeline = json!([status_json(SCREEN_NAME, "2"), status_json(SCREEN_NAME, "1")]);
    let app = setup_test_app(
        MockRemote::new().on_get("statuses/user_timeline", Ok(timeline.clone())),
    );
    let client = app.client();

    let first = client.get(&api_path("/statuses/user_timeline")).await;
    first.assert_status_ok();
    assert_eq!(first.json::<Value>(), json!({"code": 0, "data": timeline}));

    let second = client.get(&api_path("/statuses/user_timeline")).await;
    second.assert_status_ok();
    assert_eq!(second.json::<Value>()["data"], timeline);

    let calls = app.remote.calls_of(CallKind::Get);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].param("screen_name"), Some(SCREEN_NAME));
    assert_eq!(calls[0].param("count"), Some("10"));
}

#[tokio::test]
async fn test_mentions_failure_uses_error_envelope() {
    let app = setup_test_app(MockRemote::new().on_get(
        "statuses/mentions_timeline",
        Err(RemoteCallError::Api {
            status: 401,
            message: "Could not authenticate you.".into(),
        }),
    ));

    let response = app
        .client()
        .get(&api_path("/statuses/mentions_timeline"))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let body = response.json::<Value>();
    assert_eq!(body["code"], 10);
    assert_eq!(body["error"]["message"], "Could not authenticate you.");
}

#[tokio::test]
async fn test_hash_searches_configured_query() {
    let statuses = json!([status_json("runner", "9")]);
    let app = setup_test_app_with(
        MockRemote::new().on_get(
            "search/tweets",
            Ok(json!({"statuses": statuses, "search_metadata": {}})),
        ),
        &[("SEARCH_QUERY", "#RTAinJapan"), ("SEARCH_COUNT", "5")],
    );

    let response = app.client().get(&api_path("/statuses/hash")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"], statuses);

    let calls = app.remote.calls_of(CallKind::Get);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].param("q"), Some("#RTAinJapan"));
    assert_eq!(calls[0].param("count"), Some("5"));
}
