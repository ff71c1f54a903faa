// ABOUTME: Integration tests for the dispatcher against a mock Jpom server
// ABOUTME: Covers the response-code table, single-flight renewal and transport errors

mod common;

use common::harness;
use jpom_client::notify::Severity;
use jpom_client::transport::encode_json;
use jpom_client::{ApiError, ApiRequest, ClientConfig, Navigation, TransportEncryption};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(code: i32, msg: &str, data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"code": code, "msg": msg, "data": data}))
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

// ============================================================================
// Success
// ============================================================================

#[tokio::test]
async fn test_success_returns_data_unchanged() {
    let server = MockServer::start().await;
    let h = harness(ClientConfig::new(server.uri()));

    let payloads = [
        json!({"id": "a", "nested": {"list": [1, 2, 3]}}),
        json!([true, "x", null]),
        json!("plain"),
        json!(42),
        Value::Null,
    ];

    for (i, data) in payloads.iter().enumerate() {
        let route = format!("/ok/{i}");
        mount(&server, &route, envelope(200, "ok", data.clone())).await;
        let got: Value = h.dispatcher.request(ApiRequest::post(route)).await.unwrap();
        assert_eq!(&got, data);
    }

    assert!(h.notifier.all().is_empty());
    assert!(h.navigator.all().is_empty());
}

#[tokio::test]
async fn test_headers_are_attached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jpom/file-storage/list"))
        .and(header("authorization", "old-token"))
        .and(header("workspaceid", "ws-7"))
        .and(header(
            "content-type",
            "application/x-www-form-urlencoded; charset=UTF-8",
        ))
        .respond_with(envelope(200, "", json!({"total": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(
        ClientConfig::new(server.uri())
            .with_router_base("/jpom/")
            .with_workspace("ws-7"),
    );
    let got: Value = h
        .dispatcher
        .request(ApiRequest::post("/file-storage/list"))
        .await
        .unwrap();
    assert_eq!(got["total"], 0);
}

// ============================================================================
// 800 / 802
// ============================================================================

#[tokio::test]
async fn test_session_invalid_clears_once_and_redirects() {
    let server = MockServer::start().await;
    mount(&server, "/x", envelope(800, "please log in", Value::Null)).await;
    let h = harness(ClientConfig::new(server.uri()).with_router_base("/jpom"));

    let err = h
        .dispatcher
        .request::<Value>(ApiRequest::post("/x"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::SessionInvalid { ref msg } if msg == "please log in"));
    assert_eq!(h.store.clear_count(), 1);
    assert!(h.dispatcher.session().token().is_none());
    assert_eq!(
        h.navigator.all(),
        vec![(
            Navigation::Login {
                path: "/jpom/login".to_string()
            },
            Duration::from_secs(2)
        )]
    );

    let notices = h.notifier.all();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Warning);
    assert_eq!(notices[0].key.as_deref(), Some("to-login"));
    assert_eq!(notices[0].description, "please log in");
}

#[tokio::test]
async fn test_account_disabled_behaves_like_session_invalid() {
    let server = MockServer::start().await;
    mount(&server, "/x", envelope(802, "disabled", Value::Null)).await;
    let h = harness(ClientConfig::new(server.uri()));

    let err = h
        .dispatcher
        .request::<Value>(ApiRequest::post("/x").silent())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::AccountDisabled { .. }));
    assert!(err.requires_login());
    assert_eq!(h.store.clear_count(), 1);
    assert_eq!(h.navigator.all().len(), 1);
    // The login notice is shown even for silent requests.
    assert_eq!(h.notifier.keys(), vec![Some("to-login".to_string())]);
}

// ============================================================================
// 801 renewal
// ============================================================================

#[tokio::test]
async fn test_expiring_with_renewal_in_flight_skips_endpoint() {
    let server = MockServer::start().await;
    mount(&server, "/x", envelope(801, "expiring", Value::Null)).await;
    Mock::given(method("POST"))
        .and(path("/renewal"))
        .respond_with(envelope(200, "", json!({"token": "never"})))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(ClientConfig::new(server.uri()));
    assert!(h.dispatcher.session().try_begin_renewal());

    let err = h
        .dispatcher
        .request::<Value>(ApiRequest::post("/x"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::SessionExpiring { renewed: false, .. }));
    assert!(h.notifier.all().is_empty());
    assert!(h.navigator.all().is_empty());
    assert_eq!(h.store.store_count(), 0);
    // The other renewal still owns the flag.
    assert!(h.dispatcher.session().is_renewing());
    h.dispatcher.session().end_renewal();
}

#[tokio::test]
async fn test_expiring_renews_and_schedules_reload() {
    let server = MockServer::start().await;
    mount(&server, "/x", envelope(801, "expiring", Value::Null)).await;
    Mock::given(method("POST"))
        .and(path("/renewal"))
        .and(header("authorization", "old-token"))
        .respond_with(envelope(
            200,
            "",
            json!({"token": "new-token", "longTermToken": "lt"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(ClientConfig::new(server.uri()));
    let err = h
        .dispatcher
        .request::<Value>(ApiRequest::post("/x"))
        .await
        .unwrap_err();

    // The rejected call is never replayed.
    assert!(matches!(err, ApiError::SessionExpiring { renewed: true, .. }));
    assert_eq!(h.dispatcher.session().token().as_deref(), Some("new-token"));
    assert_eq!(h.store.store_count(), 1);
    assert!(!h.dispatcher.session().is_renewing());
    assert_eq!(
        h.navigator.all(),
        vec![(Navigation::Reload, Duration::from_secs(2))]
    );

    let notices = h.notifier.all();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].key.as_deref(), Some("login-timeout"));
    assert_eq!(notices[1].severity, Severity::Success);
}

#[tokio::test]
async fn test_failed_renewal_rejects_without_side_effects() {
    let server = MockServer::start().await;
    mount(&server, "/x", envelope(801, "expiring", Value::Null)).await;
    mount(&server, "/renewal", envelope(500, "cannot renew", Value::Null)).await;

    let h = harness(ClientConfig::new(server.uri()));
    let err = h
        .dispatcher
        .request::<Value>(ApiRequest::post("/x"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::SessionExpiring { renewed: false, .. }));
    assert_eq!(h.dispatcher.session().token().as_deref(), Some("old-token"));
    assert!(h.navigator.all().is_empty());
    assert!(!h.dispatcher.session().is_renewing());
    // Only the "trying to renew" notice; the failure itself is silent.
    assert_eq!(h.notifier.keys(), vec![Some("login-timeout".to_string())]);
}

#[tokio::test]
async fn test_concurrent_expiring_calls_renew_once() {
    let server = MockServer::start().await;
    mount(&server, "/a", envelope(801, "", Value::Null)).await;
    mount(&server, "/b", envelope(801, "", Value::Null)).await;
    Mock::given(method("POST"))
        .and(path("/renewal"))
        .respond_with(
            envelope(200, "", json!({"token": "fresh"})).set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(ClientConfig::new(server.uri()));
    let (a, b) = tokio::join!(
        h.dispatcher.request::<Value>(ApiRequest::post("/a")),
        h.dispatcher.request::<Value>(ApiRequest::post("/b")),
    );

    let renewed: Vec<bool> = [a.unwrap_err(), b.unwrap_err()]
        .into_iter()
        .map(|e| match e {
            ApiError::SessionExpiring { renewed, .. } => renewed,
            other => panic!("unexpected error {other:?}"),
        })
        .collect();
    assert_eq!(renewed.iter().filter(|r| **r).count(), 1);
    assert_eq!(h.store.store_count(), 1);
    assert!(!h.dispatcher.session().is_renewing());
}

// ============================================================================
// 999 and generic failures
// ============================================================================

#[tokio::test]
async fn test_forbidden_hard_redirects() {
    let server = MockServer::start().await;
    mount(&server, "/x", envelope(999, "ip blocked", Value::Null)).await;
    let h = harness(ClientConfig::new(server.uri()).with_router_base("/jpom"));

    let err = h
        .dispatcher
        .request::<Value>(ApiRequest::post("/x"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Forbidden { .. }));
    assert_eq!(
        h.navigator.all(),
        vec![(
            Navigation::Forbidden {
                path: "/jpom/prohibit-access".to_string()
            },
            Duration::ZERO
        )]
    );
    assert_eq!(h.notifier.keys(), vec![Some("prohibit-access".to_string())]);
    assert_eq!(h.store.clear_count(), 0);
}

#[tokio::test]
async fn test_generic_failure_notifies_with_server_message() {
    let server = MockServer::start().await;
    mount(&server, "/x", envelope(400, "name is required", Value::Null)).await;
    let h = harness(ClientConfig::new(server.uri()));

    let err = h
        .dispatcher
        .request::<Value>(ApiRequest::post("/x"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Rejected { code: 400, .. }));
    let notices = h.notifier.all();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Error);
    assert_eq!(notices[0].description, "name is required");
    assert!(h.navigator.all().is_empty());
}

#[tokio::test]
async fn test_suppressed_failure_rejects_silently() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/x"))
        .and(header("tip", "no"))
        .respond_with(envelope(500, "boom", Value::Null))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(ClientConfig::new(server.uri()));

    let err = h
        .dispatcher
        .request::<Value>(ApiRequest::post("/x").silent())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Rejected { code: 500, ref msg } if msg == "boom"));
    assert!(h.notifier.all().is_empty());
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn test_http_error_status_notifies_unless_suppressed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
        .mount(&server)
        .await;
    let h = harness(ClientConfig::new(server.uri()));

    let err = h
        .dispatcher
        .request::<Value>(ApiRequest::post("/x"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 502, ref body } if body == "upstream down"));
    let notices = h.notifier.all();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].key.as_deref(), Some("network-error-status-502"));
    assert!(notices[0].description.contains("upstream down"));

    let err = h
        .dispatcher
        .request::<Value>(ApiRequest::post("/x").silent())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { .. }));
    assert_eq!(h.notifier.all().len(), 1);
}

#[tokio::test]
async fn test_no_response_notifies_network_error() {
    // Nothing listens on port 1.
    let h = harness(ClientConfig::new("http://127.0.0.1:1"));
    let err = h
        .dispatcher
        .request::<Value>(ApiRequest::post("/x"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(
        h.notifier.keys(),
        vec![Some("network-error-no-response".to_string())]
    );
}

#[tokio::test]
async fn test_non_envelope_body_is_invalid_response() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/x",
        ResponseTemplate::new(200).set_body_string("<html>login</html>"),
    )
    .await;
    let h = harness(ClientConfig::new(server.uri()));

    let err = h
        .dispatcher
        .request::<Value>(ApiRequest::post("/x"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_base64_json_body_is_sent_as_encoded_string() {
    let server = MockServer::start().await;
    let payload = json!({"url": "https://example.com/app.zip", "keepDay": 3});
    let encoded = encode_json(&payload).unwrap();

    Mock::given(method("POST"))
        .and(path("/file-storage/remote-download"))
        .and(body_json(Value::String(encoded)))
        .respond_with(envelope(200, "", Value::Null))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(
        ClientConfig::new(server.uri()).with_transport_encryption(TransportEncryption::Base64),
    );
    let _: Value = h
        .dispatcher
        .request(ApiRequest::post("/file-storage/remote-download").json(payload))
        .await
        .unwrap();
}
