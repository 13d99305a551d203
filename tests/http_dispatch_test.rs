use datapush::core::{Dispatcher, RequestMethod};
use datapush::{ApiSettings, AuthScheme, Credentials, HttpDispatcher, PushError};
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::json;
use std::time::Duration;

fn settings(endpoint: String, method: RequestMethod) -> ApiSettings {
    ApiSettings {
        endpoint,
        method,
        auth: None,
        headers: vec![],
        timeout: Some(Duration::from_secs(5)),
    }
}

#[tokio::test]
async fn test_post_sends_json_with_expected_headers() {
    let server = MockServer::start();
    let payload = json!({"source": "replay", "data": [{"a": "1"}]});

    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/ingest")
            .header("content-type", "application/json")
            .header("accept", "text/plain")
            .json_body(payload.clone());
        then.status(201).body("created");
    });

    let dispatcher =
        HttpDispatcher::new(settings(server.url("/ingest"), RequestMethod::Post)).unwrap();
    let report = dispatcher.dispatch(&payload).await.unwrap();

    api_mock.assert();
    assert_eq!(report.status, 201);
    assert_eq!(report.bytes, serde_json::to_vec(&payload).unwrap().len());
}

#[tokio::test]
async fn test_configured_method_and_headers_are_used() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(PATCH)
            .path("/items")
            .header("x-api-key", "k-123");
        then.status(200);
    });

    let mut api = settings(server.url("/items"), RequestMethod::Patch);
    api.headers = vec![("X-Api-Key".to_string(), "k-123".to_string())];
    let dispatcher = HttpDispatcher::new(api).unwrap();

    dispatcher.dispatch(&json!({"id": 1})).await.unwrap();
    api_mock.assert();
}

#[tokio::test]
async fn test_non_success_status_is_error() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(PUT).path("/broken");
        then.status(500);
    });

    let dispatcher =
        HttpDispatcher::new(settings(server.url("/broken"), RequestMethod::Put)).unwrap();
    let err = dispatcher.dispatch(&json!([])).await.unwrap_err();

    api_mock.assert();
    assert!(matches!(err, PushError::HttpStatusError { status: 500, .. }));
}

#[tokio::test]
async fn test_basic_auth_header() {
    let server = MockServer::start();

    // base64("user:pass")
    let api_mock = server.mock(|when, then| {
        when.method(DELETE)
            .path("/records")
            .header("authorization", "Basic dXNlcjpwYXNz");
        then.status(204);
    });

    let mut api = settings(server.url("/records"), RequestMethod::Delete);
    api.auth = Some(Credentials {
        user: "user".to_string(),
        pass: "pass".to_string(),
        scheme: AuthScheme::Basic,
    });
    let dispatcher = HttpDispatcher::new(api).unwrap();

    let report = dispatcher.dispatch(&json!({"id": 9})).await.unwrap();
    api_mock.assert();
    assert_eq!(report.status, 204);
}

#[tokio::test]
async fn test_digest_challenge_is_answered_once() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/secure");
        then.status(401).header(
            "WWW-Authenticate",
            r#"Digest realm="datapush", qop="auth", nonce="6b2d8f0e1c", opaque="a1b2c3""#,
        );
    });

    let mut api = settings(server.url("/secure"), RequestMethod::Post);
    api.auth = Some(Credentials {
        user: "replay".to_string(),
        pass: "secret".to_string(),
        scheme: AuthScheme::Digest,
    });
    let dispatcher = HttpDispatcher::new(api).unwrap();

    let err = dispatcher.dispatch(&json!({"id": 1})).await.unwrap_err();

    // One bare attempt plus one answered challenge, no further retries.
    api_mock.assert_hits(2);
    assert!(matches!(err, PushError::HttpStatusError { status: 401, .. }));
}

#[tokio::test]
async fn test_digest_answer_is_accepted() {
    let server = MockServer::start();
    let payload = json!({"id": 7});

    let authed_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/secure")
            .header_exists("authorization")
            .json_body(payload.clone());
        then.status(200).body("ok");
    });
    let challenge_mock = server.mock(|when, then| {
        when.method(POST).path("/secure");
        then.status(401).header(
            "WWW-Authenticate",
            r#"Digest realm="datapush", qop="auth", nonce="0d4f9e2a77", opaque="f00d""#,
        );
    });

    let mut api = settings(server.url("/secure"), RequestMethod::Post);
    api.auth = Some(Credentials {
        user: "replay".to_string(),
        pass: "secret".to_string(),
        scheme: AuthScheme::Digest,
    });
    let dispatcher = HttpDispatcher::new(api).unwrap();

    let report = dispatcher.dispatch(&payload).await.unwrap();

    challenge_mock.assert_hits(1);
    authed_mock.assert_hits(1);
    assert_eq!(report.status, 200);
}

#[tokio::test]
async fn test_unauthorized_without_credentials_is_not_retried() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/secure");
        then.status(401)
            .header("WWW-Authenticate", r#"Digest realm="x", nonce="n""#);
    });

    let dispatcher =
        HttpDispatcher::new(settings(server.url("/secure"), RequestMethod::Post)).unwrap();
    let err = dispatcher.dispatch(&json!({})).await.unwrap_err();

    api_mock.assert_hits(1);
    assert!(matches!(err, PushError::HttpStatusError { status: 401, .. }));
}

#[tokio::test]
async fn test_timeout_surfaces_as_network_error() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/slow");
        then.status(200).delay(Duration::from_secs(3));
    });

    let mut api = settings(server.url("/slow"), RequestMethod::Post);
    api.timeout = Some(Duration::from_millis(200));
    let dispatcher = HttpDispatcher::new(api).unwrap();

    let err = dispatcher.dispatch(&json!({})).await.unwrap_err();
    assert!(matches!(err, PushError::NetworkError(ref e) if e.is_timeout()));
}
