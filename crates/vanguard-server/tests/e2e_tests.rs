//! End-to-end tests for the proxy router.
//!
//! Wire the real orchestrator and HTTP adapters against wiremock doubles for
//! the validator and the backend, then drive the axum router directly with
//! `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use secrecy::SecretString;
use tower::ServiceExt;
use wiremock::matchers::{body_string, header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vanguard_adapters::{GuardrailConfig, HttpGuardrail, HttpUpstream, UpstreamConfig};
use vanguard_core::ProxyService;
use vanguard_server::{create_router, AppState};

/// Build the full pipeline against the two mock servers.
fn build_app(guardrail: &MockServer, backend: &MockServer) -> axum::Router {
    let guardrail = HttpGuardrail::new(
        GuardrailConfig::new(format!("{}/validate", guardrail.uri()))
            .with_timeout(Duration::from_secs(1))
            .with_max_concurrency(4),
    )
    .expect("guardrail client");
    let upstream = HttpUpstream::new(
        UpstreamConfig::new(
            format!("{}/v1/chat/completions", backend.uri()),
            SecretString::new("real-upstream-key".to_string()),
        )
        .with_timeout(Duration::from_secs(5)),
    )
    .expect("upstream client");

    let service = ProxyService::new(Arc::new(guardrail), Arc::new(upstream));
    create_router(AppState::new(service))
}

fn completion_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/chat/completions")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer caller-key")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes()
}

async fn mock_allow(guardrail: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "allowed": true,
            "sanitized_input": null
        })))
        .mount(guardrail)
        .await;
}

#[tokio::test]
async fn health_endpoint_returns_literal_ok() {
    let guardrail = MockServer::start().await;
    let backend = MockServer::start().await;
    let app = build_app(&guardrail, &backend);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await.as_ref(), b"OK");
}

#[tokio::test]
async fn allowed_request_is_relayed_unchanged() {
    let guardrail = MockServer::start().await;
    let backend = MockServer::start().await;
    mock_allow(&guardrail).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string(r#"{"prompt":"hi"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"prompt":"hi"}"#))
        .expect(1)
        .mount(&backend)
        .await;

    let app = build_app(&guardrail, &backend);
    let response = app
        .oneshot(completion_request(r#"{"prompt":"hi"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(b"application/json".as_ref())
    );
    assert_eq!(body_bytes(response).await.as_ref(), br#"{"prompt":"hi"}"#);
}

#[tokio::test]
async fn sanitized_payload_is_what_the_backend_receives() {
    let guardrail = MockServer::start().await;
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "allowed": true,
            "sanitized_input": {"prompt": "safe"}
        })))
        .mount(&guardrail)
        .await;
    // The backend double only matches the sanitized body; the original text
    // reaching it would fail the expectation.
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string(r#"{"prompt":"safe"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_string("generated"))
        .expect(1)
        .mount(&backend)
        .await;

    let app = build_app(&guardrail, &backend);
    let response = app
        .oneshot(completion_request(r#"{"prompt":"my secret password"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await.as_ref(), b"generated");
}

#[tokio::test]
async fn denied_request_surfaces_the_reason_and_skips_the_backend() {
    let guardrail = MockServer::start().await;
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "allowed": false,
            "reason": "SQL Injection Detected"
        })))
        .mount(&guardrail)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let app = build_app(&guardrail, &backend);
    let response = app
        .oneshot(completion_request(r#"{"prompt":"' OR 1=1 --"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_bytes(response).await;
    assert!(String::from_utf8_lossy(&body).contains("SQL Injection Detected"));
}

#[tokio::test]
async fn validator_failure_is_fail_closed() {
    let guardrail = MockServer::start().await;
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&guardrail)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let app = build_app(&guardrail, &backend);
    let response = app
        .oneshot(completion_request(r#"{"prompt":"hi"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn hanging_validator_rejects_within_its_timeout() {
    let guardrail = MockServer::start().await;
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"allowed": true}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&guardrail)
        .await;

    let app = build_app(&guardrail, &backend);
    let start = std::time::Instant::now();
    let response = app
        .oneshot(completion_request(r#"{"prompt":"hi"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(
        start.elapsed() < Duration::from_millis(2500),
        "validator timeout did not bound the request"
    );
}

#[tokio::test]
async fn backend_error_maps_to_bad_gateway() {
    let guardrail = MockServer::start().await;
    let backend = MockServer::start().await;
    mock_allow(&guardrail).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&backend)
        .await;

    let app = build_app(&guardrail, &backend);
    let response = app
        .oneshot(completion_request(r#"{"prompt":"hi"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn caller_credential_never_reaches_the_backend() {
    let guardrail = MockServer::start().await;
    let backend = MockServer::start().await;
    mock_allow(&guardrail).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header_matcher("authorization", "Bearer real-upstream-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&backend)
        .await;

    let app = build_app(&guardrail, &backend);
    let response = app
        .oneshot(completion_request(r#"{"prompt":"hi"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn streaming_mode_sets_event_stream_headers_and_relays_bytes() {
    let guardrail = MockServer::start().await;
    let backend = MockServer::start().await;
    mock_allow(&guardrail).await;
    let sse_body = "data: {\"token\":\"he\"}\n\ndata: {\"token\":\"llo\"}\n\ndata: [DONE]\n\n";
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_body))
        .mount(&backend)
        .await;

    let app = build_app(&guardrail, &backend);
    let response = app
        .oneshot(completion_request(r#"{"prompt":"hi","stream":true}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(b"text/event-stream".as_ref())
    );
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
        Some(b"no-cache".as_ref())
    );
    assert_eq!(body_bytes(response).await.as_ref(), sse_body.as_bytes());
}
