mod common;

use admin_console::models::{LogLevel, LogQuery, TimeRange};
use admin_console::routes::{Navigator, Route};
use admin_console::services::{ApiError, AuthClient, GatewayClient, RequestPipeline};
use admin_console::store::TokenStore;
use common::*;
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "url": format!("http://{}:8080", name),
        "health_check": "/health",
        "timeout": 30,
        "rate_limit": 100,
        "status": "healthy",
    })
}

#[tokio::test]
async fn rejected_token_is_refreshed_and_request_replayed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/services"))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refresh_token": "old-refresh"})))
        .respond_with(token_response("new-access", "new-refresh"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/services"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ok(json!([service("billing")])))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = stored("old-access", "old-refresh");
    let console = console(&server, tokens.clone());

    let services = console.gateway.services().await.expect("replay should succeed");

    assert_eq!(services.len(), 1);
    assert_eq!(services[0].name, "billing");
    let pair = tokens.read().unwrap();
    assert_eq!(pair.access_token, "new-access");
    assert_eq!(pair.refresh_token, "new-refresh");
}

#[tokio::test]
async fn enveloped_refresh_reply_is_accepted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ok(json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ok(json!({"status": "healthy"})))
        .mount(&server)
        .await;

    let console = console(&server, stored("old-access", "old-refresh"));
    let report = console.gateway.gateway_health().await.unwrap();

    assert_eq!(report.status, "healthy");
}

#[tokio::test]
async fn second_rejection_is_final() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/services"))
        .respond_with(unauthorized())
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(token_response("new-access", "new-refresh"))
        .expect(1)
        .mount(&server)
        .await;

    let console = console(&server, stored("old-access", "old-refresh"));
    let err = console.gateway.services().await.unwrap_err();

    assert!(err.is_unauthorized(), "unexpected error {:?}", err);
    assert_eq!(err.to_string(), "Could not validate credentials");
}

#[tokio::test]
async fn failed_refresh_ends_the_session() {
    let server = MockServer::start().await;
    let console = signed_in(&server, "alice", true).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/monitoring/alerts/active"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&server)
        .await;

    let err = console.monitoring.active_alerts().await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired));
    assert!(console.tokens.read().is_none());
    assert_eq!(console.navigator.current(), Route::Login);

    let session = console.session.session();
    assert!(!session.is_authenticated);
    assert!(session.user.is_none());
}

#[tokio::test]
async fn explicit_refresh_without_refresh_token_ends_the_session() {
    let server = MockServer::start().await;
    Mock::given(path("/auth/refresh"))
        .respond_with(token_response("a", "r"))
        .expect(0)
        .mount(&server)
        .await;

    let navigator = Navigator::default();
    let pipeline = RequestPipeline::new(
        &server.uri(),
        &server.uri(),
        Duration::from_secs(5),
        TokenStore::in_memory(),
        navigator.clone(),
    )
    .unwrap();

    let err = AuthClient::new(pipeline).refresh().await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(navigator.current(), Route::Login);
}

#[tokio::test]
async fn anonymous_requests_carry_no_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header_exists("x-request-id"))
        .respond_with(ok(json!({"status": "healthy", "services": {"auth": "up"}})))
        .expect(1)
        .mount(&server)
        .await;

    let console = console(&server, TokenStore::in_memory());
    let report = console.gateway.gateway_health().await.unwrap();

    assert_eq!(report.details, Some(json!({"auth": "up"})));
}

#[tokio::test]
async fn envelope_failures_surface_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/monitoring/alerts/rules"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "error": "Rules store offline"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/monitoring/alerts/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/services"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let console = console(&server, stored("access", "refresh"));

    let err = console.monitoring.alert_rules().await.unwrap_err();
    assert_eq!(err.to_string(), "Rules store offline");
    assert_eq!(err.status(), Some(StatusCode::OK));

    let err = console.monitoring.active_alerts().await.unwrap_err();
    assert_eq!(err.to_string(), "API request failed");

    let err = console.gateway.services().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    assert_eq!(err.to_string(), "API request failed");
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let tokens = stored("access", "refresh");
    let pipeline = RequestPipeline::new(
        "http://127.0.0.1:1",
        "http://127.0.0.1:1",
        Duration::from_secs(2),
        tokens.clone(),
        Navigator::default(),
    )
    .unwrap();

    let err = GatewayClient::new(pipeline)
        .services()
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Network(_)), "unexpected error {:?}", err);
    assert!(tokens.read().is_some());
}

#[tokio::test]
async fn monitoring_filters_become_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/monitoring/logs"))
        .and(query_param("service", "billing"))
        .and(query_param("level", "error"))
        .and(query_param("limit", "20"))
        .respond_with(ok(json!({
            "logs": [{
                "timestamp": "2024-01-01T00:00:00Z",
                "level": "error",
                "service": "billing",
                "message": "invoice job failed",
            }],
            "total": 1,
            "has_more": false,
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/monitoring/services/billing/metrics"))
        .and(query_param("range", "24h"))
        .respond_with(ok(json!({
            "cpu_usage": [{"timestamp": "t0", "value": 12.5}],
            "memory_usage": [],
            "disk_usage": [],
            "network_traffic": {"in": [], "out": []},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let console = console(&server, stored("access", "refresh"));

    let page = console
        .monitoring
        .logs(&LogQuery {
            service: Some("billing".to_string()),
            level: Some(LogLevel::Error),
            limit: Some(20),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.logs.len(), 1);
    assert_eq!(page.logs[0].level, LogLevel::Error);

    let metrics = console
        .monitoring
        .service_metrics("billing", TimeRange::OneDay)
        .await
        .unwrap();
    assert_eq!(metrics.latest(), (Some(12.5), None, None));
}

#[tokio::test]
async fn prometheus_metrics_are_returned_verbatim() {
    let server = MockServer::start().await;
    let exposition = "# TYPE gateway_requests_total counter\ngateway_requests_total 42\n";
    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(exposition))
        .mount(&server)
        .await;

    let console = console(&server, TokenStore::in_memory());

    assert_eq!(console.gateway.metrics().await.unwrap(), exposition);
}

#[tokio::test]
async fn elapsed_timeout_is_a_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/services"))
        .respond_with(ok(json!([])).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let tokens = stored("access", "refresh");
    let pipeline = RequestPipeline::new(
        &server.uri(),
        &server.uri(),
        Duration::from_millis(200),
        tokens.clone(),
        Navigator::default(),
    )
    .unwrap();

    let err = GatewayClient::new(pipeline).services().await.unwrap_err();

    match &err {
        ApiError::Network(source) => assert!(source.is_timeout(), "unexpected error {:?}", err),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(tokens.read().is_some());
}
