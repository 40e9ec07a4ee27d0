//! Health checks and response headers.

use axum::http::StatusCode;
use pur_beurre_integration_tests::TestApp;

#[tokio::test]
async fn test_health() {
    let mut app = TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
    assert!(response.session_cookie().is_none());
}

#[tokio::test]
async fn test_readiness_without_database() {
    let mut app = TestApp::new();

    let response = app.get("/health/ready").await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_and_security_headers() {
    let mut app = TestApp::new();

    let response = app.get("/").await;

    assert!(response.headers.contains_key("x-request-id"));
    assert_eq!(
        response
            .headers
            .get("x-frame-options")
            .and_then(|v| v.to_str().ok()),
        Some("DENY")
    );
    assert!(response.headers.contains_key("content-security-policy"));
}
