mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use campusgate::ids::EntityId;
use campusgate::modules::auth::model::Role;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::default_app;

#[tokio::test]
async fn login_attempt_is_recorded_with_password_redacted() {
    let app = default_app();
    let email = app.seed_user(42, Role::Teacher, Some(7));

    let response = app
        .router
        .clone()
        .oneshot(
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-request-id", "req-123")
                .body(Body::from(
                    json!({ "email": email, "password": "correct horse" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    app.settle().await;
    let entries = app.audit.entries();
    assert_eq!(entries.len(), 1);

    let entry = &entries[0];
    assert_eq!(entry.method, "POST");
    assert_eq!(entry.path, "/api/auth/login");
    assert_eq!(entry.status_code, 200);
    assert_eq!(entry.correlation_id, "req-123");

    let body = entry.request_body.as_ref().unwrap();
    assert_eq!(body["password"], "[REDACTED]");
    assert_eq!(body["email"], email);
}

#[tokio::test]
async fn failed_requests_record_the_error_message() {
    let app = default_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::get("/api/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    app.settle().await;
    let entries = app.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status_code, 401);
    assert!(!entries[0].success);
    assert_eq!(entries[0].error_message.as_deref(), Some("No token provided"));
    assert_eq!(entries[0].user_id, None);
}

#[tokio::test]
async fn authenticated_requests_record_identity_and_scope() {
    let app = default_app();
    let token = app.token_for(42, Role::Teacher, Some(7));

    app.router
        .clone()
        .oneshot(
            Request::get("/api/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    app.settle().await;
    let entries = app.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_id, Some(EntityId(42)));
    assert_eq!(entries[0].user_role.as_deref(), Some("TEACHER"));
    assert_eq!(entries[0].school_id, Some(EntityId(7)));
    assert!(entries[0].success);

    // The credential never lands in the captured headers.
    let headers = entries[0].request_headers.as_ref().unwrap();
    assert_eq!(headers["authorization"], "[REDACTED]");
}

#[tokio::test]
async fn query_string_credentials_are_redacted() {
    let app = default_app();
    let token = app.token_for(42, Role::Teacher, Some(7));

    // The realtime handshake carries its credential as `?token=`, so query
    // strings must get the same redaction as headers and bodies.
    app.router
        .clone()
        .oneshot(
            Request::get("/api/auth/me?token=super-secret-credential&page=1")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    app.settle().await;
    let entries = app.audit.entries();
    assert_eq!(entries.len(), 1);

    let query = entries[0].query.as_ref().unwrap();
    assert_eq!(query["token"], "[REDACTED]");
    assert_eq!(query["page"], "1");

    let stored = serde_json::to_string(&entries[0]).unwrap();
    assert!(!stored.contains("super-secret-credential"));
}

#[tokio::test]
async fn health_checks_are_not_audited() {
    let app = default_app();

    app.router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    app.settle().await;
    assert!(app.audit.entries().is_empty());
}

#[tokio::test]
async fn bypass_header_skips_auditing() {
    let app = default_app();
    let token = app.token_for(42, Role::Teacher, Some(7));

    app.router
        .clone()
        .oneshot(
            Request::get("/api/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header("x-audit-bypass", "1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    app.settle().await;
    assert!(app.audit.entries().is_empty());
}

#[tokio::test]
async fn audit_store_failure_never_fails_the_request() {
    let app = default_app();
    let token = app.token_for(42, Role::Teacher, Some(7));
    app.audit.fail.store(true, std::sync::atomic::Ordering::SeqCst);

    let response = app
        .router
        .oneshot(
            Request::get("/api/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn platform_admin_can_read_the_audit_log() {
    let app = default_app();
    let teacher = app.token_for(1, Role::Teacher, Some(7));
    let admin = app.token_for(2, Role::SuperDuperAdmin, None);

    // Generate one auditable request.
    app.router
        .clone()
        .oneshot(
            Request::get("/api/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {teacher}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    app.settle().await;

    let response = app
        .router
        .oneshot(
            Request::get("/api/audit-logs?userId=1&limit=10")
                .header(header::AUTHORIZATION, format!("Bearer {admin}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["user_id"], "1");
    assert_eq!(body["data"][0]["path"], "/api/auth/me");
}

#[tokio::test]
async fn non_admins_cannot_read_the_audit_log() {
    let app = default_app();
    let teacher = app.token_for(1, Role::Teacher, Some(7));

    let response = app
        .router
        .oneshot(
            Request::get("/api/audit-logs")
                .header(header::AUTHORIZATION, format!("Bearer {teacher}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
