mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use campusgate::modules::auth::model::Role;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::default_app;

fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::post("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn login_issues_token_and_cookies() {
    let app = default_app();
    let email = app.seed_user(42, Role::Teacher, Some(7));

    let response = app
        .router
        .oneshot(login_request(&email, "correct horse"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .collect();
    let session = cookies
        .iter()
        .find(|c| c.starts_with("accessToken="))
        .unwrap();
    assert!(session.contains("HttpOnly"));
    assert!(cookies.iter().any(|c| c.starts_with("XSRF-TOKEN=")));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["user_id"], "42");
    assert_eq!(body["role"], "TEACHER");
    assert!(body["access_token"].as_str().unwrap().contains('.'));
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = default_app();
    let email = app.seed_user(42, Role::Teacher, Some(7));

    let response = app
        .router
        .oneshot(login_request(&email, "wrong"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn unknown_email_gets_the_same_error_as_wrong_password() {
    let app = default_app();

    let response = app
        .router
        .oneshot(login_request("nobody@example.com", "whatever"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn malformed_email_fails_validation() {
    let app = default_app();

    let response = app
        .router
        .oneshot(login_request("not-an-email", "whatever"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_token_works_on_protected_routes() {
    let app = default_app();
    let email = app.seed_user(42, Role::Teacher, Some(7));

    let response = app
        .router
        .clone()
        .oneshot(login_request(&email, "correct horse"))
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let token = body["access_token"].as_str().unwrap();

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
async fn logout_clears_the_session_cookie() {
    let app = default_app();
    let token = app.token_for(42, Role::Teacher, Some(7));

    let response = app
        .router
        .oneshot(
            Request::post("/api/auth/logout")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|c| c.starts_with("accessToken="))
        .unwrap()
        .to_string();
    assert!(cleared.contains("Max-Age=0"));
}
