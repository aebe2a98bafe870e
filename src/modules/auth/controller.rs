use axum::extract::State;
use axum::{Extension, Json};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use validator::Validate;

use super::model::{LoginRequest, LoginResponse};
use crate::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::middleware::context::RequestContext;
use crate::middleware::csrf::{CSRF_ECHO_HEADER, csrf_set_cookie, mint_csrf_token};
use crate::middleware::scope::ScopedUser;
use crate::state::AppState;
use crate::utils::cookies::{SameSite, build_clear_cookie, build_set_cookie};
use crate::utils::errors::AppError;
use crate::utils::jwt::create_access_token;
use crate::utils::password::verify_password;

/// Attach a session-boundary CSRF rotation to a response: fresh cookie plus
/// the echo header the CSRF layer treats as authoritative.
fn rotate_csrf(response: &mut Response, state: &AppState) {
    let token = mint_csrf_token();
    if let Ok(value) = HeaderValue::from_str(&csrf_set_cookie(&token, &state.csrf_config)) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&token) {
        response.headers_mut().insert(CSRF_ECHO_HEADER, value);
    }
}

/// `POST /api/auth/login`
///
/// Issues the access token both in the body (for API clients) and as an
/// HttpOnly cookie (for browsers). The CSRF token rotates here so a token
/// fixated before login is useless afterwards.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    let user = state
        .directory
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        tracing::warn!(email = %payload.email, "failed login attempt");
        return Err(AppError::invalid_credentials());
    }

    let token = create_access_token(user.id, user.role, user.school_id, &state.jwt_config)?;

    let mut response = Json(LoginResponse {
        success: true,
        access_token: token.clone(),
        user_id: user.id,
        role: user.role,
        school_id: user.school_id,
    })
    .into_response();

    let session_cookie = build_set_cookie(
        ACCESS_TOKEN_COOKIE,
        &token,
        state.jwt_config.access_token_expiry,
        true,
        state.csrf_config.secure,
        SameSite::Lax,
    );
    if let Ok(value) = HeaderValue::from_str(&session_cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    rotate_csrf(&mut response, &state);

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(response)
}

/// `POST /api/auth/logout`
///
/// Clears the session cookie and rotates the CSRF token.
pub async fn logout(State(state): State<AppState>) -> Response {
    let mut response = Json(json!({ "success": true })).into_response();

    let clear = build_clear_cookie(
        ACCESS_TOKEN_COOKIE,
        true,
        state.csrf_config.secure,
        SameSite::Lax,
    );
    if let Ok(value) = HeaderValue::from_str(&clear) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    rotate_csrf(&mut response, &state);

    response
}

/// `GET /api/auth/csrf-token`
///
/// Explicit token fetch for clients that want one before their first
/// mutation. Always mints a fresh token.
pub async fn csrf_token(State(state): State<AppState>) -> Response {
    let token = mint_csrf_token();
    let mut response = Json(json!({ "success": true, "csrfToken": token })).into_response();

    if let Ok(value) = HeaderValue::from_str(&csrf_set_cookie(&token, &state.csrf_config)) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&token) {
        response.headers_mut().insert(CSRF_ECHO_HEADER, value);
    }

    response
}

/// `GET /api/auth/context`
///
/// The resolved tenant scope for this request. Requires a school context,
/// so a platform admin calling without a scope header gets
/// `SCOPE_REQUIRED` back.
pub async fn context(scoped: ScopedUser) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "context": {
            "userId": scoped.principal.id,
            "role": scoped.principal.role,
            "schoolId": scoped.school_id,
            "branchId": scoped.scope.branch_id,
            "courseId": scoped.scope.course_id,
        }
    }))
}

/// `GET /api/auth/me`
pub async fn me(Extension(ctx): Extension<RequestContext>) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "user": {
            "id": ctx.principal.id,
            "role": ctx.principal.role,
            "schoolId": ctx.principal.school_id,
        },
        "scope": {
            "schoolId": ctx.scope.school_id,
            "branchId": ctx.scope.branch_id,
            "courseId": ctx.scope.course_id,
        }
    }))
}
