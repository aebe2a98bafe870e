use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Method, Request, header};
use axum::middleware::Next;
use axum::response::Response;
use rand::Rng;

use crate::config::csrf::CsrfConfig;
use crate::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::state::AppState;
use crate::utils::cookies::{build_set_cookie, cookie_value};
use crate::utils::errors::AppError;

/// Header echoed on every response so SPAs can read the current token even
/// when the cookie is scoped away from them.
pub const CSRF_ECHO_HEADER: &str = "x-csrf-token";

/// Mint a fresh token: 32 random bytes, hex-encoded.
pub fn mint_csrf_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    hex::encode(bytes)
}

/// Set-Cookie value for a (new or rotated) CSRF token. Deliberately not
/// HttpOnly: the double-submit pattern requires client script to read it.
pub fn csrf_set_cookie(token: &str, config: &CsrfConfig) -> String {
    build_set_cookie(
        &config.cookie_name,
        token,
        config.max_age,
        false,
        config.secure,
        config.same_site,
    )
}

fn is_safe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Reject cross-origin browser requests from origins outside the allow-list
/// before any state can change. Requests without an `Origin` header
/// (same-origin navigations, non-browser clients) pass through; the CORS
/// layer handles preflights and response headers.
pub async fn origin_guard_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(origin) = request
        .headers()
        .get(axum::http::header::ORIGIN)
        .and_then(|v| v.to_str().ok())
    {
        if !state
            .cors_config
            .allowed_origins
            .iter()
            .any(|allowed| allowed.as_str() == origin)
        {
            tracing::warn!(%origin, "request from disallowed origin");
            return Err(AppError::cors_not_allowed());
        }
    }
    Ok(next.run(request).await)
}

/// Double-submit CSRF check.
///
/// Enforced only where the attack exists: unsafe methods on sessions
/// carried by cookie. Bearer-only clients never had ambient credentials, so
/// a missing session cookie skips the check entirely. Every response
/// carries the token (minting one on first contact) so clients always have
/// something to echo on the next mutation.
pub async fn csrf_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let config = &state.csrf_config;
    let cookie_token = cookie_value(request.headers(), &config.cookie_name).map(|v| v.to_string());

    let exempt = is_safe_method(request.method())
        || cookie_value(request.headers(), ACCESS_TOKEN_COOKIE).is_none()
        || config
            .exempt_paths
            .iter()
            .any(|p| p.as_str() == request.uri().path());

    if !exempt {
        let header_token = config
            .header_names
            .iter()
            .filter_map(|name| request.headers().get(*name))
            .find_map(|value| value.to_str().ok());

        let matches = match (&cookie_token, header_token) {
            (Some(cookie), Some(header)) => !cookie.is_empty() && cookie == header,
            _ => false,
        };
        if !matches {
            tracing::warn!(
                path = %request.uri().path(),
                method = %request.method(),
                "double-submit check failed"
            );
            return Err(AppError::csrf_mismatch());
        }
    }

    let mut response = next.run(request).await;

    // A handler that rotated the token (login, logout) wins; otherwise keep
    // the existing cookie, minting one on first contact.
    let rotated = response
        .headers()
        .get(CSRF_ECHO_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let token = match (rotated, cookie_token) {
        (Some(token), _) => token,
        (None, Some(token)) => token,
        (None, None) => {
            let token = mint_csrf_token();
            if let Ok(value) = HeaderValue::from_str(&csrf_set_cookie(&token, config)) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            token
        }
    };

    if let Ok(value) = HeaderValue::from_str(&token) {
        response.headers_mut().insert(CSRF_ECHO_HEADER, value);
    }

    Ok(response)
}
