use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::middleware::context::RequestContext;
use crate::modules::auth::model::Principal;
use crate::state::AppState;
use crate::utils::cookies::cookie_value;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Cookie carrying the session token for browser clients.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Pull the bearer token out of a request, in priority order:
/// `Authorization: Bearer` header first, then the `accessToken` cookie.
pub fn resolve_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    cookie_value(headers, ACCESS_TOKEN_COOKIE).map(|v| v.to_string())
}

/// Mask a token for log output: first 6 characters, then an ellipsis.
fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    format!("{prefix}…")
}

/// Resolve and verify the request credential into a [`Principal`].
///
/// Missing credential and invalid credential are distinct failures so
/// clients can tell "log in" apart from "log in again".
pub fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<Principal, AppError> {
    let token = resolve_token(headers).ok_or_else(AppError::auth_required)?;

    let claims = verify_token(&token, &state.jwt_config).map_err(|err| {
        tracing::warn!(token = %mask_token(&token), "token verification failed");
        err
    })?;

    Principal::from_claims(&claims).ok_or_else(AppError::invalid_token)
}

/// Extractor for handlers that need the authenticated caller. Relies on the
/// context middleware having already populated the request extensions.
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .map(|ctx| AuthUser(ctx.principal.clone()))
            .ok_or_else(AppError::auth_required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, COOKIE};

    #[test]
    fn bearer_header_takes_priority_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer header-token".parse().unwrap());
        headers.insert(COOKIE, "accessToken=cookie-token".parse().unwrap());
        assert_eq!(resolve_token(&headers).as_deref(), Some("header-token"));
    }

    #[test]
    fn falls_back_to_access_token_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "theme=dark; accessToken=cookie-token".parse().unwrap());
        assert_eq!(resolve_token(&headers).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn empty_bearer_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(resolve_token(&headers), None);
    }

    #[test]
    fn non_bearer_authorization_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert_eq!(resolve_token(&headers), None);
    }

    #[test]
    fn masked_token_hides_the_tail() {
        assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9"), "eyJhbG…");
    }
}
