use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

/// Application error carrying an HTTP status and a stable, machine-readable
/// error code. Every rejection in the pipeline renders the same JSON shape:
///
/// ```json
/// { "success": false, "error": "<CODE>", "message": "...", "meta": { ... } }
/// ```
/// Error details attached to the response extensions so outer layers (the
/// audit recorder) can see why a request failed without re-parsing the body.
#[derive(Clone, Debug)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// No credential was presented on a protected route.
    pub fn auth_required() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "AUTH_REQUIRED",
            "No token provided",
        )
    }

    /// A credential was presented but failed signature or expiry checks.
    pub fn invalid_token() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "INVALID_TOKEN",
            "Invalid or expired token",
        )
    }

    pub fn invalid_credentials() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "Invalid email or password",
        )
    }

    /// The endpoint requires a tenant context and none could be resolved.
    pub fn scope_required() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "SCOPE_REQUIRED",
            "No school context could be resolved for this request",
        )
    }

    pub fn scope_forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "SCOPE_FORBIDDEN", message)
    }

    pub fn csrf_mismatch() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "CSRF_MISMATCH",
            "CSRF token missing or invalid",
        )
    }

    pub fn cors_not_allowed() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "CORS_NOT_ALLOWED",
            "Origin not allowed",
        )
    }

    pub fn rate_limited() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMITED",
            "Too many requests. Please slow down.",
        )
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        let err = err.into();
        tracing::error!(error = %err, "internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.code,
            "message": self.message,
            "meta": {
                "timestamp": Utc::now().to_rfc3339(),
                "statusCode": self.status.as_u16(),
            }
        }));

        let mut response = (self.status, body).into_response();
        response.extensions_mut().insert(ErrorDetail {
            code: self.code,
            message: self.message,
        });
        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::internal(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err)
    }
}
