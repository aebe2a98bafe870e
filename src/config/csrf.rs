use std::env;

use crate::utils::cookies::SameSite;

/// Double-submit CSRF configuration.
///
/// The token cookie must stay readable by client script (not HttpOnly) so
/// the frontend can echo it back in a header. Cross-site deployments need
/// `CSRF_SAME_SITE=none` together with `CSRF_SECURE=true`.
#[derive(Clone, Debug)]
pub struct CsrfConfig {
    pub cookie_name: String,
    /// Header names accepted as the echo of the cookie value.
    pub header_names: [&'static str; 2],
    pub same_site: SameSite,
    pub secure: bool,
    /// Cookie lifetime in seconds (default 7 days).
    pub max_age: i64,
    /// Paths that must stay reachable without a token (token issuance
    /// itself, health probes).
    pub exempt_paths: Vec<String>,
}

impl CsrfConfig {
    pub fn from_env() -> Self {
        Self {
            cookie_name: env::var("CSRF_COOKIE_NAME").unwrap_or_else(|_| "XSRF-TOKEN".to_string()),
            header_names: ["x-csrf-token", "x-xsrf-token"],
            same_site: SameSite::from_config(
                &env::var("CSRF_SAME_SITE").unwrap_or_else(|_| "lax".to_string()),
            ),
            secure: env::var("CSRF_SECURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            max_age: env::var("CSRF_MAX_AGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(604800), // 7 days
            exempt_paths: vec![
                "/api/auth/login".to_string(),
                "/api/auth/csrf-token".to_string(),
                "/health".to_string(),
            ],
        }
    }
}
