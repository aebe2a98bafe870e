//! Minimal cookie parsing and building helpers.
//!
//! The pipeline only ever reads two cookies (the session credential and the
//! CSRF token) and sets the same two, so a full cookie crate is not pulled in.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;

/// Look up a single cookie value from the `Cookie` request header.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    parse_cookie_header(raw, name)
}

/// Parse one cookie out of a raw `Cookie` header string.
pub fn parse_cookie_header<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    raw.split(';').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k.trim() == name {
            Some(v.trim())
        } else {
            None
        }
    })
}

/// SameSite policy for emitted cookies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    /// Parse from config; unrecognized values fall back to `Lax`.
    pub fn from_config(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "strict" => SameSite::Strict,
            "none" => SameSite::None,
            _ => SameSite::Lax,
        }
    }
}

/// Build a `Set-Cookie` header value.
///
/// Cross-site deployments require `SameSite=None; Secure`; the caller's
/// config is responsible for pairing them.
pub fn build_set_cookie(
    name: &str,
    value: &str,
    max_age_secs: i64,
    http_only: bool,
    secure: bool,
    same_site: SameSite,
) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; SameSite={}",
        name,
        value,
        max_age_secs,
        same_site.as_str()
    );
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build a `Set-Cookie` header value that clears a cookie.
pub fn build_clear_cookie(name: &str, http_only: bool, secure: bool, same_site: SameSite) -> String {
    build_set_cookie(name, "", 0, http_only, secure, same_site)
}
