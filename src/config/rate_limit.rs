use std::env;
use std::time::Duration;

/// Fixed-window rate limit configuration.
///
/// Two independent bucket families: a generous one for ordinary HTTP
/// traffic and a tighter one for realtime channel events.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Window length for HTTP requests.
    pub http_window: Duration,
    /// Max HTTP requests per key per window.
    pub http_max: u32,
    /// Window length for realtime events.
    pub realtime_window: Duration,
    /// Max realtime events per key per window.
    pub realtime_max: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            http_window: Duration::from_millis(60_000),
            http_max: 300,
            realtime_window: Duration::from_millis(5_000),
            realtime_max: 30,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            http_window: env::var("RATE_LIMIT_HTTP_WINDOW_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.http_window),
            http_max: env::var("RATE_LIMIT_HTTP_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.http_max),
            realtime_window: env::var("SOCKET_RATE_LIMIT_WINDOW_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.realtime_window),
            realtime_max: env::var("SOCKET_RATE_LIMIT_MAX_EVENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.realtime_max),
        }
    }
}
