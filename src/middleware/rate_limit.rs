use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;

use crate::middleware::context::RequestContext;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Outcome of a single [`FixedWindowLimiter::consume`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests left in the current window (0 when denied).
    pub remaining: u32,
    pub reset_at: Instant,
}

#[derive(Clone, Copy, Debug)]
struct Bucket {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window counter keyed by an opaque string (user id, IP, or
/// connection id). Windows are anchored at the first request after expiry,
/// not on wall-clock boundaries.
pub struct FixedWindowLimiter {
    window: Duration,
    max: u32,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, max: u32) -> Self {
        Self {
            window,
            max,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request against `key`. Denied calls do not consume quota
    /// from the next window.
    pub fn consume(&self, key: &str) -> RateLimitDecision {
        self.consume_at(key, Instant::now())
    }

    /// Like [`consume`](Self::consume) with an injected clock, for tests.
    pub fn consume_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut buckets = self.buckets.lock().unwrap();

        // Opportunistic cleanup so idle keys do not accumulate forever.
        if buckets.len() > 1024 {
            buckets.retain(|_, b| b.reset_at > now);
        }

        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            count: 0,
            reset_at: now + self.window,
        });

        if bucket.reset_at <= now {
            bucket.count = 0;
            bucket.reset_at = now + self.window;
        }

        if bucket.count >= self.max {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at: bucket.reset_at,
            };
        }

        bucket.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: self.max - bucket.count,
            reset_at: bucket.reset_at,
        }
    }
}

/// Best-effort client IP: first hop of `x-forwarded-for`, then `x-real-ip`,
/// then the peer address.
pub fn client_ip(headers: &HeaderMap, peer: Option<&SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    peer.map(|p| p.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// HTTP rate limit middleware. Authenticated traffic is keyed per user so
/// one tenant's burst cannot starve another behind a shared proxy;
/// anonymous traffic falls back to the client IP.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let key = match request.extensions().get::<RequestContext>() {
        Some(ctx) => format!("user:{}", ctx.principal.id),
        None => {
            let peer = request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|c| c.0);
            format!("ip:{}", client_ip(request.headers(), peer.as_ref()))
        }
    };

    let decision = state.http_limiter.consume(&key);
    if !decision.allowed {
        tracing::warn!(key = %key, "rate limit exceeded");
        return Err(AppError::rate_limited());
    }

    Ok(next.run(request).await)
}
