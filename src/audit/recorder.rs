use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, to_bytes};
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use serde_json::{Value, json};

use super::model::AuditLogEntry;
use super::sanitize::{sanitize, truncate_error};
use super::store::AuditStore;
use crate::config::audit::AuditConfig;
use crate::middleware::context::RequestContext;
use crate::middleware::rate_limit::client_ip;
use crate::state::AppState;
use crate::utils::errors::ErrorDetail;

fn correlation_id(headers: &HeaderMap) -> String {
    for name in ["x-request-id", "x-correlation-id"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }
    uuid::Uuid::new_v4().to_string()
}

fn trace_id(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("x-trace-id").and_then(|v| v.to_str().ok()) {
        if !value.trim().is_empty() {
            return Some(value.trim().to_string());
        }
    }
    // W3C traceparent: version-traceid-spanid-flags
    headers
        .get("traceparent")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split('-').nth(1))
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
}

/// Query string as a JSON object so it can be redacted key by key, exactly
/// like headers and body. An unparseable query is kept as a raw string.
fn query_json(raw: &str) -> Value {
    match serde_urlencoded::from_str::<Vec<(String, String)>>(raw) {
        Ok(pairs) => {
            let mut map = serde_json::Map::new();
            for (key, value) in pairs {
                map.insert(key, Value::String(value));
            }
            Value::Object(map)
        }
        Err(_) => Value::String(raw.to_string()),
    }
}

/// Request headers as a JSON object, for sanitized capture. Non-UTF-8
/// values are dropped.
fn headers_json(headers: &HeaderMap) -> Value {
    let mut map = serde_json::Map::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            map.insert(name.as_str().to_string(), Value::String(value.to_string()));
        }
    }
    Value::Object(map)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false)
}

/// Buffer a JSON request body up to the configured cap, handing back a
/// rebuilt request. Oversized or non-JSON bodies pass through untouched and
/// are recorded as a size marker or not at all.
async fn capture_body(
    request: Request<Body>,
    config: &AuditConfig,
) -> (Request<Body>, Option<Value>) {
    if !is_json(request.headers()) {
        return (request, None);
    }

    let declared_len = request
        .headers()
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    if let Some(len) = declared_len {
        if len > config.max_captured_body_bytes {
            return (request, Some(json!({ "_body_bytes": len, "_captured": false })));
        }
    }

    let (parts, body) = request.into_parts();
    match to_bytes(body, config.max_captured_body_bytes).await {
        Ok(bytes) => {
            let captured = serde_json::from_slice::<Value>(&bytes).ok();
            (Request::from_parts(parts, Body::from(bytes)), captured)
        }
        Err(_) => {
            // Body exceeded the cap mid-stream; it cannot be replayed, so
            // the request fails downstream with an empty body.
            (Request::from_parts(parts, Body::empty()), None)
        }
    }
}

/// Outermost middleware: records every mutating or protected request to the
/// audit store. Persistence is detached from the response path, so a slow
/// or failing store never delays or fails the request itself.
pub async fn audit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let skip = state
        .audit_config
        .ignore_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()))
        || request
            .headers()
            .contains_key(state.audit_config.bypass_header.as_str());
    if skip {
        return next.run(request).await;
    }

    let method = request.method().to_string();
    let query = request
        .uri()
        .query()
        .map(|q| sanitize(&query_json(q), state.audit_config.max_string_len));
    let correlation_id = correlation_id(request.headers());
    let trace_id = trace_id(request.headers());
    let peer = request
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|c| c.0);
    let ip_address = Some(client_ip(request.headers(), peer.as_ref()));
    let user_agent = request
        .headers()
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let raw_headers = headers_json(request.headers());

    let (request, raw_body) = capture_body(request, &state.audit_config).await;

    let started = Instant::now();
    let response = next.run(request).await;
    let duration_ms = started.elapsed().as_millis() as i64;

    let context = response.extensions().get::<RequestContext>().cloned();
    // The context middleware may have generated the id when no header was
    // present; its value is authoritative for authenticated requests.
    let correlation_id = context
        .as_ref()
        .map(|c| c.correlation_id.clone())
        .unwrap_or(correlation_id);
    let error_message = response
        .extensions()
        .get::<ErrorDetail>()
        .map(|detail| truncate_error(&detail.message, state.audit_config.max_error_len));

    let entry = AuditLogEntry {
        user_id: context.as_ref().map(|c| c.principal.id),
        user_role: context
            .as_ref()
            .and_then(|c| serde_json::to_value(c.principal.role).ok())
            .and_then(|v| v.as_str().map(|s| s.to_string())),
        school_id: context.as_ref().and_then(|c| c.scope.school_id),
        branch_id: context.as_ref().and_then(|c| c.scope.branch_id),
        course_id: context.as_ref().and_then(|c| c.scope.course_id),
        method,
        path,
        query,
        status_code: response.status().as_u16(),
        success: response.status().as_u16() < 400,
        duration_ms,
        request_headers: Some(sanitize(&raw_headers, state.audit_config.max_string_len)),
        request_body: raw_body
            .as_ref()
            .map(|body| sanitize(body, state.audit_config.max_string_len)),
        error_message,
        correlation_id,
        trace_id,
        ip_address,
        user_agent,
        created_at: Utc::now(),
    };

    persist(state.audit_store.clone(), entry);

    response
}

/// Fire-and-forget write. Failures are logged and dropped.
fn persist(store: Arc<dyn AuditStore>, entry: AuditLogEntry) {
    tokio::spawn(async move {
        if let Err(err) = store.record(entry).await {
            tracing::error!(error = %err.message, "failed to persist audit log entry");
        }
    });
}
