use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::audit::recorder::audit_middleware;
use crate::middleware::context::context_middleware;
use crate::middleware::csrf::{csrf_middleware, origin_guard_middleware};
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::modules::{audit_logs, auth};
use crate::realtime;
use crate::state::AppState;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static("x-xsrf-token"),
            HeaderName::from_static("x-managed-school-id"),
            HeaderName::from_static("x-managed-branch-id"),
            HeaderName::from_static("x-managed-course-id"),
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([HeaderName::from_static("x-csrf-token")])
        .allow_credentials(true)
}

/// Assemble the full application.
///
/// Two subtrees share one audit layer. The protected subtree runs the whole
/// pipeline (context, then CSRF, then rate limiting keyed by user); the
/// public subtree skips context so login and the realtime handshake can do
/// their own credential handling, and its rate limiting keys by IP.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .merge(auth::router::public_routes())
        .route("/health", get(health))
        .route("/ws", get(realtime::ws_handler))
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(from_fn_with_state(state.clone(), csrf_middleware));

    let protected = Router::new()
        .merge(auth::router::protected_routes())
        .merge(audit_logs::router::routes())
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(from_fn_with_state(state.clone(), csrf_middleware))
        .layer(from_fn_with_state(state.clone(), context_middleware));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(from_fn_with_state(state.clone(), origin_guard_middleware))
        .layer(from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum::middleware::from_fn(
            crate::logging::request_logging_middleware,
        ))
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
